use gettextrs::gettext;
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some(&gettext("Instructions")),
        Some(&gettext(
            "Flip two cards at a time to find matching pairs.\n\
Mismatched cards turn face down again after a moment.\n\
Clear the board in as few moves and as little time as you can.",
        )),
    );
    dialog.add_response("ok", &gettext("Got it"));
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_missing_difficulty_dialog(parent: &impl IsA<gtk::Widget>) {
    let dialog = adw::AlertDialog::builder()
        .heading(gettext("Choose a difficulty"))
        .body(gettext("Pick a board size before starting a game."))
        .build();
    dialog.add_response("ok", &gettext("OK"));
    dialog.present(Some(parent));
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Concentration")
        .application_icon("io.github.concentration")
        .version(env!("CARGO_PKG_VERSION"))
        .comments(gettext("A memory game for finding pairs."))
        .build();
    dialog.present(app.active_window().as_ref());
    dialog
}

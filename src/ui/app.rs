use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::gdk;
use gtk4::glib;
use adw::prelude::*;
use gtk4::prelude::*;
use libadwaita as adw;
use tracing::{error, warn};

use super::board::{CONTENT_MARGIN, apply_tile_classes};
use super::dialogs::{show_about_dialog, show_instructions_dialog, show_missing_difficulty_dialog};
use super::hud::{start_pump, update_subtitle};
use super::scene::{rebuild_board, refresh_best_time, show_game, show_menu, show_victory};
use super::state::{AppState, Tile, TileStatus};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{Difficulty, GameEvent};

const APP_ID: &str = "io.github.Concentration";

const STYLE: &str = "
.concentration-card { border-radius: 12px; font-size: 1.4em; }
.concentration-card.active { background: alpha(@accent_bg_color, 0.35); }
.concentration-card.matched { background: alpha(@success_bg_color, 0.35); }
.concentration-card-container { border-radius: 18px; padding: 12px; }
.main-menu-title { margin-bottom: 12px; }
.victory-title { margin-top: 12px; }
";

/// Applies every event the session emitted since the last call.
pub(super) fn apply_events(state: &Rc<RefCell<AppState>>) {
    let events = state.borrow_mut().take_events();
    for event in events {
        match event {
            GameEvent::BoardReady { grid, cards } => {
                {
                    let mut st = state.borrow_mut();
                    st.grid_cols = grid.cols() as i32;
                    st.grid_rows = grid.rows() as i32;
                    st.tiles = cards.into_iter().map(Tile::from).collect();
                }
                rebuild_board(state);
            }
            GameEvent::CardFlipped { position, .. } => {
                set_tile_status(state, &[position], TileStatus::Flipped);
            }
            GameEvent::PairMatched { first, second } => {
                set_tile_status(state, &[first, second], TileStatus::Matched);
            }
            GameEvent::PairMismatched { first, second } => {
                set_tile_status(state, &[first, second], TileStatus::Hidden);
            }
            GameEvent::FlipsCleared { positions } => {
                set_tile_status(state, &positions, TileStatus::Hidden);
            }
            GameEvent::Started | GameEvent::Paused | GameEvent::Tick { .. } => {
                update_subtitle(&state.borrow());
            }
            GameEvent::Won(summary) => {
                show_victory(state, &summary);
            }
            GameEvent::Abandoned => {}
        }
    }
}

fn set_tile_status(state: &Rc<RefCell<AppState>>, positions: &[usize], status: TileStatus) {
    let mut st = state.borrow_mut();
    for &idx in positions {
        if let Some(tile) = st.tiles.get_mut(idx) {
            tile.status = status;
        }
        if let Some(button) = st.grid_buttons.get(idx) {
            apply_tile_classes(button, status);
        }
    }
    update_subtitle(&st);
}

pub fn handle_tile_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let accepted = state.borrow_mut().session.request_flip(index);
    if accepted {
        apply_events(state);
    }
}

/// Deals the selected board and starts the clock. Prompts when nothing is
/// selected.
fn start_selected_game(state: &Rc<RefCell<AppState>>, parent: &impl IsA<gtk::Widget>) {
    let result = {
        let mut st = state.borrow_mut();
        let selected = st.selected;
        st.session.new_game_for(selected)
    };
    match result {
        Ok(()) => {
            apply_events(state);
            state.borrow_mut().session.start();
            apply_events(state);
            show_game(state);
        }
        Err(GameError::NoDifficultySelected) => {
            show_missing_difficulty_dialog(parent);
        }
        Err(err) => error!(error = %err, "could not deal a new game"),
    }
}

fn restart_game(state: &Rc<RefCell<AppState>>) {
    let result = state.borrow_mut().session.restart();
    if let Err(err) = result {
        error!(error = %err, "could not restart");
        return;
    }
    apply_events(state);
    state.borrow_mut().session.start();
    apply_events(state);
    show_game(state);
}

pub fn run(config: GameConfig) -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let state = Rc::new(RefCell::new(AppState::new(&config)));

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                let was_running = state.borrow_mut().session.stop_timer();
                let dialog = show_instructions_dialog(&app);
                let state_resume = state.clone();
                dialog.connect_response(None, move |_, _| {
                    if was_running {
                        state_resume.borrow_mut().session.start_timer();
                    }
                    apply_events(&state_resume);
                });
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let title_menu = gtk::Label::new(None);
        title_menu.set_markup("<b>Concentration</b>");
        title_menu.set_halign(gtk::Align::Center);

        let title_game_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_game_box.set_valign(gtk::Align::Center);
        title_game_box.set_halign(gtk::Align::Center);
        title_game_box.set_hexpand(true);

        let title_game_main = gtk::Label::builder()
            .label("Concentration")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();

        let title_game_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();

        title_game_box.append(&title_game_main);
        title_game_box.append(&title_game_subtitle);

        let title_victory = gtk::Label::new(Some(&gettext("Victory")));
        title_victory.add_css_class("game-title-main");

        let header = adw::HeaderBar::builder().title_widget(&title_menu).build();
        header.add_css_class("flat");

        let back_button = gtk::Button::builder()
            .icon_name("go-previous-symbolic")
            .build();
        back_button.set_tooltip_text(Some(&gettext("Back")));
        back_button.connect_clicked({
            let state = state.clone();
            move |_| {
                show_menu(&state);
            }
        });
        header.pack_start(&back_button);

        let menu_model = gio::Menu::new();
        menu_model.append(Some(&gettext("Instructions")), Some("app.instructions"));
        menu_model.append(Some(&gettext("About Concentration")), Some("app.about"));
        menu_model.append(Some(&gettext("Quit")), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let restart_button = gtk::Button::builder()
            .icon_name("view-refresh-symbolic")
            .build();
        restart_button.set_tooltip_text(Some(&gettext("New Game")));
        restart_button.connect_clicked({
            let state = state.clone();
            move |_| {
                restart_game(&state);
            }
        });
        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&restart_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let view_stack = gtk::Stack::new();
        view_stack.set_hexpand(true);
        view_stack.set_vexpand(true);
        view_stack.set_transition_duration(300);

        let game_view = build_game_view(&state);
        view_stack.add_named(&game_view, Some("game"));

        let victory_view = build_victory_view(&state);
        view_stack.add_named(&victory_view, Some("victory"));

        let menu_view = build_menu_view(&state);
        view_stack.add_named(&menu_view, Some("menu"));

        view_stack.set_visible_child_name("menu");
        let toolbar = adw::ToolbarView::new();
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&view_stack));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Concentration")
            .default_width(860)
            .default_height(680)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);

        {
            let mut st = state.borrow_mut();
            st.view_stack = Some(view_stack.clone());
            st.header = Some(header.clone());
            st.back_button = Some(back_button);
            st.restart_button = Some(restart_button);
            st.title_menu = Some(title_menu);
            st.title_game = Some(title_game_box.upcast::<gtk::Widget>());
            st.title_game_subtitle = Some(title_game_subtitle);
            st.title_victory = Some(title_victory.upcast::<gtk::Widget>());
            refresh_best_time(&st);
        }

        let global_key = gtk::EventControllerKey::new();
        global_key.set_propagation_phase(gtk::PropagationPhase::Capture);
        global_key.connect_key_pressed({
            let state = state.clone();
            move |_, key, _, _| {
                if key != gdk::Key::Escape {
                    return glib::Propagation::Proceed;
                }
                let in_game = state
                    .borrow()
                    .view_stack
                    .as_ref()
                    .and_then(|stack| stack.visible_child_name())
                    .as_deref()
                    == Some("game");
                if in_game {
                    show_menu(&state);
                    return glib::Propagation::Stop;
                }
                glib::Propagation::Proceed
            }
        });
        win.add_controller(global_key);

        super::hud::set_header_menu(&state);
        start_pump(&state);
        win.present();
    });

    app.run()
}

fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_string(STYLE);
    match gdk::Display::default() {
        Some(display) => gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("no display, skipping stylesheet"),
    }
}

fn build_menu_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 6);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);

    let title = gtk::Label::new(Some("Concentration"));
    title.add_css_class("main-menu-title");
    title.add_css_class("title-1");

    let levels = gtk::Box::new(gtk::Orientation::Vertical, 8);
    levels.set_halign(gtk::Align::Center);
    levels.add_css_class("linked");

    let selected = state.borrow().selected;
    let mut group: Option<gtk::ToggleButton> = None;
    for difficulty in Difficulty::ALL {
        let (cols, rows) = difficulty.config();
        let toggle = gtk::ToggleButton::with_label(&format!(
            "{}  ({}x{})",
            gettext(difficulty.name()),
            cols,
            rows
        ));
        toggle.set_size_request(180, 40);
        if let Some(first) = &group {
            toggle.set_group(Some(first));
        } else {
            group = Some(toggle.clone());
        }
        toggle.set_active(selected == Some(difficulty));
        toggle.connect_toggled({
            let state = state.clone();
            move |button| {
                if button.is_active() {
                    let mut st = state.borrow_mut();
                    st.selected = Some(difficulty);
                    refresh_best_time(&st);
                }
            }
        });
        levels.append(&toggle);
    }

    let best_time = gtk::Label::new(None);
    best_time.add_css_class("dim-label");

    let start_button = gtk::Button::with_label(&gettext("Start Game"));
    start_button.add_css_class("suggested-action");
    start_button.add_css_class("pill");
    start_button.set_size_request(180, 40);
    start_button.connect_clicked({
        let state = state.clone();
        move |button| {
            start_selected_game(&state, button);
        }
    });

    content.append(&title);
    content.append(&levels);
    content.append(&best_time);
    content.append(&start_button);
    center.set_center_widget(Some(&content));
    root.append(&center);

    state.borrow_mut().best_time_label = Some(best_time);

    root
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_hexpand(true);
    content.set_vexpand(true);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);

    let board_card = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_card.set_halign(gtk::Align::Fill);
    board_card.set_valign(gtk::Align::Fill);
    board_card.set_hexpand(true);
    board_card.set_vexpand(true);
    board_card.add_css_class("concentration-card-container");

    content.append(&board_card);
    root.append(&content);

    state.borrow_mut().board_container = Some(board_card);

    root
}

fn build_victory_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 14);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.set_margin_top(28);
    content.set_margin_bottom(28);
    content.set_margin_start(28);
    content.set_margin_end(28);

    let title = gtk::Label::new(Some(&gettext("Board Cleared!")));
    title.add_css_class("victory-title");
    title.add_css_class("title-1");

    let stats = gtk::Label::new(None);
    stats.add_css_class("body");
    stats.set_wrap(true);
    stats.set_justify(gtk::Justification::Center);
    stats.set_max_width_chars(36);

    let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    buttons.set_halign(gtk::Align::Center);
    buttons.set_margin_top(6);

    let again_btn = gtk::Button::with_label(&gettext("Play Again"));
    again_btn.add_css_class("suggested-action");
    let menu_btn = gtk::Button::with_label(&gettext("Main Menu"));

    again_btn.connect_clicked({
        let state = state.clone();
        move |_| {
            restart_game(&state);
        }
    });
    menu_btn.connect_clicked({
        let state = state.clone();
        move |_| {
            show_menu(&state);
        }
    });

    buttons.append(&again_btn);
    buttons.append(&menu_btn);

    content.append(&title);
    content.append(&stats);
    content.append(&buttons);
    center.set_center_widget(Some(&content));
    root.append(&center);

    {
        let mut st = state.borrow_mut();
        st.victory_title_label = Some(title);
        st.victory_stats_label = Some(stats);
    }

    root
}

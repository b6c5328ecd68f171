use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gettextrs::gettext;
use gtk4::glib;
use gtk4::prelude::*;

use super::app::apply_events;
use super::state::AppState;
use crate::game::format_mm_ss;

const PUMP_INTERVAL_MS: u64 = 50;

pub(super) fn set_header_menu(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let (Some(header), Some(title)) = (&st.header, &st.title_menu) {
        header.set_title_widget(Some(title));
    }
    if let Some(back) = &st.back_button {
        back.set_visible(false);
    }
    if let Some(restart) = &st.restart_button {
        restart.set_visible(false);
    }
}

pub(super) fn set_header_game(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let (Some(header), Some(title_box)) = (&st.header, &st.title_game) {
        update_subtitle(&st);
        header.set_title_widget(Some(title_box));
    }
    if let Some(back) = &st.back_button {
        back.set_visible(true);
    }
    if let Some(restart) = &st.restart_button {
        restart.set_visible(true);
    }
}

pub(super) fn set_header_victory(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let (Some(header), Some(title)) = (&st.header, &st.title_victory) {
        header.set_title_widget(Some(title));
    }
    if let Some(back) = &st.back_button {
        back.set_visible(true);
    }
    if let Some(restart) = &st.restart_button {
        restart.set_visible(false);
    }
}

pub(super) fn update_subtitle(st: &AppState) {
    let Some(subtitle) = &st.title_game_subtitle else {
        return;
    };
    let Some(game) = st.session.game() else {
        subtitle.set_text("");
        return;
    };
    let mode_label = match st.selected {
        Some(difficulty) => gettext(difficulty.name()),
        None => game.grid().to_string(),
    };
    subtitle.set_text(&format!(
        "{} | {} | {} {}",
        mode_label,
        format_mm_ss(game.elapsed_seconds()),
        game.moves(),
        gettext("moves")
    ));
}

/// Drives the session clock from wall time and applies whatever it emitted.
pub(super) fn start_pump(state: &Rc<RefCell<AppState>>) {
    state.borrow_mut().last_pump = Instant::now();
    let state_clone = state.clone();
    glib::timeout_add_local(Duration::from_millis(PUMP_INTERVAL_MS), move || {
        {
            let mut st = state_clone.borrow_mut();
            let now = Instant::now();
            let elapsed = now.duration_since(st.last_pump);
            st.last_pump = now;
            st.session.advance(elapsed);
        }
        apply_events(&state_clone);
        glib::ControlFlow::Continue
    });
}

use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::prelude::*;

use super::board::build_board_grid;
use super::hud::{set_header_game, set_header_menu, set_header_victory};
use super::state::AppState;
use crate::game::{WinSummary, format_mm_ss};

pub(super) fn rebuild_board(state: &Rc<RefCell<AppState>>) {
    let (board_container, grid_cols, grid_rows) = {
        let st = state.borrow();
        (st.board_container.clone(), st.grid_cols, st.grid_rows)
    };
    let Some(board_container) = board_container else {
        return;
    };

    while let Some(child) = board_container.first_child() {
        board_container.remove(&child);
    }
    let grid = build_board_grid(state);
    let grid_ratio = if grid_rows > 0 {
        grid_cols as f32 / grid_rows as f32
    } else {
        1.0
    };
    let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
    grid_frame.set_halign(gtk::Align::Fill);
    grid_frame.set_valign(gtk::Align::Fill);
    grid_frame.set_hexpand(true);
    grid_frame.set_vexpand(true);
    grid_frame.set_child(Some(&grid));
    board_container.append(&grid_frame);
}

fn victory_texts(summary: &WinSummary) -> (String, String) {
    let title = if summary.is_new_record {
        gettext("New Record!")
    } else {
        gettext("Board Cleared!")
    };
    let best_line = match summary.previous_best {
        Some(best) if summary.is_new_record => {
            format!("{}: {}", gettext("Previous best"), format_mm_ss(best))
        }
        Some(best) => format!("{}: {}", gettext("Best"), format_mm_ss(best)),
        None => gettext("First clear of this board"),
    };
    let stats = format!(
        "{}: {}\n{}: {}\n{}: {}%\n{}",
        gettext("Time"),
        summary.formatted_time,
        gettext("Moves"),
        summary.moves,
        gettext("Precision"),
        summary.precision_pct,
        best_line
    );
    (title, stats)
}

pub(super) fn show_victory(state: &Rc<RefCell<AppState>>, summary: &WinSummary) {
    {
        let st = state.borrow();
        let (title, stats) = victory_texts(summary);
        if let Some(label) = &st.victory_title_label {
            label.set_text(&title);
        }
        if let Some(label) = &st.victory_stats_label {
            label.set_text(&stats);
        }
    }
    set_header_victory(state);
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        stack.set_visible_child_name("victory");
    }
}

pub(super) fn show_game(state: &Rc<RefCell<AppState>>) {
    set_header_game(state);
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        stack.set_visible_child_name("game");
    }
}

pub(super) fn refresh_best_time(st: &AppState) {
    let Some(label) = &st.best_time_label else {
        return;
    };
    let text = match st.selected {
        Some(difficulty) => match st.session.best_time(difficulty.grid()) {
            Some(best) => format!("{}: {}", gettext("Best time"), format_mm_ss(best)),
            None => gettext("No best time yet"),
        },
        None => String::new(),
    };
    label.set_text(&text);
}

pub(super) fn show_menu(state: &Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        st.session.abandon();
        st.tiles.clear();
        refresh_best_time(&st);
    }
    set_header_menu(state);
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideRight);
        stack.set_visible_child_name("menu");
    }
}

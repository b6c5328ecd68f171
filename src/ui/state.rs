use std::time::Instant;

use gtk4 as gtk;
use gtk4::gdk;
use libadwaita as adw;
use tracing::warn;

use crate::config::GameConfig;
use crate::error::AudioError;
use crate::game::{AudioCue, CardView, Difficulty, GameEvent, Glyph, Session};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub glyph: Glyph,
    pub status: TileStatus,
}

impl From<CardView> for Tile {
    fn from(card: CardView) -> Self {
        Tile {
            glyph: card.glyph,
            status: if card.matched {
                TileStatus::Matched
            } else {
                TileStatus::Hidden
            },
        }
    }
}

/// Victory cue: the display bell.
pub struct BellCue;

impl AudioCue for BellCue {
    fn play_victory(&mut self) -> Result<(), AudioError> {
        let display = gdk::Display::default()
            .ok_or_else(|| AudioError::Unavailable("no default display".to_string()))?;
        display.beep();
        Ok(())
    }
}

pub type GameSession = Session<Vec<GameEvent>, BellCue, Box<dyn KeyValueStore>>;

fn records_store(config: &GameConfig) -> Box<dyn KeyValueStore> {
    match config.records_path.clone().or_else(JsonFileStore::default_path) {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => {
            warn!("no config directory, best times will not be kept");
            Box::new(MemoryStore::new())
        }
    }
}

pub struct AppState {
    pub view_stack: Option<gtk::Stack>,
    pub header: Option<adw::HeaderBar>,
    pub back_button: Option<gtk::Button>,
    pub restart_button: Option<gtk::Button>,
    pub title_menu: Option<gtk::Label>,
    pub title_game: Option<gtk::Widget>,
    pub title_game_subtitle: Option<gtk::Label>,
    pub title_victory: Option<gtk::Widget>,
    pub victory_title_label: Option<gtk::Label>,
    pub victory_stats_label: Option<gtk::Label>,
    pub best_time_label: Option<gtk::Label>,
    pub board_container: Option<gtk::Box>,

    pub session: GameSession,
    pub selected: Option<Difficulty>,
    pub tiles: Vec<Tile>,
    pub grid_buttons: Vec<gtk::Button>,
    pub grid_cols: i32,
    pub grid_rows: i32,
    pub last_pump: Instant,
}

impl AppState {
    pub fn new(config: &GameConfig) -> Self {
        AppState {
            view_stack: None,
            header: None,
            back_button: None,
            restart_button: None,
            title_menu: None,
            title_game: None,
            title_game_subtitle: None,
            title_victory: None,
            victory_title_label: None,
            victory_stats_label: None,
            best_time_label: None,
            board_container: None,
            session: Session::new(config, records_store(config), Vec::new(), BellCue),
            selected: config.default_difficulty,
            tiles: Vec::new(),
            grid_buttons: Vec::new(),
            grid_cols: 0,
            grid_rows: 0,
            last_pump: Instant::now(),
        }
    }

    /// Events the session produced since the last drain.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(self.session.renderer_mut())
    }
}

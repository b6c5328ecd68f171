//! Headless game core: deck, shuffle, timer, state machine and session.

pub mod deck;
pub mod difficulty;
pub mod schedule;
pub mod session;
pub mod shuffle;
pub mod state;
pub mod timer;

pub use deck::{Card, CardId, Glyph, GridSize, PALETTE, generate_deck, new_shuffled_deck};
pub use difficulty::Difficulty;
pub use schedule::{Task, TaskHandle, TaskQueue};
pub use session::{AudioCue, CardView, GameEvent, Renderer, Session, Silent, WinSummary};
pub use shuffle::{fisher_yates, shuffle_cards};
pub use state::{Game, MatchOutcome, Phase};
pub use timer::{Timer, format_mm_ss};

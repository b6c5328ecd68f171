//! # Concentration
//!
//! A memory-pairs card game. The player flips two face-down cards at a time
//! looking for matching symbols, against the clock.
//!
//! ## Modules
//!
//! - [`game`]: Deck, shuffle, timer, flip/match state machine and session
//! - [`store`]: Best time per board shape
//! - [`config`]: JSON configuration loading and validation
//! - [`error`]: Structured error types
//! - `ui`: GTK/libadwaita frontend (feature `gui`)

pub mod config;
pub mod error;
pub mod game;
pub mod store;
#[cfg(feature = "gui")]
pub mod ui;

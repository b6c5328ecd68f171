pub mod app;
mod board;
mod dialogs;
mod hud;
mod scene;
pub mod state;

use std::path::PathBuf;

/// Errors raised while setting up a game. Flip requests never error; they
/// are accepted or rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("grid must have at least one row and one column (got {cols}x{rows})")]
    InvalidGrid { rows: u16, cols: u16 },

    #[error("a {cols}x{rows} grid has an odd number of cards and cannot be paired")]
    OddCardCount { rows: u16, cols: u16 },

    #[error("{pairs} pairs requested but the glyph palette only has {palette} symbols")]
    PaletteExhausted { pairs: usize, palette: usize },

    #[error("no difficulty selected")]
    NoDifficultySelected,
}

/// Errors from a best-time storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed records file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("stored value for {key} is not a number of seconds: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Failure of the victory cue. Always logged and dropped by the session.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

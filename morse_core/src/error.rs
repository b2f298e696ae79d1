//! Error types for the morse_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for morse_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// WAV rendering error
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Character outside the supported alphabet
    #[error("Unknown character: {0:?}")]
    UnknownCharacter(char),

    /// Pattern text containing something other than marks and gaps
    #[error("Malformed pattern: unexpected {symbol:?} at position {position}")]
    MalformedPattern { symbol: char, position: usize },

    /// Invalid speed parameters
    #[error("Timing error: {0}")]
    Timing(String),

    /// Progression or curriculum generation error
    #[error("Curriculum error: {0}")]
    Curriculum(String),

    /// Tone or haptic device error
    #[error("Device error: {0}")]
    Device(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),
}

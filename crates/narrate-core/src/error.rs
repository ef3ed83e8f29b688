//! Error types for narrate

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown voice '{voice}' (known voices: {known})")]
    InvalidVoice { voice: String, known: String },

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Playback unavailable: {0}")]
    PlaybackUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Whether the whole run must stop, as opposed to skipping one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::ConfigError(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::SynthesisFailed(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

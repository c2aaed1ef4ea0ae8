use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced through the narration error channel.
///
/// Control methods never return these; they are published as
/// [`NarrationEvent::Error`](crate::NarrationEvent::Error) instead.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum NarrationError {
    /// Narration cannot start at all, e.g. a missing credential.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The render request or its network transport failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// Local decoding or playback of a rendered clip failed.
    #[error("playback error: {0}")]
    Playback(String),
    /// The synthesis engine or service reported a failure.
    #[error("synthesis error: {0}")]
    Upstream(String),
}

impl NarrationError {
    /// Human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(m) | Self::Transport(m) | Self::Playback(m) | Self::Upstream(m) => m,
        }
    }
}

impl From<reqwest::Error> for NarrationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, NarrationError>;

use crate::NarrationError;
use serde::{Deserialize, Serialize};

/// A word (or sentence) reached during narration.
///
/// `char_index` is a byte offset into the full narrated text, not into the
/// sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBoundary {
    pub char_index: usize,
    pub char_length: usize,
    pub sentence_index: usize,
}

impl WordBoundary {
    /// Fraction of `total_len` narrated once this word is spoken, clamped to `1.0`.
    pub fn progress(&self, total_len: usize) -> f32 {
        if total_len == 0 {
            return 1.0;
        }
        ((self.char_index + self.char_length) as f32 / total_len as f32).min(1.0)
    }
}

/// A voice offered by a backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Options for one `speak` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakOptions {
    pub rate: f32,
    pub voice: Option<String>,
    pub start_sentence: usize,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            voice: None,
            start_sentence: 0,
        }
    }
}

impl SpeakOptions {
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn starting_at(mut self, sentence: usize) -> Self {
        self.start_sentence = sentence;
        self
    }
}

/// States of the playback controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
    Paused,
    Finished,
    Error,
}

/// Notifications published to highlight and progress sinks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NarrationEvent {
    WordBoundary(WordBoundary),
    /// Every sentence has been narrated.
    End,
    Error(NarrationError),
}

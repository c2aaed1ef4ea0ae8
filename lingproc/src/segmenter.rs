//! Sentence segmentation with positions.
//!
//! [`split_into_sentences`] is the single tokenizer shared by playback and
//! highlighting. Both sides index sentences by position in its output, so any
//! change here shifts both at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Runs of text up to and including a terminator, plus trailing whitespace.
/// A newline also ends a run because it is excluded from the body.
static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?\n]+[.!?]?\s*").unwrap());

/// A trimmed sentence and the byte offset where it starts in the source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    pub start: usize,
}

impl SentenceSpan {
    /// Create a span for `text` beginning at `start`.
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }

    /// Byte offset one past the last byte of the sentence.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Split `text` into sentence spans.
///
/// Spans are trimmed and never empty. Their `start` offsets are
/// non-decreasing. Text without any terminator or newline yields one span
/// covering the trimmed input.
///
/// # Examples
/// ```
/// use lingproc::split_into_sentences;
///
/// let spans = split_into_sentences("Hi there. How are you? Fine!");
/// let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
/// assert_eq!(starts, vec![0, 10, 23]);
/// ```
pub fn split_into_sentences(text: &str) -> Vec<SentenceSpan> {
    let mut spans: Vec<SentenceSpan> = SENTENCE
        .find_iter(text)
        .filter_map(|m| {
            let raw = m.as_str();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            let leading = raw.len() - raw.trim_start().len();
            Some(SentenceSpan::new(trimmed, m.start() + leading))
        })
        .collect();

    if spans.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let leading = text.len() - text.trim_start().len();
            spans.push(SentenceSpan::new(trimmed, leading));
        }
    }
    spans
}

/// Number of sentences [`split_into_sentences`] would produce.
pub fn sentence_count(text: &str) -> usize {
    split_into_sentences(text).len()
}

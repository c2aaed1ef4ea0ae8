//! Word spans within a single sentence.
//!
//! Words are maximal runs of non-whitespace, so punctuation stays attached to
//! the word it follows. Offsets are byte offsets relative to the input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Position of one word inside a sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub offset: usize,
    pub len: usize,
}

/// Collect the word spans of `text` in reading order.
///
/// ```
/// use lingproc::{word_spans, WordSpan};
///
/// let words = word_spans("Hello,  world!");
/// assert_eq!(words, vec![WordSpan { offset: 0, len: 6 }, WordSpan { offset: 8, len: 6 }]);
/// ```
pub fn word_spans(text: &str) -> Vec<WordSpan> {
    WORD.find_iter(text)
        .map(|m| WordSpan {
            offset: m.start(),
            len: m.len(),
        })
        .collect()
}

/// Count the words in `text`.
pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Length of the non-whitespace run starting exactly at `offset`.
///
/// Returns `None` when `offset` is out of range, not on a char boundary, or
/// points at whitespace.
pub fn word_len_at(text: &str, offset: usize) -> Option<usize> {
    let rest = text.get(offset..)?;
    let len = rest
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    (len > 0).then_some(len)
}

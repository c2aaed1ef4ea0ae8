//! Terminal rendering of the word being narrated.

use tts::{SentenceSpan, WordBoundary, split_into_sentences};

/// Renders boundary notifications as a bracketed sentence plus a progress bar.
pub struct Highlighter {
    sentences: Vec<SentenceSpan>,
    text_len: usize,
    bar_width: usize,
}

impl Highlighter {
    pub fn new(text: &str, bar_width: usize) -> Self {
        Self {
            sentences: split_into_sentences(text),
            text_len: text.len(),
            bar_width,
        }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// One line for `boundary`, e.g. `Hi [there]. [####------]  40%`.
    ///
    /// Boundaries that fall outside their sentence render the plain sentence.
    pub fn render(&self, boundary: &WordBoundary) -> String {
        let Some(sentence) = self.sentences.get(boundary.sentence_index) else {
            return progress_bar(boundary.progress(self.text_len), self.bar_width);
        };
        let start = boundary.char_index.saturating_sub(sentence.start);
        let end = start + boundary.char_length;
        let text = &sentence.text;
        let line = match (text.get(..start), text.get(start..end), text.get(end..)) {
            (Some(before), Some(word), Some(after)) if boundary.char_index >= sentence.start => {
                format!("{before}[{word}]{after}")
            }
            _ => text.clone(),
        };
        format!(
            "{line} {}",
            progress_bar(boundary.progress(self.text_len), self.bar_width)
        )
    }
}

/// A `width`-cell bar with a right-aligned percentage.
pub fn progress_bar(fraction: f32, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f32).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}

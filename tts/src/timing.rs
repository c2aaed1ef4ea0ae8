//! Approximate word timing for clips that carry no boundary information.
//!
//! [`TimingApproximator`] spreads a sentence's words evenly over a clip's
//! duration. A [`TickSchedule`] is the pure description of when each word is
//! reached; a [`WordTicker`] drives one schedule on the tokio clock and is
//! cancelled by dropping it.

use crate::task::ScopedTask;
use lingproc::{word_spans, WordSpan};
use std::time::Duration;
use tokio::time::Instant;

/// Word positions of one sentence, used to derive synthetic ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingApproximator {
    words: Vec<WordSpan>,
}

impl TimingApproximator {
    /// Tokenize `sentence` into non-whitespace words.
    pub fn new(sentence: &str) -> Self {
        Self {
            words: word_spans(sentence),
        }
    }

    pub fn words(&self) -> &[WordSpan] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Ticks for every word, spread across the full `duration`.
    pub fn schedule(&self, duration: Duration) -> TickSchedule {
        self.schedule_from(0, duration)
    }

    /// Ticks for words `start_word..`, spread across `remaining`.
    pub fn schedule_from(&self, start_word: usize, remaining: Duration) -> TickSchedule {
        let total = self.words.len();
        let pending = total.saturating_sub(start_word);
        if pending == 0 || remaining.is_zero() {
            return TickSchedule::empty(total);
        }
        TickSchedule {
            first_word: start_word,
            end_word: total,
            interval: remaining / pending as u32,
            emitted: 0,
        }
    }

    /// Recompute the schedule after a pause.
    ///
    /// The next word is `floor(position / duration * words)` and the words
    /// left are spread over `duration - position`.
    pub fn resume_schedule(&self, position: Duration, duration: Duration) -> TickSchedule {
        if duration.is_zero() {
            return TickSchedule::empty(self.words.len());
        }
        let progress = (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
        let next_word = (progress * self.words.len() as f64).floor() as usize;
        self.schedule_from(next_word, duration.saturating_sub(position))
    }
}

/// One synthetic boundary: `word_index` is reached `at` after the schedule starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub word_index: usize,
    pub at: Duration,
}

/// Evenly spaced ticks over a contiguous run of words.
///
/// Iterating yields one [`Tick`] per word; the first lands one interval after
/// the start and the last at the end of the covered duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickSchedule {
    first_word: usize,
    end_word: usize,
    interval: Duration,
    emitted: usize,
}

impl TickSchedule {
    fn empty(at: usize) -> Self {
        Self {
            first_word: at,
            end_word: at,
            interval: Duration::ZERO,
            emitted: 0,
        }
    }

    pub fn first_word(&self) -> usize {
        self.first_word
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks not yet yielded.
    pub fn remaining(&self) -> usize {
        self.end_word - self.first_word - self.emitted
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

impl Iterator for TickSchedule {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.is_empty() {
            return None;
        }
        let word_index = self.first_word + self.emitted;
        self.emitted += 1;
        Some(Tick {
            word_index,
            at: self.interval * self.emitted as u32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for TickSchedule {}

/// Drives a [`TickSchedule`] in real time. Dropping it cancels pending ticks.
pub struct WordTicker {
    _task: ScopedTask,
}

impl WordTicker {
    /// Start firing `on_tick` for each tick of `schedule`.
    ///
    /// Returns `None` without spawning anything when the schedule is empty.
    /// Ticks are measured from a fixed start instant, so a slow callback does
    /// not push later ticks back.
    pub fn start<F>(schedule: TickSchedule, mut on_tick: F) -> Option<Self>
    where
        F: FnMut(Tick) + Send + 'static,
    {
        if schedule.is_empty() {
            return None;
        }
        let started = Instant::now();
        let task = ScopedTask::spawn(async move {
            for tick in schedule {
                tokio::time::sleep_until(started + tick.at).await;
                on_tick(tick);
            }
        });
        Some(Self { _task: task })
    }
}

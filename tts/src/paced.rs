//! Text-only speech engine that walks words at a reading pace.
//!
//! Used when no audio engine is available: narration still produces word
//! boundaries, so highlighting and progress work without sound.

use crate::event_driven::{BoundaryKind, EngineEvent, EngineEvents, EngineFailure, SpeechEngine, Utterance};
use crate::task::ScopedTask;
use crate::{Result, Voice};
use async_trait::async_trait;
use lingproc::word_spans;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// [`SpeechEngine`] that emits boundaries at `words_per_minute × rate`.
pub struct PacedEngine {
    words_per_minute: u32,
    paused: watch::Sender<bool>,
    current: Mutex<Option<Current>>,
}

struct Current {
    _task: ScopedTask,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl PacedEngine {
    pub const DEFAULT_WPM: u32 = 180;
    pub const VOICE_NAME: &'static str = "Paced";

    pub fn new(words_per_minute: u32) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            words_per_minute: words_per_minute.max(1),
            paused,
            current: Mutex::new(None),
        }
    }

    fn word_delay(&self, rate: f32) -> Duration {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        Duration::from_secs_f64(60.0 / (self.words_per_minute as f64 * rate as f64))
    }
}

impl Default for PacedEngine {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WPM)
    }
}

#[async_trait]
impl SpeechEngine for PacedEngine {
    async fn speak(&self, utterance: Utterance) -> Result<EngineEvents> {
        let (tx, rx) = mpsc::unbounded_channel();
        let delay = self.word_delay(utterance.rate);
        let mut paused = self.paused.subscribe();
        let words = word_spans(&utterance.text);
        let events = tx.clone();
        let task = ScopedTask::spawn(async move {
            for word in words {
                while *paused.borrow() {
                    if paused.changed().await.is_err() {
                        return;
                    }
                }
                let _ = events.send(EngineEvent::Boundary {
                    kind: BoundaryKind::Word,
                    char_index: word.offset,
                    char_length: Some(word.len),
                });
                tokio::time::sleep(delay).await;
            }
            let _ = events.send(EngineEvent::End);
        });
        let previous = self.current.lock().unwrap().replace(Current {
            _task: task,
            events: tx,
        });
        if let Some(previous) = previous {
            let _ = previous.events.send(EngineEvent::Error(EngineFailure::Interrupted));
        }
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    fn pause(&self) {
        self.paused.send_replace(true);
    }

    fn resume(&self) {
        self.paused.send_replace(false);
    }

    fn cancel(&self) {
        self.paused.send_replace(false);
        if let Some(current) = self.current.lock().unwrap().take() {
            let _ = current.events.send(EngineEvent::Error(EngineFailure::Interrupted));
        }
    }

    fn voices(&self) -> Vec<Voice> {
        vec![Voice::new(Self::VOICE_NAME, "en")]
    }

    async fn voices_ready(&self) {}
}

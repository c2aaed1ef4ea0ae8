//! Backend for engines that report word boundaries while speaking.

use crate::backend::{BackendKind, BackendSignal, SentenceJob, SignalSender, SynthesisBackend};
use crate::task::ScopedTask;
use crate::{NarrationError, Result, Voice};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use lingproc::word_len_at;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Text handed to a [`SpeechEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    /// `None` selects the engine's default voice.
    pub voice: Option<Voice>,
}

/// Granularity of an engine boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Why an utterance stopped early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineFailure {
    /// The utterance was cancelled before it started.
    Canceled,
    /// The utterance was cut off by a later cancel.
    Interrupted,
    /// A genuine synthesis failure.
    Synthesis(String),
}

impl EngineFailure {
    /// Interruptions are expected consequences of stop and skip.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Canceled | Self::Interrupted)
    }
}

/// Native notifications for one utterance. Offsets are relative to the
/// utterance text.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Boundary {
        kind: BoundaryKind,
        char_index: usize,
        char_length: Option<usize>,
    },
    End,
    Error(EngineFailure),
}

/// Stream of [`EngineEvent`]s for one utterance.
pub type EngineEvents = Pin<Box<dyn Stream<Item = EngineEvent> + Send>>;

/// A synthesis engine that emits boundary events as it speaks.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Queue `utterance` and return its event stream.
    async fn speak(&self, utterance: Utterance) -> Result<EngineEvents>;
    fn pause(&self);
    fn resume(&self);
    /// Drop the current utterance.
    fn cancel(&self);
    /// Current voice catalog; may be empty until [`voices_ready`](Self::voices_ready) resolves.
    fn voices(&self) -> Vec<Voice>;
    /// Resolves once the voice catalog has been loaded.
    async fn voices_ready(&self);
}

/// [`SynthesisBackend`] over a [`SpeechEngine`].
pub struct EventDrivenBackend {
    engine: Arc<dyn SpeechEngine>,
    active: Mutex<Option<ScopedTask>>,
}

impl EventDrivenBackend {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            active: Mutex::new(None),
        }
    }

    fn resolve_voice(&self, name: Option<&str>) -> Option<Voice> {
        let name = name?;
        let found = self.engine.voices().into_iter().find(|v| v.name == name);
        if found.is_none() {
            debug!(voice = name, "voice not offered by engine, using default");
        }
        found
    }
}

#[async_trait]
impl SynthesisBackend for EventDrivenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::EventDriven
    }

    async fn start_sentence(&self, job: SentenceJob, signals: SignalSender) {
        let SentenceJob {
            generation,
            index,
            sentence,
            rate,
            voice,
        } = job;
        let utterance = Utterance {
            text: sentence.text.clone(),
            rate,
            voice: self.resolve_voice(voice.as_deref()),
        };

        // Highlight the whole sentence until the first word arrives.
        let _ = signals.send(BackendSignal::Boundary {
            generation,
            sentence: index,
            offset: 0,
            length: sentence.text.len(),
        });

        let engine = self.engine.clone();
        let task = ScopedTask::spawn(async move {
            let mut events = match engine.speak(utterance).await {
                Ok(events) => events,
                Err(error) => {
                    warn!(%error, sentence = index, "engine rejected utterance");
                    let _ = signals.send(BackendSignal::Failed {
                        generation,
                        sentence: index,
                        error,
                    });
                    return;
                }
            };
            while let Some(event) = events.next().await {
                match event {
                    EngineEvent::Boundary {
                        kind: BoundaryKind::Word,
                        char_index,
                        char_length,
                    } => {
                        let length = char_length
                            .filter(|len| *len > 0)
                            .or_else(|| word_len_at(&sentence.text, char_index))
                            .unwrap_or(1);
                        let _ = signals.send(BackendSignal::Boundary {
                            generation,
                            sentence: index,
                            offset: char_index,
                            length,
                        });
                    }
                    EngineEvent::Boundary { .. } => {}
                    EngineEvent::End => break,
                    EngineEvent::Error(failure) if failure.is_interruption() => {
                        debug!(?failure, sentence = index, "utterance interrupted");
                        return;
                    }
                    EngineEvent::Error(EngineFailure::Synthesis(message)) => {
                        warn!(%message, sentence = index, "synthesis failed");
                        let _ = signals.send(BackendSignal::Failed {
                            generation,
                            sentence: index,
                            error: NarrationError::Upstream(message),
                        });
                        return;
                    }
                    EngineEvent::Error(_) => return,
                }
            }
            let _ = signals.send(BackendSignal::SentenceEnded {
                generation,
                sentence: index,
            });
        });
        *self.active.lock().unwrap() = Some(task);
    }

    async fn pause(&self) {
        self.engine.pause();
    }

    async fn resume(&self) {
        self.engine.resume();
    }

    async fn halt(&self) {
        self.active.lock().unwrap().take();
        self.engine.cancel();
    }

    async fn voices(&self) -> Vec<Voice> {
        let voices = self.engine.voices();
        if !voices.is_empty() {
            return voices;
        }
        self.engine.voices_ready().await;
        self.engine.voices()
    }
}

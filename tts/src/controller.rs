//! Sentence-synchronized playback control.
//!
//! The [`PlaybackController`] owns the narration state machine and drives a
//! [`SynthesisBackend`] one sentence at a time. Backends report progress as
//! [`BackendSignal`]s tagged with the session generation; a driver task
//! applies them in order, ignoring any that belong to a session replaced by a
//! later `speak`, `stop` or skip.

use crate::backend::{BackendSignal, SentenceJob, SignalSender, SynthesisBackend};
use crate::bus::NarrationBus;
use crate::task::ScopedTask;
use crate::{NarrationError, NarrationEvent, PlaybackState, SpeakOptions, Voice, WordBoundary};
use lingproc::{split_into_sentences, SentenceSpan};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, trace, warn};

/// Mutable state of the current narration session.
#[derive(Debug)]
struct Session {
    text: String,
    sentences: Vec<SentenceSpan>,
    index: usize,
    state: PlaybackState,
    rate: f32,
    voice: Option<String>,
    generation: u64,
    /// A sentence ended while paused; the next one starts on resume.
    advance_on_resume: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            text: String::new(),
            sentences: Vec::new(),
            index: 0,
            state: PlaybackState::Idle,
            rate: 1.0,
            voice: None,
            generation: 0,
            advance_on_resume: false,
        }
    }
}

/// Shared pieces used by both the public API and the driver task.
#[derive(Clone)]
struct Shared {
    backend: Arc<dyn SynthesisBackend>,
    session: Arc<Mutex<Session>>,
    bus: NarrationBus,
    signals: SignalSender,
}

impl Shared {
    /// Invalidate the running sentence and release backend resources.
    async fn teardown(&self, s: &mut Session) {
        s.generation += 1;
        s.advance_on_resume = false;
        self.backend.halt().await;
    }

    /// Start narrating `s.index`, or finish when it is past the end.
    async fn begin(&self, s: &mut Session) {
        if let Err(error) = self.backend.preflight() {
            self.raise(s, error).await;
            return;
        }
        let Some(sentence) = s.sentences.get(s.index).cloned() else {
            self.finish(s);
            return;
        };
        s.state = PlaybackState::Speaking;
        s.advance_on_resume = false;
        debug!(sentence = s.index, generation = s.generation, "starting sentence");
        let job = SentenceJob {
            generation: s.generation,
            index: s.index,
            sentence,
            rate: s.rate,
            voice: s.voice.clone(),
        };
        self.backend.start_sentence(job, self.signals.clone()).await;
    }

    fn finish(&self, s: &mut Session) {
        s.generation += 1;
        s.state = PlaybackState::Finished;
        info!(sentences = s.sentences.len(), "narration finished");
        self.bus.publish(NarrationEvent::End);
    }

    async fn raise(&self, s: &mut Session, error: NarrationError) {
        s.generation += 1;
        s.state = PlaybackState::Error;
        s.advance_on_resume = false;
        self.backend.halt().await;
        warn!(%error, sentence = s.index, "narration halted");
        self.bus.publish(NarrationEvent::Error(error));
    }

    /// Stop the current utterance and restart at the sentence chosen by
    /// `target`, which sees the current index. `None` or an index past the
    /// last sentence leaves everything untouched.
    async fn jump<F>(&self, target: F)
    where
        F: FnOnce(usize) -> Option<usize> + Send,
    {
        let mut s = self.session.lock().await;
        let Some(target) = target(s.index).filter(|t| *t < s.sentences.len()) else {
            trace!(count = s.sentences.len(), "ignoring out-of-range seek");
            return;
        };
        self.teardown(&mut s).await;
        s.index = target;
        info!(sentence = target, "seeking");
        self.begin(&mut s).await;
    }

    async fn handle(&self, signal: BackendSignal) {
        let mut s = self.session.lock().await;
        if signal.generation() != s.generation || signal.sentence() != s.index {
            trace!(?signal, current = s.generation, "dropping stale signal");
            return;
        }
        match signal {
            BackendSignal::Boundary {
                sentence,
                offset,
                length,
                ..
            } => {
                let Some(span) = s.sentences.get(sentence) else {
                    return;
                };
                let boundary = WordBoundary {
                    char_index: span.start + offset,
                    char_length: length,
                    sentence_index: sentence,
                };
                trace!(?boundary, "word boundary");
                self.bus.publish(NarrationEvent::WordBoundary(boundary));
            }
            BackendSignal::SentenceEnded { sentence, .. } => {
                s.index = sentence + 1;
                match s.state {
                    PlaybackState::Speaking => self.begin(&mut s).await,
                    PlaybackState::Paused => s.advance_on_resume = true,
                    _ => {}
                }
            }
            BackendSignal::Failed { error, .. } => self.raise(&mut s, error).await,
        }
    }
}

/// Plays text through a [`SynthesisBackend`] with sentence and word tracking.
///
/// At most one session is active per controller. Errors are never returned
/// from the control methods; subscribe to [`NarrationEvent`]s to observe
/// them. Must be created inside a tokio runtime.
pub struct PlaybackController {
    shared: Shared,
    _driver: ScopedTask,
}

impl PlaybackController {
    pub fn new(backend: Arc<dyn SynthesisBackend>) -> Self {
        Self::with_bus(backend, NarrationBus::default())
    }

    /// Create a controller publishing on an existing `bus`.
    pub fn with_bus(backend: Arc<dyn SynthesisBackend>, bus: NarrationBus) -> Self {
        let (signals, mut rx) = mpsc::unbounded_channel();
        let shared = Shared {
            backend,
            session: Arc::new(Mutex::new(Session::default())),
            bus,
            signals,
        };
        let driver_shared = shared.clone();
        let driver = ScopedTask::spawn(async move {
            while let Some(signal) = rx.recv().await {
                driver_shared.handle(signal).await;
            }
        });
        Self {
            shared,
            _driver: driver,
        }
    }

    /// Subscribe to boundary, end and error notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.shared.bus.subscribe()
    }

    /// Replace any current session and narrate `text`.
    pub async fn speak(&self, text: impl Into<String>, options: SpeakOptions) {
        let text = text.into();
        let mut s = self.shared.session.lock().await;
        self.shared.teardown(&mut s).await;
        s.sentences = split_into_sentences(&text);
        s.text = text;
        s.index = options.start_sentence;
        s.rate = options.rate;
        s.voice = options.voice;
        info!(
            sentences = s.sentences.len(),
            start = s.index,
            backend = ?self.shared.backend.kind(),
            "speaking"
        );
        self.shared.begin(&mut s).await;
    }

    /// Suspend narration. Only has an effect while speaking.
    pub async fn pause(&self) {
        let mut s = self.shared.session.lock().await;
        if s.state != PlaybackState::Speaking {
            return;
        }
        self.shared.backend.pause().await;
        s.state = PlaybackState::Paused;
        debug!(sentence = s.index, "paused");
    }

    /// Continue narration. Only has an effect while paused.
    pub async fn resume(&self) {
        let mut s = self.shared.session.lock().await;
        if s.state != PlaybackState::Paused {
            return;
        }
        debug!(sentence = s.index, "resumed");
        // The engine is still paused even when its sentence already ended.
        self.shared.backend.resume().await;
        if s.advance_on_resume {
            self.shared.begin(&mut s).await;
        } else {
            s.state = PlaybackState::Speaking;
        }
    }

    /// Stop narration and return to idle without notifying subscribers.
    pub async fn stop(&self) {
        let mut s = self.shared.session.lock().await;
        self.shared.teardown(&mut s).await;
        s.state = PlaybackState::Idle;
        debug!("stopped");
    }

    pub async fn skip_forward(&self) {
        self.shared.jump(|current| current.checked_add(1)).await;
    }

    pub async fn skip_backward(&self) {
        self.shared.jump(|current| current.checked_sub(1)).await;
    }

    /// Restart narration at sentence `index`. Out-of-range indices are ignored.
    pub async fn skip_to_sentence(&self, index: usize) {
        self.shared.jump(move |_| Some(index)).await;
    }

    /// Change the rate used from the next sentence on.
    pub async fn set_rate(&self, rate: f32) {
        self.shared.session.lock().await.rate = rate;
    }

    pub async fn voices(&self) -> Vec<Voice> {
        self.shared.backend.voices().await
    }

    pub async fn state(&self) -> PlaybackState {
        self.shared.session.lock().await.state
    }

    pub async fn current_sentence_index(&self) -> usize {
        self.shared.session.lock().await.index
    }

    pub async fn sentence_count(&self) -> usize {
        self.shared.session.lock().await.sentences.len()
    }

    pub async fn sentences(&self) -> Vec<SentenceSpan> {
        self.shared.session.lock().await.sentences.clone()
    }

    /// Length of the narrated text, for progress computation.
    pub async fn text_len(&self) -> usize {
        self.shared.session.lock().await.text.len()
    }

    pub async fn is_paused(&self) -> bool {
        self.state().await == PlaybackState::Paused
    }

    pub async fn is_speaking(&self) -> bool {
        matches!(
            self.state().await,
            PlaybackState::Speaking | PlaybackState::Paused
        )
    }
}

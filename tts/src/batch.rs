//! Backend for services that return one finished clip per sentence.
//!
//! Each sentence is rendered, decoded and played from the start. The clip
//! carries no timing information, so word boundaries come from a
//! [`WordTicker`] spreading the sentence's words over the clip's duration.
//! Pausing cancels the ticker; resuming builds a fresh schedule for the words
//! that remain.

use crate::backend::{BackendKind, BackendSignal, SentenceJob, SignalSender, SynthesisBackend};
use crate::task::ScopedTask;
use crate::timing::{TickSchedule, TimingApproximator, WordTicker};
use crate::{NarrationError, Result, Voice};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters for one render call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderRequest {
    pub text: String,
    pub voice: String,
    pub model: String,
    pub speed: f32,
}

/// Turns a sentence into an opaque audio payload.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Fail fast when rendering cannot work at all, e.g. without credentials.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    async fn render(&self, request: RenderRequest) -> Result<Vec<u8>>;
}

/// Decodes rendered audio into playable clips.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn load(&self, audio: Vec<u8>) -> Result<Arc<dyn Clip>>;
}

/// A decoded clip. Created paused at position zero.
#[async_trait]
pub trait Clip: Send + Sync {
    /// Total length; resolves once the clip's metadata is available.
    async fn duration(&self) -> Result<Duration>;
    fn play(&self) -> Result<()>;
    fn pause(&self);
    /// Current playback position.
    fn position(&self) -> Duration;
    /// Resolves when playback reaches the natural end, or fails.
    async fn ended(&self) -> Result<()>;
    /// Stop playback and free the underlying handle.
    fn release(&self);
}

/// Voices offered when none are configured.
pub const DEFAULT_VOICES: [&str; 6] = ["alloy", "echo", "fable", "nova", "onyx", "shimmer"];

/// [`SynthesisBackend`] over a [`Renderer`] and an [`AudioOutput`].
pub struct BatchAudioBackend {
    renderer: Arc<dyn Renderer>,
    output: Arc<dyn AudioOutput>,
    model: String,
    default_voice: String,
    voices: Vec<Voice>,
    active: Arc<Mutex<Option<ActiveSentence>>>,
}

/// Everything owned by the sentence currently being narrated. Dropping it
/// cancels the ticker and the worker.
struct ActiveSentence {
    generation: u64,
    index: usize,
    timing: Arc<TimingApproximator>,
    signals: SignalSender,
    paused: bool,
    clip: Option<Arc<dyn Clip>>,
    duration: Option<Duration>,
    ticker: Option<WordTicker>,
    worker: Option<ScopedTask>,
}

impl ActiveSentence {
    fn start_ticker(&mut self, schedule: TickSchedule) {
        let timing = self.timing.clone();
        let signals = self.signals.clone();
        let (generation, sentence) = (self.generation, self.index);
        debug!(
            sentence,
            words = schedule.remaining(),
            interval_ms = schedule.interval().as_millis() as u64,
            "starting word ticker"
        );
        self.ticker = WordTicker::start(schedule, move |tick| {
            if let Some(word) = timing.words().get(tick.word_index) {
                let _ = signals.send(BackendSignal::Boundary {
                    generation,
                    sentence,
                    offset: word.offset,
                    length: word.len,
                });
            }
        });
    }

    fn release_clip(&mut self) {
        self.ticker = None;
        if let Some(clip) = self.clip.take() {
            clip.release();
        }
    }

    fn fail(&mut self, error: NarrationError) {
        warn!(%error, sentence = self.index, "sentence narration failed");
        self.release_clip();
        let _ = self.signals.send(BackendSignal::Failed {
            generation: self.generation,
            sentence: self.index,
            error,
        });
    }
}

impl Drop for ActiveSentence {
    fn drop(&mut self) {
        self.release_clip();
    }
}

impl BatchAudioBackend {
    pub fn new(renderer: Arc<dyn Renderer>, output: Arc<dyn AudioOutput>) -> Self {
        Self {
            renderer,
            output,
            model: "tts-1".into(),
            default_voice: DEFAULT_VOICES[0].into(),
            voices: DEFAULT_VOICES.iter().map(|v| Voice::new(*v, "en")).collect(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }
}

/// Run `f` against the active sentence if it still belongs to `generation`.
fn with_current<R>(
    active: &Mutex<Option<ActiveSentence>>,
    generation: u64,
    f: impl FnOnce(&mut ActiveSentence) -> R,
) -> Option<R> {
    let mut guard = active.lock().unwrap();
    match guard.as_mut() {
        Some(current) if current.generation == generation => Some(f(current)),
        _ => None,
    }
}

async fn narrate(
    active: Arc<Mutex<Option<ActiveSentence>>>,
    renderer: Arc<dyn Renderer>,
    output: Arc<dyn AudioOutput>,
    generation: u64,
    request: RenderRequest,
) {
    let audio = match renderer.render(request).await {
        Ok(audio) => audio,
        Err(e) => {
            with_current(&active, generation, |s| s.fail(e));
            return;
        }
    };
    let clip = match output.load(audio).await {
        Ok(clip) => clip,
        Err(e) => {
            with_current(&active, generation, |s| s.fail(e));
            return;
        }
    };

    let installed = with_current(&active, generation, |s| {
        s.clip = Some(clip.clone());
        if !s.paused {
            if let Err(e) = clip.play() {
                s.fail(e);
                return false;
            }
        }
        true
    });
    match installed {
        Some(true) => {}
        Some(false) => return,
        None => {
            clip.release();
            return;
        }
    }

    match clip.duration().await {
        Ok(duration) => {
            with_current(&active, generation, |s| {
                s.duration = Some(duration);
                if !s.paused {
                    s.start_ticker(s.timing.schedule(duration));
                }
            });
        }
        Err(e) => {
            with_current(&active, generation, |s| s.fail(e));
            return;
        }
    }

    let outcome = clip.ended().await;
    with_current(&active, generation, |s| {
        match outcome {
            Ok(()) => {
                s.release_clip();
                let _ = s.signals.send(BackendSignal::SentenceEnded {
                    generation,
                    sentence: s.index,
                });
            }
            Err(e) => s.fail(e),
        }
    });
}

#[async_trait]
impl SynthesisBackend for BatchAudioBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::BatchAudio
    }

    fn preflight(&self) -> Result<()> {
        self.renderer.preflight()
    }

    async fn start_sentence(&self, job: SentenceJob, signals: SignalSender) {
        let request = RenderRequest {
            text: job.sentence.text.clone(),
            voice: job.voice.clone().unwrap_or_else(|| self.default_voice.clone()),
            model: self.model.clone(),
            speed: job.rate,
        };
        info!(sentence = job.index, voice = %request.voice, "rendering sentence");

        // Install the slot before spawning so the worker always finds it.
        let previous = self.active.lock().unwrap().replace(ActiveSentence {
            generation: job.generation,
            index: job.index,
            timing: Arc::new(TimingApproximator::new(&job.sentence.text)),
            signals,
            paused: false,
            clip: None,
            duration: None,
            ticker: None,
            worker: None,
        });
        drop(previous);

        let worker = ScopedTask::spawn(narrate(
            self.active.clone(),
            self.renderer.clone(),
            self.output.clone(),
            job.generation,
            request,
        ));
        with_current(&self.active, job.generation, |s| s.worker = Some(worker));
    }

    async fn pause(&self) {
        let mut guard = self.active.lock().unwrap();
        let Some(current) = guard.as_mut() else {
            return;
        };
        if current.paused {
            return;
        }
        current.paused = true;
        current.ticker = None;
        if let Some(clip) = &current.clip {
            clip.pause();
        }
    }

    async fn resume(&self) {
        let mut guard = self.active.lock().unwrap();
        let Some(current) = guard.as_mut() else {
            return;
        };
        if !current.paused {
            return;
        }
        current.paused = false;
        let Some(clip) = current.clip.clone() else {
            // Still rendering; the worker starts playback when the clip lands.
            return;
        };
        if let Err(e) = clip.play() {
            current.fail(e);
            return;
        }
        if let Some(duration) = current.duration {
            let schedule = current.timing.resume_schedule(clip.position(), duration);
            current.start_ticker(schedule);
        }
    }

    async fn halt(&self) {
        let previous = self.active.lock().unwrap().take();
        if let Some(previous) = previous {
            debug!(sentence = previous.index, "halting sentence");
        }
    }

    async fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }
}

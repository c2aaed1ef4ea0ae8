use crate::{NarrationError, Result, Voice};
use async_trait::async_trait;
use lingproc::SentenceSpan;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Which synthesis model a backend follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The engine reports word boundaries while it speaks.
    EventDriven,
    /// One pre-rendered clip per sentence, timing approximated locally.
    BatchAudio,
}

/// One sentence handed to a backend for narration.
#[derive(Clone, Debug, PartialEq)]
pub struct SentenceJob {
    /// Session generation the job belongs to.
    pub generation: u64,
    /// Position of the sentence in the session's sentence list.
    pub index: usize,
    pub sentence: SentenceSpan,
    pub rate: f32,
    pub voice: Option<String>,
}

/// Progress reported by a backend for a [`SentenceJob`].
///
/// Offsets are relative to the sentence text; the controller makes them
/// absolute. Every signal carries the job's generation so the controller can
/// discard reports from a session it has already replaced.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendSignal {
    Boundary {
        generation: u64,
        sentence: usize,
        offset: usize,
        length: usize,
    },
    SentenceEnded {
        generation: u64,
        sentence: usize,
    },
    Failed {
        generation: u64,
        sentence: usize,
        error: NarrationError,
    },
}

impl BackendSignal {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Boundary { generation, .. }
            | Self::SentenceEnded { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    pub fn sentence(&self) -> usize {
        match self {
            Self::Boundary { sentence, .. }
            | Self::SentenceEnded { sentence, .. }
            | Self::Failed { sentence, .. } => *sentence,
        }
    }
}

/// Channel a backend reports [`BackendSignal`]s on.
pub type SignalSender = mpsc::UnboundedSender<BackendSignal>;

/// Sentence-level synthesis capability.
///
/// A backend narrates one sentence at a time on behalf of the
/// [`PlaybackController`](crate::PlaybackController). `start_sentence` returns
/// as soon as the work is scheduled; progress arrives on the signal channel.
/// Control methods must not block on synthesis and never fail: problems are
/// reported as [`BackendSignal::Failed`].
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Check that narration is possible at all before any render attempt.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Begin narrating `job`, replacing whatever the backend was doing.
    async fn start_sentence(&self, job: SentenceJob, signals: SignalSender);

    /// Suspend the current sentence.
    async fn pause(&self);

    /// Continue a suspended sentence.
    async fn resume(&self);

    /// Stop the current sentence and release its resources. No further
    /// signals are sent for it.
    async fn halt(&self);

    /// Voices this backend can speak with.
    async fn voices(&self) -> Vec<Voice>;
}

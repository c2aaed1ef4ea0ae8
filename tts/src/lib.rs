//! Sentence-synchronized narration.
//!
//! Text is split into sentences and narrated one at a time through a
//! [`SynthesisBackend`]. Two backends are provided: [`EventDrivenBackend`]
//! for engines that report word boundaries themselves, and
//! [`BatchAudioBackend`] for services that return a finished clip per
//! sentence, whose word timing is approximated by [`TimingApproximator`].
//! [`PlaybackController`] drives either one and publishes
//! [`NarrationEvent`]s for highlighting and progress.

pub mod backend;
pub mod batch;
pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod event_driven;
pub mod openai;
pub mod paced;
#[cfg(feature = "playback")]
pub mod rodio_output;
pub mod task;
pub mod timing;
pub mod types;

pub use crate::backend::{BackendKind, BackendSignal, SentenceJob, SignalSender, SynthesisBackend};
pub use crate::batch::{AudioOutput, BatchAudioBackend, Clip, RenderRequest, Renderer};
pub use crate::bus::NarrationBus;
pub use crate::config::{ProviderKind, Settings};
pub use crate::controller::PlaybackController;
pub use crate::error::{NarrationError, Result};
pub use crate::event_driven::{
    BoundaryKind, EngineEvent, EngineEvents, EngineFailure, EventDrivenBackend, SpeechEngine, Utterance,
};
pub use crate::openai::OpenAiRenderer;
pub use crate::paced::PacedEngine;
#[cfg(feature = "playback")]
pub use crate::rodio_output::RodioOutput;
pub use crate::task::ScopedTask;
pub use crate::timing::{Tick, TickSchedule, TimingApproximator, WordTicker};
pub use crate::types::*;
pub use lingproc::{split_into_sentences, SentenceSpan};

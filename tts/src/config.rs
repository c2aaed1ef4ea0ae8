use crate::backend::SynthesisBackend;
use crate::batch::{AudioOutput, BatchAudioBackend};
use crate::event_driven::EventDrivenBackend;
use crate::openai::OpenAiRenderer;
use crate::paced::PacedEngine;
use crate::{NarrationError, Result, SpeakOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Which synthesis provider narrates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Event-driven engine on the local machine.
    #[default]
    Native,
    /// Pre-rendered clips from the OpenAI speech endpoint.
    OpenAi,
}

/// Narration preferences, as persisted by a settings store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderKind,
    /// Voice name; `None` picks the provider default.
    pub voice: Option<String>,
    pub api_key: Option<String>,
    /// Render model for the OpenAI provider.
    pub model: String,
    /// Playback rate, also sent as the render speed.
    pub speed: f32,
    /// Pace of the text-only native engine.
    pub words_per_minute: u32,
    /// Override for the OpenAI endpoint host.
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Native,
            voice: None,
            api_key: None,
            model: "tts-1".into(),
            speed: 1.0,
            words_per_minute: PacedEngine::DEFAULT_WPM,
            base_url: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NarrationError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            NarrationError::Configuration(format!("invalid settings in {}: {e}", path.display()))
        })
    }

    /// Options for a `speak` call honouring these settings.
    pub fn speak_options(&self) -> SpeakOptions {
        SpeakOptions {
            rate: self.speed,
            voice: self.voice.clone().filter(|v| !v.is_empty()),
            start_sentence: 0,
        }
    }

    /// Build the backend for the configured provider.
    ///
    /// The OpenAI provider needs `audio` to play its clips; a missing API key
    /// is not checked here but reported when narration starts.
    pub fn build_backend(
        &self,
        audio: Option<Arc<dyn AudioOutput>>,
    ) -> Result<Arc<dyn SynthesisBackend>> {
        match self.provider {
            ProviderKind::Native => {
                let engine = Arc::new(PacedEngine::new(self.words_per_minute));
                Ok(Arc::new(EventDrivenBackend::new(engine)))
            }
            ProviderKind::OpenAi => {
                let audio = audio.ok_or_else(|| {
                    NarrationError::Configuration("no audio output available for OpenAI playback".into())
                })?;
                let mut renderer = OpenAiRenderer::new(self.api_key.clone());
                if let Some(url) = &self.base_url {
                    renderer = renderer.with_base_url(url.clone());
                }
                let mut backend =
                    BatchAudioBackend::new(Arc::new(renderer), audio).with_model(self.model.clone());
                if let Some(voice) = self.voice.as_ref().filter(|v| !v.is_empty()) {
                    backend = backend.with_default_voice(voice.clone());
                }
                Ok(Arc::new(backend))
            }
        }
    }
}

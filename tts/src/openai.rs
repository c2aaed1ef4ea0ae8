use crate::batch::{RenderRequest, Renderer};
use crate::{NarrationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Client for the OpenAI speech endpoint.
#[derive(Clone)]
pub struct OpenAiRenderer {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl OpenAiRenderer {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    /// Create a renderer using `api_key`. A missing or blank key is reported
    /// by [`Renderer::preflight`] rather than here.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Target a different host, e.g. a proxy or a mock server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            NarrationError::Configuration("No API key configured. Add your OpenAI API key in settings.".into())
        })
    }
}

#[async_trait]
impl Renderer for OpenAiRenderer {
    fn preflight(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    async fn render(&self, request: RenderRequest) -> Result<Vec<u8>> {
        let key = self.api_key()?;
        let url = format!("{}/v1/audio/speech", self.base_url);
        info!(%url, voice = %request.voice, model = %request.model, "requesting speech");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&SpeechRequest {
                model: &request.model,
                input: &request.text,
                voice: &request.voice,
                speed: request.speed,
                response_format: "mp3",
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("API error ({})", status.as_u16()));
            return Err(NarrationError::Upstream(message));
        }
        let bytes = resp.bytes().await?;
        debug!(len = bytes.len(), "speech received");
        Ok(bytes.to_vec())
    }
}

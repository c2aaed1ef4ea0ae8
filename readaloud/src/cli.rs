use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tts::{ProviderKind, Settings};

/// Read text aloud, highlighting each word as it is spoken.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Text to narrate; read from --file or stdin when omitted
    pub text: Vec<String>,

    /// Narrate the contents of a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, env = "READALOUD_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Synthesis provider: `native` or `openai`
    #[arg(long, env = "READALOUD_PROVIDER", value_parser = parse_provider)]
    pub provider: Option<ProviderKind>,

    /// Voice name
    #[arg(long, env = "READALOUD_VOICE")]
    pub voice: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI speech model
    #[arg(long, env = "READALOUD_MODEL")]
    pub model: Option<String>,

    /// OpenAI endpoint host
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Speech rate multiplier
    #[arg(long, env = "READALOUD_RATE")]
    pub rate: Option<f32>,

    /// Reading pace of the native engine
    #[arg(long, env = "READALOUD_WPM")]
    pub wpm: Option<u32>,

    /// Sentence to start from (1-based)
    #[arg(long, default_value_t = 1)]
    pub start: usize,

    /// Print notifications as JSON lines
    #[arg(long)]
    pub json: bool,

    /// List the provider's voices and exit
    #[arg(long)]
    pub list_voices: bool,
}

fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "native" => Ok(ProviderKind::Native),
        "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
        other => Err(format!("unknown provider `{other}`")),
    }
}

impl Cli {
    /// File settings with command line and environment overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(provider) = self.provider {
            settings.provider = provider;
        }
        if let Some(voice) = &self.voice {
            settings.voice = Some(voice.clone());
        }
        if let Some(key) = &self.api_key {
            settings.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            settings.base_url = Some(url.clone());
        }
        if let Some(rate) = self.rate {
            if !(rate.is_finite() && rate > 0.0) {
                bail!("rate must be a positive number, got {rate}");
            }
            settings.speed = rate;
        }
        if let Some(wpm) = self.wpm {
            settings.words_per_minute = wpm;
        }
        Ok(settings)
    }

    /// Zero-based sentence index to start from.
    pub fn start_sentence(&self) -> usize {
        self.start.saturating_sub(1)
    }

    /// Whether stdin is free for interactive commands.
    pub fn interactive(&self) -> bool {
        !self.text.is_empty() || self.file.is_some()
    }

    /// Text from the arguments, the file, or stdin, in that order.
    pub fn read_text(&self) -> Result<String> {
        if !self.text.is_empty() {
            return Ok(self.text.join(" "));
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        Ok(text)
    }
}

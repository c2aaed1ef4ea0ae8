use std::io::Write;
use tts::{BackendKind, NarrationError, ProviderKind, Settings, SynthesisBackend};

struct TempFile(std::path::PathBuf);

impl TempFile {
    fn with_contents(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn load_fills_missing_fields_with_defaults() {
    let file = TempFile::with_contents(
        "settings.json",
        r#"{"provider":"open_ai","voice":"shimmer","api_key":"sk-1"}"#,
    );
    let settings = Settings::load(&file.0).unwrap();
    assert_eq!(settings.provider, ProviderKind::OpenAi);
    assert_eq!(settings.voice.as_deref(), Some("shimmer"));
    assert_eq!(settings.model, "tts-1");
    assert_eq!(settings.speed, 1.0);
}

#[test]
fn invalid_settings_are_configuration_errors() {
    let file = TempFile::with_contents("broken.json", "{ not json");
    assert!(matches!(
        Settings::load(&file.0),
        Err(NarrationError::Configuration(_))
    ));
    assert!(matches!(
        Settings::load("/nonexistent/settings.json"),
        Err(NarrationError::Configuration(_))
    ));
}

#[test]
fn speak_options_follow_settings() {
    let settings = Settings {
        speed: 1.5,
        voice: Some(String::new()),
        ..Settings::default()
    };
    let options = settings.speak_options();
    assert_eq!(options.rate, 1.5);
    assert_eq!(options.voice, None);
    assert_eq!(options.start_sentence, 0);
}

#[tokio::test]
async fn native_provider_builds_event_driven_backend() {
    let backend = Settings::default().build_backend(None).unwrap();
    assert_eq!(backend.kind(), BackendKind::EventDriven);
    assert!(backend.preflight().is_ok());
}

#[tokio::test]
async fn openai_provider_needs_audio_output() {
    let settings = Settings {
        provider: ProviderKind::OpenAi,
        ..Settings::default()
    };
    assert!(matches!(
        settings.build_backend(None),
        Err(NarrationError::Configuration(_))
    ));
}

use clap::Parser;
use readaloud::{Cli, Command, Display, HELP, Highlighter, init_logging};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tts::{AudioOutput, PlaybackController};

#[cfg(feature = "playback")]
fn audio_output() -> Option<Arc<dyn AudioOutput>> {
    match tts::RodioOutput::try_default() {
        Ok(output) => Some(Arc::new(output)),
        Err(e) => {
            tracing::warn!(error = %e, "no audio device, OpenAI narration unavailable");
            None
        }
    }
}

#[cfg(not(feature = "playback"))]
fn audio_output() -> Option<Arc<dyn AudioOutput>> {
    None
}

/// Forward parsed stdin commands until EOF or `q`.
async fn read_commands(tx: mpsc::UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if tx.send(command).is_err() || command == Command::Quit {
                    return;
                }
            }
            Err(e) => eprintln!("{e}\n{HELP}"),
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let settings = cli.settings()?;
    let backend = settings.build_backend(audio_output())?;
    let controller = PlaybackController::new(backend);

    if cli.list_voices {
        for voice in controller.voices().await {
            println!("{}\t{}", voice.name, voice.lang);
        }
        return Ok(());
    }

    let text = cli.read_text()?;
    println!("Text extracted ({} words)", lingproc::word_count(&text));
    let highlighter = Highlighter::new(&text, 30);
    info!(sentences = highlighter.sentence_count(), provider = ?settings.provider, "narrating");

    let (cmd_tx, commands) = mpsc::unbounded_channel();
    if cli.interactive() {
        eprintln!("{HELP}");
        tokio::spawn(read_commands(cmd_tx));
    } else {
        drop(cmd_tx);
    }

    let events = controller.subscribe();
    controller
        .speak(text, settings.speak_options().starting_at(cli.start_sentence()))
        .await;

    let display = Display {
        highlighter,
        json: cli.json,
    };
    readaloud::run(&controller, &display, events, commands).await
}

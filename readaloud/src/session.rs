//! The narration loop: prints notifications and applies typed commands.

use crate::{Command, Highlighter};
use anyhow::anyhow;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tracing::{debug, warn};
use tts::{NarrationEvent, PlaybackController, PlaybackState};

/// How notifications are written to stdout.
pub struct Display {
    pub highlighter: Highlighter,
    pub json: bool,
}

impl Display {
    fn show(&self, event: &NarrationEvent) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let NarrationEvent::WordBoundary(boundary) = event {
            println!("{}", self.highlighter.render(boundary));
        }
        Ok(())
    }
}

async fn apply(controller: &PlaybackController, command: Command) {
    match command {
        Command::Pause => controller.pause().await,
        Command::Resume => controller.resume().await,
        Command::Next => controller.skip_forward().await,
        Command::Back => controller.skip_backward().await,
        Command::GoTo(index) => controller.skip_to_sentence(index).await,
        Command::Stop => controller.stop().await,
        Command::Quit => {}
    }
}

/// Run until narration ends, fails, or the user quits.
///
/// Closing the command channel while stopped also ends the session, since
/// nothing could restart it.
pub async fn run(
    controller: &PlaybackController,
    display: &Display,
    mut events: broadcast::Receiver<NarrationEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> anyhow::Result<()> {
    let mut commands_open = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    display.show(&event)?;
                    match event {
                        NarrationEvent::WordBoundary(_) => {}
                        NarrationEvent::End => return Ok(()),
                        NarrationEvent::Error(error) => return Err(anyhow!(error)),
                    }
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "display fell behind"),
                Err(RecvError::Closed) => return Ok(()),
            },
            command = commands.recv(), if commands_open => match command {
                Some(Command::Quit) => {
                    controller.stop().await;
                    return Ok(());
                }
                Some(command) => apply(controller, command).await,
                None => {
                    commands_open = false;
                    if controller.state().await == PlaybackState::Idle {
                        debug!("input closed while stopped");
                        return Ok(());
                    }
                }
            },
        }
    }
}

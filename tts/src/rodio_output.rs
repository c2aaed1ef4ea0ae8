//! Local playback of rendered clips through `rodio`.
//!
//! `rodio::OutputStream` is not `Send`, so it lives on a dedicated thread for
//! as long as the [`RodioOutput`] exists; clips only hold the `Send` handle.

use crate::batch::{AudioOutput, Clip};
use crate::{NarrationError, Result};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tracing::{debug, info};

/// How often a playing clip is checked for completion.
const END_POLL: Duration = Duration::from_millis(50);

/// [`AudioOutput`] on the default output device.
pub struct RodioOutput {
    handle: OutputStreamHandle,
    _keepalive: mpsc::Sender<()>,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn try_default() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (keepalive, shutdown) = mpsc::channel::<()>();
        std::thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Blocks until the RodioOutput is dropped.
                    let _ = shutdown.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| NarrationError::Playback(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|e| NarrationError::Playback(e.to_string()))?
            .map_err(NarrationError::Playback)?;
        info!("audio output initialized on default device");
        Ok(Self {
            handle,
            _keepalive: keepalive,
        })
    }
}

fn measure(audio: &[u8]) -> Result<Duration> {
    let source = Decoder::new(Cursor::new(audio.to_vec()))
        .map_err(|e| NarrationError::Playback(format!("could not decode audio: {e}")))?;
    if let Some(duration) = source.total_duration() {
        return Ok(duration);
    }
    let per_second = source.sample_rate() as f64 * source.channels() as f64;
    if per_second <= 0.0 {
        return Err(NarrationError::Playback("audio has no samples".into()));
    }
    let samples = source.count();
    Ok(Duration::from_secs_f64(samples as f64 / per_second))
}

#[async_trait]
impl AudioOutput for RodioOutput {
    async fn load(&self, audio: Vec<u8>) -> Result<Arc<dyn Clip>> {
        let handle = self.handle.clone();
        let clip = tokio::task::spawn_blocking(move || -> Result<RodioClip> {
            let duration = measure(&audio)?;
            let source = Decoder::new(Cursor::new(audio))
                .map_err(|e| NarrationError::Playback(format!("could not decode audio: {e}")))?;
            let sink = Sink::try_new(&handle).map_err(|e| NarrationError::Playback(e.to_string()))?;
            sink.pause();
            sink.append(source);
            debug!(duration_ms = duration.as_millis() as u64, "clip decoded");
            Ok(RodioClip { sink, duration })
        })
        .await
        .map_err(|e| NarrationError::Playback(e.to_string()))??;
        Ok(Arc::new(clip))
    }
}

/// A decoded clip queued on its own sink.
pub struct RodioClip {
    sink: Sink,
    duration: Duration,
}

#[async_trait]
impl Clip for RodioClip {
    async fn duration(&self) -> Result<Duration> {
        Ok(self.duration)
    }

    fn play(&self) -> Result<()> {
        self.sink.play();
        Ok(())
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    async fn ended(&self) -> Result<()> {
        while !self.sink.empty() {
            tokio::time::sleep(END_POLL).await;
        }
        Ok(())
    }

    fn release(&self) {
        self.sink.stop();
    }
}

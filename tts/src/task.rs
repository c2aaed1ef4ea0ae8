use std::future::Future;
use tokio::task::JoinHandle;

/// A spawned task that is aborted when its handle is dropped.
///
/// Timers and per-sentence workers are held in these so that every exit
/// path (pause, stop, advance, error) tears them down.
pub struct ScopedTask {
    handle: JoinHandle<()>,
}

impl ScopedTask {
    /// Spawn `fut` onto the current runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(fut),
        }
    }

    /// Whether the task has run to completion or been aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScopedTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

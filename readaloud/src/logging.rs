use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr, leaving stdout for narration output.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
///
/// ```
/// use readaloud::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

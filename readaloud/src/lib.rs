pub mod cli;
pub mod commands;
pub mod highlight;
pub mod logging;
pub mod session;

pub use cli::Cli;
pub use commands::{Command, HELP};
pub use highlight::{Highlighter, progress_bar};
pub use logging::init_logging;
pub use session::{Display, run};

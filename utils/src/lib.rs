//! Process-level plumbing: log initialisation and graceful shutdown.

pub mod logging;
pub mod shutdown;

pub use logging::{init_logging, LogFormat, LoggingError};
pub use shutdown::ShutdownController;

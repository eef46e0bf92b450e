pub mod logging;
pub mod text;

pub use logging::{init_tracing, LogGuard, LogLevel};

//! Tracing setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Crates whose events are shown by default.
const LOG_TARGET: &str = "recordbeam";

pub struct LogConfig {
    /// 0 = errors only, 1 = info, 2 = debug, 3+ = trace.
    pub verbose: u8,
}

impl LogConfig {
    pub fn filter(&self) -> EnvFilter {
        if let Ok(f) = EnvFilter::try_from_default_env() {
            return f;
        }
        let level = match self.verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("{LOG_TARGET}={level}"))
    }
}

/// Install a stderr `fmt` subscriber. Calling it twice is harmless.
pub fn init_logging(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .try_init();
}

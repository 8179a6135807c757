//! Logging utilities

use tracing::{debug, error};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

/// Environment variable holding extra filter directives
pub const LOG_ENV: &str = "MIXERCTL_LOG";

pub fn parse_log_level(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    debug!("Initialised logger: welcome to mixerctl!");
}

/// Create an oops (a fatal crash) with an associated error message
pub fn oops<S: Into<String>>(msg: S, code: u16) -> ! {
    error!("{}", msg.into());
    std::process::exit(code.into());
}

//! Setup for the application logging.
//!
//! It sends the logs to the standard output with the level defined in the
//! configuration (`off` loads no subscriber at all).
use std::sync::Once;

use tracing::{debug, level_filters::LevelFilter};
use ttorrent_configuration::{Configuration, LogLevel};

static INIT: Once = Once::new();

/// Initializes the logs once, with the level from the configuration.
pub fn setup(cfg: &Configuration) {
    let filter = config_level_or_default(cfg.core.log_level);

    if filter == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        stdout_init(filter);
    });
}

fn config_level_or_default(log_level: Option<LogLevel>) -> LevelFilter {
    match log_level {
        None => LevelFilter::INFO,
        Some(level) => match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        },
    }
}

fn stdout_init(filter: LevelFilter) {
    tracing_subscriber::fmt().with_max_level(filter).init();

    debug!("logging initialized.");
}

use std::io::{IsTerminal, Write};

use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;

/// Env var holding an `env_logger` filter string that overrides the defaults.
pub const LOG_ENV: &str = "OAICHAT_LOG";

/// Installs the process-wide logger on stderr.
///
/// Lines look like `<timestamp> - <target> - <LEVEL> - <message>`. This crate
/// logs at info (debug when `verbose`), everything else at warn. Calling it
/// twice keeps the first logger.
pub fn init(verbose: bool) {
    let colored = std::io::stderr().is_terminal();
    let _ = builder(verbose, colored).try_init();
}

pub fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn builder(verbose: bool, colored: bool) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), crate_level(verbose))
        .parse_env(Env::new().filter(LOG_ENV))
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                buf.timestamp(),
                record.target(),
                level_label(record.level(), colored),
                record.args()
            )
        });
    builder
}

fn level_label(level: Level, colored: bool) -> String {
    let label = level.as_str();
    if !colored {
        return label.to_string();
    }
    match level {
        Level::Error => label.red().bold().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Trace => label.dimmed().to_string(),
    }
}

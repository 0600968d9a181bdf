//! Logger initialization.

use std::io::Write;

use colored::Colorize;
use log::LevelFilter;

/// Initializes `env_logger` with colored level tags.
///
/// `RUST_LOG` is honored as a baseline; the level argument (from
/// `--log-level`) takes precedence. hickory's UDP stream warnings about
/// malformed responses are filtered down to errors since the resolver
/// recovers from them on its own.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("nsreport", level);

    builder.format(|buf, record| {
        let level = record.level();
        let tag = match level {
            log::Level::Error => level.to_string().red(),
            log::Level::Warn => level.to_string().yellow(),
            log::Level::Info => level.to_string().green(),
            log::Level::Debug => level.to_string().blue(),
            log::Level::Trace => level.to_string().purple(),
        };
        writeln!(buf, "{} [{}] {}", record.target().cyan(), tag, record.args())
    });

    // try_init so tests that initialize repeatedly do not panic.
    builder.try_init()
}

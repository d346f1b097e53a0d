// Logging utilities
// Author: Gabriel Demetrios Lafis

use std::io::Write;

use log::{LevelFilter, SetLoggerError};

/// Initialize logging with the given level.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}

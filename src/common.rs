use std::fs::{self, OpenOptions};
use std::path::Path;
use env_logger::Builder;
use std::io::Write;
use crate::{KvError, Result};

/// Name of the log file `init_logger` appends to.
pub const LOG_FILE: &str = "kvbind.log";

/// Routes `log` records to `<log_dir>/kvbind.log`.
///
/// The level follows `RUST_LOG` and defaults to `info`. Lines look like
/// `2024-01-01 12:00:00|DEBUG|kvbind::driver::kv_binding|: set app:a (ttl None)`.
///
/// # Errors
///
/// Fails if the directory or file cannot be created, or if a logger is
/// already installed.
pub fn init_logger(log_dir: impl AsRef<Path>) -> Result<()> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_dir.join(LOG_FILE))?;

    Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}|{}|{}|: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .map_err(|e| KvError::StringError(e.to_string()))
}

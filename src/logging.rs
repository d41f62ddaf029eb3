use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::EnvFilter;

use crate::{constants::FILE_NAMES, storage};

pub const LOG_ENV: &str = "STILLFRAME_LOG";

pub fn log_path() -> PathBuf {
    storage::get_state_dir().join(FILE_NAMES.log)
}

/// Sends `tracing` output to a log file, leaving the terminal to the prompts.
/// Returns the log path, or `None` when the file could not be opened.
pub fn init(path: &Path) -> Option<PathBuf> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    Some(path.to_path_buf())
}

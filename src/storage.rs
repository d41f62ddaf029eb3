use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::{
    constants::{FILE_NAMES, MAX_DATABASE_BACKUPS},
    error::AppError,
    movie::{MovieDatabase, MovieEntry},
};

const ROTATED_STAMP: &str = "%Y%m%d_%H%M%S%.3f";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stillframe", "stillframe")
}

pub fn get_data_dir() -> PathBuf {
    if Path::new(".").join(FILE_NAMES.database).exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = project_dirs() {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
    }
    get_data_dir()
}

pub fn get_config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    atomic_write(path, &json)
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), String> {
    atomic_write(path, content)
}

/// A missing database file is a first run, not a failure.
pub fn load_database(path: &Path) -> Result<MovieDatabase, AppError> {
    if !path.exists() {
        info!(path = %path.display(), "no database yet, starting empty");
        return Ok(MovieDatabase::empty());
    }

    let mut db: MovieDatabase = read_json(path).map_err(|reason| AppError::DatabaseRead {
        path: path.to_path_buf(),
        reason,
    })?;

    let dropped = db.dedupe_file_paths();
    if dropped > 0 {
        warn!(dropped, "database held duplicate file paths");
    }

    info!(path = %path.display(), movies = db.movies.len(), "loaded database");
    Ok(db)
}

/// Replaces the primary database file, keeping a rotated copy of the old one.
pub fn save_database(path: &Path, db: &MovieDatabase) -> Result<(), AppError> {
    let to_write_error = |reason: String| AppError::DatabaseWrite {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| to_write_error(e.to_string()))?;
        }
    }
    create_backup(path).map_err(to_write_error)?;
    write_json_atomic(path, db).map_err(to_write_error)?;

    info!(path = %path.display(), movies = db.movies.len(), "saved database");
    Ok(())
}

/// Bare array snapshot of in-progress edits.
pub fn save_backup(path: &Path, movies: &[MovieEntry]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io(format!("creating {}", parent.display()), e))?;
        }
    }
    write_json_atomic(path, movies)
        .map_err(|e| AppError::io(format!("writing backup {}", path.display()), e))
}

pub fn load_backup(path: &Path) -> Result<Vec<MovieEntry>, AppError> {
    read_json(path).map_err(|e| AppError::io(format!("reading backup {}", path.display()), e))
}

/// Copies the current file into `backups/` beside it before it is replaced,
/// keeping the newest [`MAX_DATABASE_BACKUPS`] copies.
pub fn create_backup(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }

    let dir = path
        .parent()
        .unwrap_or(Path::new("."))
        .join(FILE_NAMES.backups_dir);
    fs::create_dir_all(&dir).map_err(|e| format!("{}: {e}", dir.display()))?;

    let name = path.file_name().unwrap_or_default().to_string_lossy();
    let copy = dir.join(format!("{}.{}", name, Local::now().format(ROTATED_STAMP)));
    fs::copy(path, &copy).map_err(|e| format!("{}: {e}", copy.display()))?;

    let pruned = prune_rotated(&dir, &name, MAX_DATABASE_BACKUPS)?;
    if pruned > 0 {
        info!(pruned, dir = %dir.display(), "pruned old database copies");
    }
    Ok(())
}

/// Deletes the oldest `<name>.<stamp>` copies in `dir` beyond `keep`.
/// Stamps sort chronologically, so names order the copies.
fn prune_rotated(dir: &Path, name: &str, keep: usize) -> Result<usize, String> {
    let prefix = format!("{name}.");
    let mut copies: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| format!("{}: {e}", dir.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|copy| {
            copy.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    copies.sort();

    let excess = copies.len().saturating_sub(keep);
    for old in &copies[..excess] {
        fs::remove_file(old).map_err(|e| format!("{}: {e}", old.display()))?;
    }
    Ok(excess)
}

/// Writes a sibling `.tmp` file, syncs it and renames it over `path`, so
/// readers see either the old content or the new, never a partial file.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), String> {
    let tmp_path = path.with_extension("tmp");
    let replace = || -> io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    };
    replace().map_err(|e| format!("{}: {e}", path.display()))
}

use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::Path,
};

use tracing::{debug, info};

use crate::{
    error::AppError,
    movie::{MovieEntry, is_accepted_still},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub kept: Vec<MovieEntry>,
    pub added: Vec<MovieEntry>,
    pub dropped: Vec<MovieEntry>,
}

impl Reconciliation {
    /// Kept entries in their original order, then additions sorted by file name.
    pub fn movies(&self) -> Vec<MovieEntry> {
        self.kept.iter().chain(self.added.iter()).cloned().collect()
    }
}

/// Lists the stills directory. Only plain files are returned, sorted by name;
/// filtering to accepted images happens in [`reconcile`].
pub fn scan_stills_dir(dir: &Path) -> Result<Vec<String>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::StillsDirMissing(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("listing {}", dir.display()), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::io(format!("listing {}", dir.display()), e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        } else {
            debug!(name = ?entry.file_name(), "skipping non UTF-8 file name");
        }
    }

    names.sort();
    Ok(names)
}

pub fn reconcile(known: &[MovieEntry], scanned: &[String]) -> Reconciliation {
    let on_disk: BTreeSet<&str> = scanned
        .iter()
        .map(String::as_str)
        .filter(|name| is_accepted_still(name))
        .collect();

    let mut result = Reconciliation::default();
    let mut known_paths = HashSet::new();

    for entry in known {
        known_paths.insert(entry.file_path.as_str());
        if on_disk.contains(entry.file_path.as_str()) {
            result.kept.push(entry.clone());
        } else {
            result.dropped.push(entry.clone());
        }
    }

    for name in on_disk {
        if known_paths.contains(name) {
            continue;
        }
        match MovieEntry::blank(name) {
            Ok(entry) => result.added.push(entry),
            Err(e) => debug!(name, error = %e, "skipping still"),
        }
    }

    info!(
        kept = result.kept.len(),
        added = result.added.len(),
        dropped = result.dropped.len(),
        "reconciled database with stills directory"
    );
    result
}

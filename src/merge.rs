use std::collections::HashMap;

use crate::movie::MovieEntry;

/// Folds edited entries back into the full list by `file_path`, keeping the
/// full list's order. Edited entries missing from `full` are ignored.
pub fn merge(edited: &[MovieEntry], full: &[MovieEntry]) -> Vec<MovieEntry> {
    let by_path: HashMap<&str, &MovieEntry> = edited
        .iter()
        .map(|entry| (entry.file_path.as_str(), entry))
        .collect();

    full.iter()
        .map(|original| {
            by_path
                .get(original.file_path.as_str())
                .map(|edited| (*edited).clone())
                .unwrap_or_else(|| original.clone())
        })
        .collect()
}

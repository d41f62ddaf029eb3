//! Drawing movies for a round and writing the call sheet the host reads from.

use std::path::{Path, PathBuf};

use chrono::Local;
use itertools::Itertools;
use rand::Rng;
use tracing::{info, warn};

use crate::{
    constants::STAMP_FORMAT,
    error::AppError,
    movie::MovieEntry,
    shuffle::{pick_one_of, shuffle},
    storage,
};

/// Complete entries with one still per movie. Several stills of the same
/// title and year collapse into one, picked at random.
pub fn playable_movies<R: Rng + ?Sized>(movies: &[MovieEntry], rng: &mut R) -> Vec<MovieEntry> {
    let groups = movies
        .iter()
        .filter(|movie| movie.is_complete())
        .into_group_map_by(|movie| {
            (
                movie.movie_title.trim().to_lowercase(),
                movie.movie_year.clone(),
            )
        });

    let skipped = movies.len() - groups.values().map(Vec::len).sum::<usize>();
    if skipped > 0 {
        info!(skipped, "left incomplete entries out of the game");
    }

    groups
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .filter_map(|(_, stills)| pick_one_of(&stills, rng).map(|movie| (*movie).clone()))
        .collect()
}

/// Shuffled calls for one round, at most `count` of them.
pub fn draw_calls<R: Rng + ?Sized>(
    playable: Vec<MovieEntry>,
    count: Option<usize>,
    rng: &mut R,
) -> Vec<MovieEntry> {
    let mut calls = shuffle(playable, rng);
    if let Some(count) = count {
        if count > calls.len() {
            warn!(requested = count, available = calls.len(), "fewer movies than requested");
        }
        calls.truncate(count);
    }
    calls
}

/// Names that go onto the cards.
pub fn option_pool(playable: &[MovieEntry]) -> Vec<String> {
    playable.iter().map(MovieEntry::display_name).collect()
}

pub fn call_sheet_text(calls: &[MovieEntry]) -> String {
    calls
        .iter()
        .enumerate()
        .map(|(i, movie)| format!("{}. {}\n", i + 1, movie.display_name()))
        .collect()
}

pub fn stamped_file_name(prefix: &str, extension: &str) -> String {
    format!("{}-{}.{}", prefix, Local::now().format(STAMP_FORMAT), extension)
}

pub fn write_call_sheet(calls: &[MovieEntry], output_dir: &Path) -> Result<PathBuf, AppError> {
    let path = output_dir.join(stamped_file_name("call-sheet", "txt"));
    storage::write_text_file(&path, &call_sheet_text(calls))
        .map_err(|e| AppError::io(format!("writing call sheet {}", path.display()), e))?;
    info!(path = %path.display(), calls = calls.len(), "wrote call sheet");
    Ok(path)
}

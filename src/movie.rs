use std::{
    collections::HashSet,
    path::Path,
    sync::OnceLock,
};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{constants::ACCEPTED_EXTENSIONS, error::AppError};

/// One still on disk and the movie it shows. `file_path` is the stable identity
/// key: it is the still's file name relative to the stills directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEntry {
    pub file_path: String,
    pub movie_title: String,
    pub movie_year: String,
}

impl MovieEntry {
    pub fn new(
        file_path: impl Into<String>,
        movie_title: impl Into<String>,
        movie_year: impl Into<String>,
    ) -> Result<Self, AppError> {
        let file_path = file_path.into();
        if !is_accepted_still(&file_path) {
            return Err(AppError::validation(format!(
                "'{file_path}' is not an accepted still image"
            )));
        }

        let movie_year = movie_year.into().trim().to_string();
        if !is_valid_year(&movie_year) {
            return Err(AppError::validation(format!(
                "year '{movie_year}' for '{file_path}' must be empty or four digits"
            )));
        }

        Ok(Self {
            file_path,
            movie_title: movie_title.into().trim().to_string(),
            movie_year,
        })
    }

    pub fn blank(file_path: impl Into<String>) -> Result<Self, AppError> {
        Self::new(file_path, "", "")
    }

    pub fn with_details(&self, title: &str, year: &str) -> Result<Self, AppError> {
        Self::new(self.file_path.clone(), title, year)
    }

    pub fn is_complete(&self) -> bool {
        !self.movie_title.trim().is_empty() && !self.movie_year.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        match (self.movie_title.is_empty(), self.movie_year.is_empty()) {
            (true, _) => self.file_path.clone(),
            (false, true) => self.movie_title.clone(),
            (false, false) => format!("{} ({})", self.movie_title, self.movie_year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDatabase {
    pub last_scan: i64,
    pub movies: Vec<MovieEntry>,
}

impl MovieDatabase {
    pub fn empty() -> Self {
        Self {
            last_scan: 0,
            movies: Vec::new(),
        }
    }

    pub fn stamped(movies: Vec<MovieEntry>) -> Self {
        Self {
            last_scan: Utc::now().timestamp_millis(),
            movies,
        }
    }

    /// Drops repeated `file_path` rows, keeping the first occurrence.
    pub fn dedupe_file_paths(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.movies.len();
        self.movies.retain(|movie| {
            let fresh = seen.insert(movie.file_path.clone());
            if !fresh {
                warn!(file_path = %movie.file_path, "dropping duplicate database row");
            }
            fresh
        });
        before - self.movies.len()
    }

    pub fn incomplete_count(&self) -> usize {
        self.movies.iter().filter(|m| !m.is_complete()).count()
    }
}

pub fn is_accepted_still(file_name: &str) -> bool {
    if file_name.is_empty() || file_name.starts_with('.') {
        return false;
    }

    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

pub fn is_valid_year(year: &str) -> bool {
    year.is_empty() || (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()))
}

fn trailing_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<title>.+?)[\s._\-]*[(\[]?(?P<year>(?:18|19|20)\d{2})[)\]]?$")
            .expect("trailing year pattern is valid")
    })
}

/// Best-effort split of a still's file name into `(title, year)`.
///
/// Only a year at the very end of the stem counts, so "2001 A Space Odyssey.jpg"
/// keeps its leading number in the title. Without a match the whole stem becomes
/// the title and the year is empty.
pub fn guess_details_from_filename(file_name: &str) -> (String, String) {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);

    let tidy = |raw: &str| -> String {
        raw.replace(['_', '.'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };

    if let Some(caps) = trailing_year_pattern().captures(stem) {
        let title = tidy(&caps["title"]);
        if !title.is_empty() {
            return (title, caps["year"].to_string());
        }
    }

    (tidy(stem), String::new())
}

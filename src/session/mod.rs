//! Interactive reconciliation and editing of the movie database.
//!
//! A session walks `Scanning → ReconcileDecision → ListMode | SearchMode →
//! PerEntryEdit → MergeBack → Persist`. Quitting or pressing Ctrl+C ends the
//! editing loop early with an [`SessionOutcome::Aborted`] that still carries
//! every entry finished so far, and both paths go through the same merge and
//! persist steps as a normal finish. A backup snapshot is written after every
//! finished entry.

pub mod lookup;
pub mod prompt;
pub mod terminal;
pub mod viewer;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    merge::merge,
    movie::{MovieDatabase, MovieEntry, guess_details_from_filename, is_valid_year},
    reconcile::{Reconciliation, reconcile},
    storage,
};

use lookup::TitleLookup;
use prompt::{Answer, Prompter};
use viewer::StillViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Scanning,
    ReconcileDecision,
    ListMode,
    SearchMode,
    PerEntryEdit,
    MergeBack,
    Persist,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Quit,
    Interrupted,
}

/// Result of the editing loop. `Aborted` is a deliberate early stop, never a
/// failure: `partial` holds every entry finished before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Continue(Vec<MovieEntry>),
    Aborted {
        partial: Vec<MovieEntry>,
        reason: AbortReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    Keep,
    EditFields,
    RemoteLookup,
    Quit,
}

impl EntryDecision {
    const ALL: [EntryDecision; 4] = [
        EntryDecision::Keep,
        EntryDecision::EditFields,
        EntryDecision::RemoteLookup,
        EntryDecision::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            EntryDecision::Keep => "Keep as is",
            EntryDecision::EditFields => "Edit title and year",
            EntryDecision::RemoteLookup => "Look up the title online",
            EntryDecision::Quit => "Quit and save progress",
        }
    }
}

enum EntryStep {
    Done(MovieEntry),
    Quit,
    Interrupted,
}

enum LookupStep {
    Selected(MovieEntry),
    Fallback,
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub stills_dir: PathBuf,
    pub database: PathBuf,
    pub backup: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub added: usize,
    pub dropped: usize,
    pub finished: usize,
    pub aborted: Option<AbortReason>,
    pub movies: Vec<MovieEntry>,
}

pub struct EditSession<'a, P: Prompter, L: TitleLookup, V: StillViewer> {
    prompter: &'a mut P,
    lookup: &'a L,
    viewer: &'a mut V,
    paths: SessionPaths,
    state: SessionState,
}

impl<'a, P: Prompter, L: TitleLookup, V: StillViewer> EditSession<'a, P, L, V> {
    pub fn new(prompter: &'a mut P, lookup: &'a L, viewer: &'a mut V, paths: SessionPaths) -> Self {
        Self {
            prompter,
            lookup,
            viewer,
            paths,
            state: SessionState::Scanning,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn enter(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Runs a whole session over `database` and the scanned stills directory.
    pub fn run(
        &mut self,
        database: &MovieDatabase,
        scanned: &[String],
    ) -> Result<SessionReport, AppError> {
        self.enter(SessionState::Scanning);
        let reconciliation = reconcile(&database.movies, scanned);
        for dropped in &reconciliation.dropped {
            info!(file_path = %dropped.file_path, "still removed from disk, dropping entry");
        }
        let full = reconciliation.movies();

        self.enter(SessionState::ReconcileDecision);
        let targets = match self.choose_targets(&full)? {
            Answer::Value(targets) => targets,
            Answer::Interrupted => {
                let outcome = SessionOutcome::Aborted {
                    partial: Vec::new(),
                    reason: AbortReason::Interrupted,
                };
                return self.finalize(outcome, &full, &reconciliation);
            }
        };

        self.enter(SessionState::PerEntryEdit);
        let outcome = self.edit_entries(targets, &full)?;
        self.finalize(outcome, &full, &reconciliation)
    }

    fn choose_targets(&mut self, full: &[MovieEntry]) -> Result<Answer<Vec<MovieEntry>>, AppError> {
        let incomplete: Vec<MovieEntry> =
            full.iter().filter(|m| !m.is_complete()).cloned().collect();
        let complete = full.len() - incomplete.len();

        if complete > 0 {
            let question = format!(
                "{} entries need details and {} are complete. Revisit complete entries too?",
                incomplete.len(),
                complete
            );
            match self.prompter.confirm(&question, false)? {
                Answer::Interrupted => return Ok(Answer::Interrupted),
                Answer::Value(false) => {}
                Answer::Value(true) => return self.choose_revisit_mode(full, &incomplete),
            }
        }

        self.enter(SessionState::ListMode);
        Ok(Answer::Value(incomplete))
    }

    fn choose_revisit_mode(
        &mut self,
        full: &[MovieEntry],
        incomplete: &[MovieEntry],
    ) -> Result<Answer<Vec<MovieEntry>>, AppError> {
        let modes = vec![
            "Walk through every entry".to_string(),
            "Search by title or file name".to_string(),
        ];
        match self.prompter.select("How do you want to pick entries?", &modes)? {
            Answer::Interrupted => Ok(Answer::Interrupted),
            Answer::Value(0) => {
                self.enter(SessionState::ListMode);
                Ok(Answer::Value(full.to_vec()))
            }
            Answer::Value(_) => {
                self.enter(SessionState::SearchMode);
                self.search_targets(full, incomplete)
            }
        }
    }

    fn search_targets(
        &mut self,
        full: &[MovieEntry],
        incomplete: &[MovieEntry],
    ) -> Result<Answer<Vec<MovieEntry>>, AppError> {
        loop {
            let query = match self
                .prompter
                .input("Search titles and file names (empty for incomplete entries)", "")?
            {
                Answer::Interrupted => return Ok(Answer::Interrupted),
                Answer::Value(query) => query,
            };

            if query.is_empty() {
                return Ok(Answer::Value(incomplete.to_vec()));
            }

            let matches = search_entries(full, &query);
            if matches.is_empty() {
                self.prompter
                    .notify(&format!("Nothing matches '{query}', try again"));
                continue;
            }

            info!(query = %query, matches = matches.len(), "search selected entries");
            return Ok(Answer::Value(matches));
        }
    }

    fn edit_entries(
        &mut self,
        targets: Vec<MovieEntry>,
        full: &[MovieEntry],
    ) -> Result<SessionOutcome, AppError> {
        let total = targets.len();
        let mut finished: Vec<MovieEntry> = Vec::with_capacity(total);

        for (position, entry) in targets.into_iter().enumerate() {
            match self.edit_entry(entry, position + 1, total)? {
                EntryStep::Done(updated) => {
                    finished.push(updated);
                    self.write_backup(&finished, full)?;
                }
                EntryStep::Quit => {
                    return Ok(SessionOutcome::Aborted {
                        partial: finished,
                        reason: AbortReason::Quit,
                    });
                }
                EntryStep::Interrupted => {
                    return Ok(SessionOutcome::Aborted {
                        partial: finished,
                        reason: AbortReason::Interrupted,
                    });
                }
            }
        }

        Ok(SessionOutcome::Continue(finished))
    }

    fn edit_entry(
        &mut self,
        entry: MovieEntry,
        position: usize,
        total: usize,
    ) -> Result<EntryStep, AppError> {
        let choices: Vec<String> = EntryDecision::ALL
            .iter()
            .map(|d| d.label().to_string())
            .collect();

        loop {
            let question = format!(
                "[{position}/{total}] {}\nTitle: {}\nYear: {}",
                entry.file_path,
                blank_as_dash(&entry.movie_title),
                blank_as_dash(&entry.movie_year)
            );
            let decision = match self.prompter.select(&question, &choices)? {
                Answer::Interrupted => return Ok(EntryStep::Interrupted),
                Answer::Value(index) => EntryDecision::ALL
                    .get(index)
                    .copied()
                    .unwrap_or(EntryDecision::Keep),
            };

            match decision {
                EntryDecision::Keep => return Ok(EntryStep::Done(entry)),
                EntryDecision::Quit => return Ok(EntryStep::Quit),
                EntryDecision::EditFields => match self.edit_fields(&entry)? {
                    Answer::Value(updated) => return Ok(EntryStep::Done(updated)),
                    Answer::Interrupted => return Ok(EntryStep::Interrupted),
                },
                EntryDecision::RemoteLookup => match self.remote_lookup(&entry)? {
                    LookupStep::Selected(updated) => return Ok(EntryStep::Done(updated)),
                    LookupStep::Fallback => continue,
                    LookupStep::Interrupted => return Ok(EntryStep::Interrupted),
                },
            }
        }
    }

    fn edit_fields(&mut self, entry: &MovieEntry) -> Result<Answer<MovieEntry>, AppError> {
        let (guessed_title, guessed_year) = guess_details_from_filename(&entry.file_path);
        let initial_title = if entry.movie_title.is_empty() {
            guessed_title
        } else {
            entry.movie_title.clone()
        };
        let initial_year = if entry.movie_year.is_empty() {
            guessed_year
        } else {
            entry.movie_year.clone()
        };

        let title = match self.prompter.input("Movie title", &initial_title)? {
            Answer::Interrupted => return Ok(Answer::Interrupted),
            Answer::Value(title) => title,
        };

        let mut year_default = initial_year;
        loop {
            let year = match self.prompter.input("Release year (four digits)", &year_default)? {
                Answer::Interrupted => return Ok(Answer::Interrupted),
                Answer::Value(year) => year,
            };

            if is_valid_year(&year) {
                let updated = entry.with_details(&title, &year)?;
                info!(file_path = %updated.file_path, title = %updated.movie_title, year = %updated.movie_year, "entry edited");
                return Ok(Answer::Value(updated));
            }

            self.prompter
                .notify(&format!("'{year}' is not a four digit year"));
            year_default = year;
        }
    }

    fn remote_lookup(&mut self, entry: &MovieEntry) -> Result<LookupStep, AppError> {
        let query = if entry.movie_title.is_empty() {
            guess_details_from_filename(&entry.file_path).0
        } else {
            entry.movie_title.clone()
        };

        let matches = match self.lookup.search(&query) {
            Ok(matches) if matches.is_empty() => {
                self.prompter.notify(&format!("No matches for '{query}'"));
                return Ok(LookupStep::Fallback);
            }
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "title lookup failed");
                self.prompter.notify(&e.to_string());
                return Ok(LookupStep::Fallback);
            }
        };

        let mut choices: Vec<String> = matches.iter().map(|m| m.label()).collect();
        let open_index = choices.len();
        choices.push("Open the still to take a look".to_string());
        choices.push("None of these".to_string());

        loop {
            let question = format!("Matches for '{query}' ({})", entry.file_path);
            let index = match self.prompter.select(&question, &choices)? {
                Answer::Interrupted => return Ok(LookupStep::Interrupted),
                Answer::Value(index) => index,
            };

            if index < open_index {
                let picked = &matches[index];
                let updated = entry.with_details(&picked.title, &picked.year)?;
                info!(file_path = %updated.file_path, reference = %picked.reference, "entry filled from lookup");
                return Ok(LookupStep::Selected(updated));
            }
            if index == open_index {
                let still = self.paths.stills_dir.join(&entry.file_path);
                if let Err(e) = self.viewer.open(&still) {
                    self.prompter.notify(&e.to_string());
                }
                continue;
            }
            return Ok(LookupStep::Fallback);
        }
    }

    fn write_backup(&mut self, finished: &[MovieEntry], full: &[MovieEntry]) -> Result<(), AppError> {
        let snapshot = merge(finished, full);
        storage::save_backup(&self.paths.backup, &snapshot)?;
        debug!(finished = finished.len(), path = %self.paths.backup.display(), "backup written");
        Ok(())
    }

    /// Merges whatever was finished, snapshots it to the backup file and then
    /// replaces the primary database.
    fn finalize(
        &mut self,
        outcome: SessionOutcome,
        full: &[MovieEntry],
        reconciliation: &Reconciliation,
    ) -> Result<SessionReport, AppError> {
        let (finished, aborted) = match outcome {
            SessionOutcome::Continue(finished) => (finished, None),
            SessionOutcome::Aborted { partial, reason } => {
                info!(finished = partial.len(), ?reason, "session stopped early");
                (partial, Some(reason))
            }
        };

        self.enter(SessionState::MergeBack);
        let merged = merge(&finished, full);
        storage::save_backup(&self.paths.backup, &merged)?;

        self.enter(SessionState::Persist);
        storage::save_database(&self.paths.database, &MovieDatabase::stamped(merged.clone()))?;

        self.enter(SessionState::Done);
        Ok(SessionReport {
            added: reconciliation.added.len(),
            dropped: reconciliation.dropped.len(),
            finished: finished.len(),
            aborted,
            movies: merged,
        })
    }
}

pub fn search_entries(movies: &[MovieEntry], query: &str) -> Vec<MovieEntry> {
    let needle = query.trim().to_lowercase();
    movies
        .iter()
        .filter(|m| {
            m.movie_title.to_lowercase().contains(&needle)
                || m.file_path.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

fn blank_as_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

/// Recovers a backup snapshot into the database at `database`.
pub fn restore_backup(backup: &Path, database: &Path) -> Result<usize, AppError> {
    let snapshot = storage::load_backup(backup)?;
    let current = storage::load_database(database)?;
    let merged = merge(&snapshot, &current.movies);
    let changed = merged
        .iter()
        .zip(current.movies.iter())
        .filter(|(a, b)| a != b)
        .count();

    storage::save_database(database, &MovieDatabase::stamped(merged))?;
    info!(changed, "restored backup into database");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, fs, time::SystemTime};

    use super::*;
    use crate::session::lookup::TitleMatch;

    enum Step {
        Confirm(Answer<bool>),
        Select(Answer<usize>),
        Input(Answer<String>),
    }

    #[derive(Default)]
    struct ScriptedPrompter {
        steps: VecDeque<Step>,
        notices: Vec<String>,
        initial_inputs: Vec<String>,
        watched_backup: Option<PathBuf>,
        backup_at_select: Vec<Option<Vec<MovieEntry>>>,
    }

    impl ScriptedPrompter {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, question: &str, _default: bool) -> Result<Answer<bool>, AppError> {
            match self.steps.pop_front() {
                Some(Step::Confirm(answer)) => Ok(answer),
                _ => panic!("unexpected confirm: {question}"),
            }
        }

        fn select(&mut self, question: &str, _choices: &[String]) -> Result<Answer<usize>, AppError> {
            if let Some(path) = &self.watched_backup {
                self.backup_at_select.push(storage::load_backup(path).ok());
            }
            match self.steps.pop_front() {
                Some(Step::Select(answer)) => Ok(answer),
                _ => panic!("unexpected select: {question}"),
            }
        }

        fn input(&mut self, question: &str, initial: &str) -> Result<Answer<String>, AppError> {
            self.initial_inputs.push(initial.to_string());
            match self.steps.pop_front() {
                Some(Step::Input(answer)) => Ok(answer),
                _ => panic!("unexpected input: {question}"),
            }
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    struct FakeLookup {
        matches: Option<Vec<TitleMatch>>,
    }

    impl TitleLookup for FakeLookup {
        fn search(&self, _title: &str) -> Result<Vec<TitleMatch>, AppError> {
            match &self.matches {
                Some(matches) => Ok(matches.clone()),
                None => Err(AppError::Lookup("offline".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingViewer {
        opened: Vec<PathBuf>,
    }

    impl StillViewer for RecordingViewer {
        fn open(&mut self, path: &Path) -> Result<(), AppError> {
            self.opened.push(path.to_path_buf());
            Ok(())
        }
    }

    fn unique_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{prefix}_{now}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn paths_in(dir: &Path) -> SessionPaths {
        SessionPaths {
            stills_dir: dir.join("stills"),
            database: dir.join("movies.json"),
            backup: dir.join("movies.backup.json"),
        }
    }

    fn blank_db(names: &[&str]) -> MovieDatabase {
        MovieDatabase {
            last_scan: 0,
            movies: names.iter().map(|n| MovieEntry::blank(*n).unwrap()).collect(),
        }
    }

    fn scanned(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn value(s: &str) -> Step {
        Step::Input(Answer::Value(s.to_string()))
    }

    const FIVE: [&str; 5] = ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"];

    #[test]
    fn test_quit_after_two_edits_keeps_edits_and_untouched_originals() {
        let dir = unique_dir("stillframe_session_quit");
        let paths = paths_in(&dir);
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(1)),
            value("Alien"),
            value("1979"),
            Step::Select(Answer::Value(1)),
            value("Heat"),
            value("1995"),
            Step::Select(Answer::Value(3)),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let mut session = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone());
        let report = session.run(&blank_db(&FIVE), &scanned(&FIVE)).unwrap();
        assert_eq!(session.state(), SessionState::Done);

        assert_eq!(report.aborted, Some(AbortReason::Quit));
        assert_eq!(report.finished, 2);

        let backup = storage::load_backup(&paths.backup).unwrap();
        assert_eq!(backup.len(), 5);
        assert_eq!(backup[0].display_name(), "Alien (1979)");
        assert_eq!(backup[1].display_name(), "Heat (1995)");
        for (entry, name) in backup[2..].iter().zip(&FIVE[2..]) {
            assert_eq!(entry, &MovieEntry::blank(*name).unwrap());
        }

        let saved = storage::load_database(&paths.database).unwrap();
        assert_eq!(saved.movies, backup);
        assert!(saved.last_scan > 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_interrupt_mid_edit_routes_to_persist() {
        let dir = unique_dir("stillframe_session_interrupt");
        let paths = paths_in(&dir);
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(1)),
            value("Alien"),
            value("1979"),
            Step::Select(Answer::Value(1)),
            Step::Input(Answer::Interrupted),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&FIVE), &scanned(&FIVE))
            .unwrap();

        assert_eq!(report.aborted, Some(AbortReason::Interrupted));
        assert_eq!(report.finished, 1);
        let backup = storage::load_backup(&paths.backup).unwrap();
        assert_eq!(backup[0].movie_title, "Alien");
        assert!(!backup[1].is_complete());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_backup_written_after_each_entry() {
        let dir = unique_dir("stillframe_session_each");
        let paths = paths_in(&dir);
        let names = ["a.jpg", "b.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(1)),
            value("Alien"),
            value("1979"),
            Step::Select(Answer::Interrupted),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        let backup = storage::load_backup(&paths.backup).unwrap();
        assert_eq!(backup.len(), 2);
        assert!(backup[0].is_complete());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_backup_on_disk_before_next_entry_is_shown() {
        let dir = unique_dir("stillframe_session_on_disk");
        let paths = paths_in(&dir);
        let names = ["a.jpg", "b.jpg", "c.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(1)),
            value("Alien"),
            value("1979"),
            Step::Select(Answer::Value(3)),
        ]);
        prompter.watched_backup = Some(paths.backup.clone());
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        assert_eq!(prompter.backup_at_select.len(), 2);
        assert!(prompter.backup_at_select[0].is_none());
        let on_disk = prompter.backup_at_select[1]
            .as_ref()
            .expect("backup written after the first entry");
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk[0].display_name(), "Alien (1979)");
        assert!(!on_disk[1].is_complete());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_walk_every_entry_edits_a_complete_one() {
        let dir = unique_dir("stillframe_session_walk_all");
        let paths = paths_in(&dir);
        let db = MovieDatabase {
            last_scan: 0,
            movies: vec![
                MovieEntry::new("a.jpg", "Alien", "1979").unwrap(),
                MovieEntry::blank("b.jpg").unwrap(),
            ],
        };
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Confirm(Answer::Value(true)),
            Step::Select(Answer::Value(0)),
            Step::Select(Answer::Value(1)),
            value("Aliens"),
            value("1986"),
            Step::Select(Answer::Value(0)),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&db, &scanned(&["a.jpg", "b.jpg"]))
            .unwrap();

        assert_eq!(prompter.initial_inputs, vec!["Alien", "1979"]);
        assert_eq!(report.finished, 2);
        assert_eq!(report.aborted, None);
        assert_eq!(report.movies[0].display_name(), "Aliens (1986)");
        assert_eq!(report.movies[1], MovieEntry::blank("b.jpg").unwrap());
        let saved = storage::load_database(&paths.database).unwrap();
        assert_eq!(saved.movies, report.movies);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lookup_failure_falls_back_to_decision_prompt() {
        let dir = unique_dir("stillframe_session_lookup_fail");
        let paths = paths_in(&dir);
        let names = ["a.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(2)),
            Step::Select(Answer::Value(0)),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        assert_eq!(report.aborted, None);
        assert_eq!(prompter.notices, vec!["title lookup failed: offline".to_string()]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lookup_with_no_results_notifies_and_falls_back() {
        let dir = unique_dir("stillframe_session_lookup_empty");
        let paths = paths_in(&dir);
        let names = ["heat_1995.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(2)),
            Step::Select(Answer::Value(0)),
        ]);
        let lookup = FakeLookup {
            matches: Some(Vec::new()),
        };
        let mut viewer = RecordingViewer::default();

        EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        assert_eq!(prompter.notices, vec!["No matches for 'heat'".to_string()]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lookup_match_fills_entry_after_opening_still() {
        let dir = unique_dir("stillframe_session_lookup_pick");
        let paths = paths_in(&dir);
        let names = ["a.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(2)),
            Step::Select(Answer::Value(2)),
            Step::Select(Answer::Value(1)),
        ]);
        let lookup = FakeLookup {
            matches: Some(vec![
                TitleMatch {
                    title: "Alien".to_string(),
                    year: "1979".to_string(),
                    reference: "tt0078748".to_string(),
                },
                TitleMatch {
                    title: "Aliens".to_string(),
                    year: "1986".to_string(),
                    reference: "tt0090605".to_string(),
                },
            ]),
        };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        assert_eq!(viewer.opened, vec![paths.stills_dir.join("a.jpg")]);
        assert_eq!(report.movies[0].display_name(), "Aliens (1986)");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_year_is_asked_again_and_guess_prefills() {
        let dir = unique_dir("stillframe_session_year");
        let paths = paths_in(&dir);
        let names = ["the_thing_1982.jpg"];
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Select(Answer::Value(1)),
            value("The Thing"),
            value("82"),
            value("1982"),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&blank_db(&names), &scanned(&names))
            .unwrap();

        assert_eq!(prompter.initial_inputs, vec!["the thing", "1982", "82"]);
        assert_eq!(prompter.notices.len(), 1);
        assert_eq!(report.movies[0].display_name(), "The Thing (1982)");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reconciliation_drops_and_adds_before_editing() {
        let dir = unique_dir("stillframe_session_reconcile");
        let paths = paths_in(&dir);
        let db = MovieDatabase {
            last_scan: 0,
            movies: vec![
                MovieEntry::new("a.jpg", "Alien", "1979").unwrap(),
                MovieEntry::new("c.jpg", "Cube", "1997").unwrap(),
            ],
        };
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Confirm(Answer::Value(false)),
            Step::Select(Answer::Value(0)),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&db, &scanned(&["a.jpg", "b.jpg"]))
            .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.dropped, 1);
        let files: Vec<&str> = report.movies.iter().map(|m| m.file_path.as_str()).collect();
        assert_eq!(files, vec!["a.jpg", "b.jpg"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_search_mode_retries_until_something_matches() {
        let dir = unique_dir("stillframe_session_search");
        let paths = paths_in(&dir);
        let db = MovieDatabase {
            last_scan: 0,
            movies: vec![
                MovieEntry::new("a.jpg", "Alien", "1979").unwrap(),
                MovieEntry::new("h.jpg", "Heat", "1995").unwrap(),
            ],
        };
        let mut prompter = ScriptedPrompter::new(vec![
            Step::Confirm(Answer::Value(true)),
            Step::Select(Answer::Value(1)),
            value("zzz"),
            value("HEAT"),
            Step::Select(Answer::Value(1)),
            value("Heat"),
            value("1996"),
        ]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&db, &scanned(&["a.jpg", "h.jpg"]))
            .unwrap();

        assert_eq!(report.finished, 1);
        assert_eq!(prompter.notices, vec!["Nothing matches 'zzz', try again".to_string()]);
        assert_eq!(report.movies[0].display_name(), "Alien (1979)");
        assert_eq!(report.movies[1].display_name(), "Heat (1996)");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_interrupt_at_first_prompt_still_persists_reconciliation() {
        let dir = unique_dir("stillframe_session_early");
        let paths = paths_in(&dir);
        let db = MovieDatabase {
            last_scan: 0,
            movies: vec![MovieEntry::new("a.jpg", "Alien", "1979").unwrap()],
        };
        let mut prompter = ScriptedPrompter::new(vec![Step::Confirm(Answer::Interrupted)]);
        let lookup = FakeLookup { matches: None };
        let mut viewer = RecordingViewer::default();

        let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths.clone())
            .run(&db, &scanned(&["a.jpg", "b.jpg"]))
            .unwrap();

        assert_eq!(report.aborted, Some(AbortReason::Interrupted));
        let saved = storage::load_database(&paths.database).unwrap();
        assert_eq!(saved.movies.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_restore_backup_merges_into_database() {
        let dir = unique_dir("stillframe_session_restore");
        let paths = paths_in(&dir);
        storage::save_database(&paths.database, &blank_db(&["a.jpg", "b.jpg"])).unwrap();
        storage::save_backup(
            &paths.backup,
            &[
                MovieEntry::new("a.jpg", "Alien", "1979").unwrap(),
                MovieEntry::new("z.jpg", "Zodiac", "2007").unwrap(),
            ],
        )
        .unwrap();

        let changed = restore_backup(&paths.backup, &paths.database).unwrap();
        assert_eq!(changed, 1);

        let saved = storage::load_database(&paths.database).unwrap();
        assert_eq!(saved.movies.len(), 2);
        assert_eq!(saved.movies[0].display_name(), "Alien (1979)");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_search_entries_is_case_insensitive() {
        let movies = vec![
            MovieEntry::new("alien_01.jpg", "", "").unwrap(),
            MovieEntry::new("h.jpg", "Heat", "1995").unwrap(),
        ];
        assert_eq!(search_entries(&movies, "ALIEN").len(), 1);
        assert_eq!(search_entries(&movies, "heat")[0].file_path, "h.jpg");
        assert!(search_entries(&movies, "cube").is_empty());
    }
}

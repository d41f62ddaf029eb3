use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    constants::{CARD_SETTINGS, FILE_NAMES},
    storage,
};

/// Runtime settings from `settings.json` in the config dir. Every field is
/// optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub stills_dir: Option<PathBuf>,
    pub database_file: Option<PathBuf>,
    pub backup_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub omdb_api_key: Option<String>,
    pub card_title: String,
    pub use_free_space: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stills_dir: None,
            database_file: None,
            backup_file: None,
            output_dir: None,
            omdb_api_key: None,
            card_title: CARD_SETTINGS.default_title.to_string(),
            use_free_space: true,
        }
    }
}

/// Command line values that win over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub stills_dir: Option<PathBuf>,
    pub database_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved locations and options for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub stills_dir: PathBuf,
    pub database_file: PathBuf,
    pub backup_file: PathBuf,
    pub output_dir: PathBuf,
    pub omdb_api_key: Option<String>,
    pub card_title: String,
    pub use_free_space: bool,
}

pub fn settings_path() -> PathBuf {
    storage::get_config_dir().join(FILE_NAMES.settings)
}

pub fn load_settings(path: &std::path::Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match storage::read_json::<Settings>(path) {
        Ok(settings) => {
            info!(path = %path.display(), "loaded settings");
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

impl Config {
    pub fn resolve(settings: Settings, overrides: Overrides) -> Self {
        let data_dir = storage::get_data_dir();
        let env_key = env::var("OMDB_API_KEY").ok();
        Self::resolve_in(settings, overrides, data_dir, storage::get_state_dir(), env_key)
    }

    fn resolve_in(
        settings: Settings,
        overrides: Overrides,
        data_dir: PathBuf,
        state_dir: PathBuf,
        env_key: Option<String>,
    ) -> Self {
        let non_empty = |key: Option<String>| key.filter(|k| !k.trim().is_empty());

        Self {
            stills_dir: overrides
                .stills_dir
                .or(settings.stills_dir)
                .unwrap_or_else(|| data_dir.join("stills")),
            database_file: overrides
                .database_file
                .or(settings.database_file)
                .unwrap_or_else(|| data_dir.join(FILE_NAMES.database)),
            backup_file: settings
                .backup_file
                .unwrap_or_else(|| state_dir.join(FILE_NAMES.backup)),
            output_dir: overrides
                .output_dir
                .or(settings.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            omdb_api_key: non_empty(settings.omdb_api_key).or_else(|| non_empty(env_key)),
            card_title: settings.card_title,
            use_free_space: settings.use_free_space,
        }
    }
}

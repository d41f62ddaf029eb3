use std::path::PathBuf;

use thiserror::Error;

use crate::constants::EXIT_CODES;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("could not read database {}: {reason}", path.display())]
    DatabaseRead { path: PathBuf, reason: String },

    #[error("stills directory {} does not exist", .0.display())]
    StillsDirMissing(PathBuf),

    #[error("could not write database {}: {reason}", path.display())]
    DatabaseWrite { path: PathBuf, reason: String },

    #[error("{context}: {reason}")]
    Io { context: String, reason: String },

    #[error("title lookup failed: {0}")]
    Lookup(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn io(context: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Io {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::DatabaseRead { .. } => EXIT_CODES.database_read,
            AppError::StillsDirMissing(_) => EXIT_CODES.stills_dir_missing,
            AppError::DatabaseWrite { .. } => EXIT_CODES.database_write,
            AppError::Validation(_) | AppError::Io { .. } | AppError::Lookup(_) => {
                EXIT_CODES.unknown
            }
        }
    }
}

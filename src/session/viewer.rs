use std::path::Path;

use tracing::info;

use crate::error::AppError;

pub trait StillViewer {
    fn open(&mut self, path: &Path) -> Result<(), AppError>;
}

/// Hands the still to the platform's default image viewer.
pub struct SystemViewer;

impl StillViewer for SystemViewer {
    fn open(&mut self, path: &Path) -> Result<(), AppError> {
        info!(path = %path.display(), "opening still");
        open::that(path).map_err(|e| AppError::io(format!("opening {}", path.display()), e))
    }
}

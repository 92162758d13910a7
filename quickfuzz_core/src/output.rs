//! Results file written after a run. It contains the structured result document, one record
//! per payload.

use crate::error::{QuickFuzzError, QuickFuzzResult};
use std::path::{Path, PathBuf};

/// Manages the results file
#[derive(Clone, Debug)]
pub struct Output {
    path: PathBuf,
}

impl Output {
    /// Prepares the results file. An existing file is only replaced if `overwrite` is set.
    /// # Errors
    /// `QuickFuzzError::OutputExists` if the file exists and `overwrite` is not set.
    pub fn init(path: PathBuf, overwrite: bool) -> QuickFuzzResult<Self> {
        if path.exists() && !overwrite {
            return Err(QuickFuzzError::OutputExists {
                path: path.display().to_string(),
            });
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            tracing::info!("Created output directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Location of the results file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the results document
    /// # Errors
    pub fn write(&self, document: &str) -> QuickFuzzResult<()> {
        std::fs::write(&self.path, document)?;
        tracing::info!("Results written to {}", self.path.display());
        Ok(())
    }
}

//! Per-run scoped resources

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;
use crate::menu::install_restore_hook;

/// Owns the run's private temp directory and the terminal restore hook
///
/// Dropping the session removes the temp directory and everything
/// downloaded into it.
pub struct InstallSession {
    temp: TempDir,
    next_work_dir: usize,
}

impl InstallSession {
    pub fn start() -> Result<Self> {
        install_restore_hook();
        let temp = tempfile::Builder::new().prefix("skill-installer-").tempdir()?;
        tracing::debug!("Session directory {}", temp.path().display());
        Ok(InstallSession { temp, next_work_dir: 0 })
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp.path()
    }

    /// A fresh, empty directory for one unit of work
    pub fn work_dir(&mut self, label: &str) -> Result<PathBuf> {
        self.next_work_dir += 1;
        let dir = self.temp.path().join(format!("{:02}-{}", self.next_work_dir, label));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

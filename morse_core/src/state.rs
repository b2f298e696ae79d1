//! Learner progress persistence.
//!
//! A [`ProgressStore`] owns one JSON file. Reads hold a shared `fs2` lock;
//! writes serialize first, then replace the file through a locked temp file
//! in the same directory. A missing file means a first run, and an
//! unreadable or corrupt one is logged and treated the same way.

use crate::progress::LearnerProgress;
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the progress store inside the data directory
pub const PROGRESS_FILE: &str = "progress.json";

/// Where learner progress lives on disk
#[derive(Clone, Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard file name inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PROGRESS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored progress, or the default on a first run or unusable file
    pub fn load(&self) -> Result<LearnerProgress> {
        let contents = match self.read_locked() {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::info!("No progress at {:?}, starting fresh", self.path);
                return Ok(LearnerProgress::default());
            }
            Err(e) => {
                tracing::warn!("Unable to read progress {:?}: {}. Using defaults.", self.path, e);
                return Ok(LearnerProgress::default());
            }
        };

        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Corrupt progress {:?}: {}. Using defaults.", self.path, e);
            LearnerProgress::default()
        }))
    }

    /// Replace the stored progress atomically
    pub fn save(&self, progress: &LearnerProgress) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::State(format!("Progress path {:?} has no parent", self.path)))?;
        std::fs::create_dir_all(dir)?;

        // Nothing touches the disk if serialization fails
        let bytes = serde_json::to_vec(progress)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.as_file().lock_exclusive()?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved progress ({} bytes) to {:?}", bytes.len(), self.path);
        Ok(())
    }

    /// Load, apply `f`, and save; nothing is written if `f` fails
    pub fn update<F>(&self, f: F) -> Result<LearnerProgress>
    where
        F: FnOnce(&mut LearnerProgress) -> Result<()>,
    {
        let mut progress = self.load()?;
        f(&mut progress)?;
        self.save(&progress)?;
        Ok(progress)
    }

    /// File contents under a shared lock; `None` if there is no file yet
    fn read_locked(&self) -> io::Result<Option<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        file.lock_shared()?;
        let mut contents = String::new();
        let read = (&file).read_to_string(&mut contents);
        let unlocked = file.unlock();
        read?;
        unlocked?;
        Ok(Some(contents))
    }
}

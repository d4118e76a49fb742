//! Saving downloaded translations to disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory {path}: {reason}")]
    DownloadDir { path: PathBuf, reason: String },
    #[error("failed to save download: {0}")]
    Io(#[from] io::Error),
}

impl PersistError {
    fn download_dir(path: &Path, reason: impl ToString) -> Self {
        PersistError::DownloadDir {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Creates the download directory when missing and checks files can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::download_dir(dir, "not a directory"))
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| PersistError::download_dir(dir, err))?
        }
        Err(err) => return Err(PersistError::download_dir(dir, err)),
    }
    tempfile::tempfile_in(dir).map_err(|err| PersistError::download_dir(dir, err))?;
    Ok(())
}

/// Stages each download in a temp file next to its destination, so an
/// interrupted save never leaves a truncated translation behind.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the saved path. An earlier copy with the same name is replaced.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;

        let destination = self.dir.join(filename);
        staged
            .persist(&destination)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(destination)
    }
}

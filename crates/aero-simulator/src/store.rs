//! Directory-backed storage for persisted series text
//!
//! Stands in for the station's SD card: every series lives in its own text
//! file, rewritten in full after each roll-up.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::debug;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Replace the contents of `file_name`
    pub fn write(&self, file_name: &str, text: &str) -> io::Result<()> {
        // Staged; the rename replaces the old file in one step
        let path = self.dir.join(file_name);
        let staging = path.with_extension("tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, &path)?;

        debug!("Wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    /// Contents of `file_name`, `None` if it was never written
    pub fn read(&self, file_name: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.dir.join(file_name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

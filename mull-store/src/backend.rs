//! Matter file backends
//!
//! The repository reads and writes matter files only through [`Backend`].
//! Nothing here caches: every call goes to the underlying storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Flat namespace of matter files
pub trait Backend: Send + Sync {
    /// File names currently stored, sorted
    fn list(&self) -> io::Result<Vec<String>>;

    /// Full contents of one file
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Create or overwrite one file
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Delete one file
    fn remove(&self, name: &str) -> io::Result<()>;
}

/// One directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    /// Open `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Backend for FsBackend {
    fn list(&self) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.dir.join(name))
    }

    fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        log::debug!("writing {}", name);
        fs::write(self.dir.join(name), data)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        log::debug!("removing {}", name);
        fs::remove_file(self.dir.join(name))
    }
}

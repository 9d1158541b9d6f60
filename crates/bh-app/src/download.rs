//! Presenting a downloaded payload to the user as a file.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::info;

/// Given bytes and a file name, make them available to the user.
pub trait DownloadSink {
    /// Returns where the payload ended up.
    fn save(&self, bytes: &[u8], file_name: &str) -> io::Result<PathBuf>;
}

/// Writes downloads into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl DownloadSink for DirectorySink {
    fn save(&self, bytes: &[u8], file_name: &str) -> io::Result<PathBuf> {
        // Must stay inside `dir`.
        if !is_bare_file_name(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to save under '{file_name}'"),
            ));
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// File download sinks

use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Mutex;

/// Receives a finished export as a named file.
pub trait DownloadSink: Send + Sync {
    fn download(&self, file_name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes downloads into a directory, like a browser's download folder.
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryDownloads { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownloads {
    fn download(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        if file_name.contains('/') || file_name.contains('\\') || file_name.starts_with('.') {
            return Err(Error::Platform(format!("refusing download name '{}'", file_name)));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::Platform(e.to_string()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|e| Error::Platform(format!("{}: {}", path.display(), e)))?;
        log::info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// Keeps downloads in memory for inspection
#[derive(Default)]
pub struct MemoryDownloads {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.files().into_iter().map(|(n, _)| n).collect()
    }
}

impl DownloadSink for MemoryDownloads {
    fn download(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| Error::Platform("download list poisoned".into()))?;
        files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Native share sheet abstraction

use super::download::{DirectoryDownloads, DownloadSink};
use crate::{Error, Result};
use std::path::PathBuf;
use futures::future::BoxFuture;
use std::sync::Mutex;

/// A single file handed to the platform share surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

pub trait ShareSheet: Send + Sync {
    /// Whether the platform offers native file sharing at all
    fn can_share(&self) -> bool;

    fn share(&self, file: SharedFile) -> BoxFuture<'_, Result<()>>;
}

/// Platform without a share surface
pub struct NoShareSheet;

impl NoShareSheet {
    pub fn new() -> Self {
        NoShareSheet
    }
}

impl Default for NoShareSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareSheet for NoShareSheet {
    fn can_share(&self) -> bool {
        false
    }

    fn share(&self, _file: SharedFile) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Err(Error::Platform("sharing not supported".into())) })
    }
}

/// Share sheet that accepts everything and keeps the files in memory
#[derive(Default)]
pub struct RecordingShareSheet {
    shared: Mutex<Vec<SharedFile>>,
}

impl RecordingShareSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Vec<SharedFile> {
        self.shared.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ShareSheet for RecordingShareSheet {
    fn can_share(&self) -> bool {
        true
    }

    fn share(&self, file: SharedFile) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut shared = self
                .shared
                .lock()
                .map_err(|_| Error::Platform("share list poisoned".into()))?;
            shared.push(file);
            Ok(())
        })
    }
}

/// Hands shared files to a directory, for hosts whose "share" is a drop folder
pub struct DirectoryShareSheet {
    target: DirectoryDownloads,
}

impl DirectoryShareSheet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            target: DirectoryDownloads::new(dir),
        }
    }
}

impl ShareSheet for DirectoryShareSheet {
    fn can_share(&self) -> bool {
        true
    }

    fn share(&self, file: SharedFile) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.target.download(&file.name, &file.bytes) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_share_sheet_reports_no_capability() {
        let s = NoShareSheet::new();
        assert!(!s.can_share());
        let file = SharedFile {
            name: "image.png".into(),
            mime_type: "image/png",
            bytes: vec![],
        };
        assert!(s.share(file).await.is_err());
    }

    #[tokio::test]
    async fn recording_share_sheet_keeps_files() {
        let s = RecordingShareSheet::new();
        s.share(SharedFile {
            name: "story.gif".into(),
            mime_type: "image/gif",
            bytes: b"GIF89a".to_vec(),
        })
        .await
        .unwrap();
        assert_eq!(s.shared()[0].name, "story.gif");
    }

    #[tokio::test]
    async fn directory_share_sheet_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = DirectoryShareSheet::new(dir.path());
        s.share(SharedFile {
            name: "image.png".into(),
            mime_type: "image/png",
            bytes: vec![1, 2, 3],
        })
        .await
        .unwrap();
        assert_eq!(std::fs::read(dir.path().join("image.png")).unwrap(), vec![1, 2, 3]);
    }
}

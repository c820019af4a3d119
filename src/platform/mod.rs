//! Platform surface: downloads, native sharing, link opening and notices
//!
//! The export and share actions only talk to the outside world through the
//! traits in this module, so a host (browser shell, CLI, test) decides what a
//! "download" or a "share" actually does.

pub mod download;
pub mod links;
pub mod notify;
pub mod share;

pub use download::{DirectoryDownloads, DownloadSink, MemoryDownloads};
pub use links::{LinkOpener, LoggingLinkOpener, RecordingLinkOpener};
pub use notify::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use share::{DirectoryShareSheet, NoShareSheet, RecordingShareSheet, ShareSheet, SharedFile};

use std::sync::Arc;

/// A small composite trait that hosts implement to hand the actions their
/// platform primitives.
pub trait PlatformApi: Send + Sync {
    fn downloads(&self) -> &dyn DownloadSink;
    fn share_sheet(&self) -> &dyn ShareSheet;
    fn links(&self) -> &dyn LinkOpener;
    fn notifier(&self) -> &dyn Notifier;
}

/// Platform assembled from individual sinks.
///
/// `Platform::default()` keeps downloads in memory, has no share sheet, and
/// logs links and notices.
#[derive(Clone)]
pub struct Platform {
    downloads: Arc<dyn DownloadSink>,
    share_sheet: Arc<dyn ShareSheet>,
    links: Arc<dyn LinkOpener>,
    notifier: Arc<dyn Notifier>,
}

impl Platform {
    pub fn new() -> Self {
        Platform {
            downloads: Arc::new(MemoryDownloads::new()),
            share_sheet: Arc::new(NoShareSheet::new()),
            links: Arc::new(LoggingLinkOpener),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_downloads(mut self, downloads: Arc<dyn DownloadSink>) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn with_share_sheet(mut self, share_sheet: Arc<dyn ShareSheet>) -> Self {
        self.share_sheet = share_sheet;
        self
    }

    pub fn with_links(mut self, links: Arc<dyn LinkOpener>) -> Self {
        self.links = links;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for Platform {
    fn downloads(&self) -> &dyn DownloadSink {
        self.downloads.as_ref()
    }

    fn share_sheet(&self) -> &dyn ShareSheet {
        self.share_sheet.as_ref()
    }

    fn links(&self) -> &dyn LinkOpener {
        self.links.as_ref()
    }

    fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

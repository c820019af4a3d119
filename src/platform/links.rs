/// Opening external links in a new browsing context

use crate::{Error, Result};
use std::sync::Mutex;

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Logs the URL for the user to open; used where no browser is attached.
pub struct LoggingLinkOpener;

impl LinkOpener for LoggingLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        url::Url::parse(url).map_err(|e| Error::Platform(format!("bad url '{}': {}", url, e)))?;
        log::info!("open in a new tab: {}", url);
        Ok(())
    }
}

/// Records opened URLs in memory
#[derive(Default)]
pub struct RecordingLinkOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingLinkOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl LinkOpener for RecordingLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        let mut opened = self
            .opened
            .lock()
            .map_err(|_| Error::Platform("link list poisoned".into()))?;
        opened.push(url.to_string());
        Ok(())
    }
}

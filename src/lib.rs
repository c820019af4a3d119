//! Job post image export
//!
//! Captures a composed job post (background, title, tag pills, logo) as a
//! PNG still or an animated GIF and delivers it as a download or through the
//! platform share sheet. Every export and share is gated by a licence check
//! and a weekly quota kept in client-local storage.
//!
//! # Pipeline
//!
//! - [`limiter::RateLimiter`]: licence check plus rolling weekly quota
//! - [`capture::Capturer`]: editor surface to PNG at 2x pixel ratio
//! - [`sequencer::FrameSequencer`]: 20 captures encoded as a looping GIF
//! - [`actions::ImageActions`]: export to a download, or share by template
//!
//! # Example
//!
//! ```no_run
//! use jobpost_export::{ExportConfig, ImageFormat, Motion};
//! use jobpost_export::actions::ImageActions;
//! use jobpost_export::capture::SurfaceCapturer;
//! use jobpost_export::clock::SystemClock;
//! use jobpost_export::license::HttpLicenseValidator;
//! use jobpost_export::limiter::RateLimiter;
//! use jobpost_export::platform::Platform;
//! use jobpost_export::rendering::EditorSurface;
//! use jobpost_export::store::MemoryStore;
//! use jobpost_export::template;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::default();
//! let template = template::template("instagram-story")?;
//!
//! let validator = HttpLicenseValidator::new(&config.license_api_url, config.license_timeout_ms)?;
//! let limiter = RateLimiter::new(MemoryStore::new(), validator, SystemClock, config.weekly_quota);
//!
//! let capturer = SurfaceCapturer::new(config.capture_options(), SystemClock, config.motion_period_ms);
//! capturer.mount(EditorSurface::for_template(template))?;
//!
//! let actions = ImageActions::new(limiter, capturer, config.sequencer(), Platform::default(), template);
//! let outcome = actions.handle_export(Some(ImageFormat::Png), Motion::Still).await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod actions;
pub mod capture;
pub mod clock;
pub mod license;
pub mod limiter;
pub mod platform;
pub mod rendering;
pub mod sequencer;
pub mod store;
pub mod template;

pub use actions::{ExportOutcome, ImageActions, ShareOutcome};
pub use limiter::{DenyReason, ExportLog, LimitDecision, RateLimiter};
pub use template::{ShareTarget, Template};

/// Configuration for the export pipeline
///
/// Defaults follow the editor: 2x captures at maximum quality, 20-frame GIFs
/// with 100ms frames, two encoder workers and three exports per week.
///
/// # Examples
///
/// ```
/// let cfg = jobpost_export::ExportConfig::default();
/// assert_eq!(cfg.gif_frames, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Approved exports per rolling week
    pub weekly_quota: u32,
    /// Licence validation endpoint (`POST license_key=...`)
    pub license_api_url: String,
    /// Optional timeout for the licence request; unbounded when `None`
    pub license_timeout_ms: Option<u64>,
    /// Where to buy a licence
    pub checkout_url: String,
    /// Capture quality in `0..=1`
    pub capture_quality: f32,
    /// Device pixel ratio for captures
    pub pixel_ratio: f32,
    /// Frames per GIF
    pub gif_frames: usize,
    /// Delay metadata per GIF frame in milliseconds
    pub gif_frame_delay_ms: u16,
    /// GIF quantizer quality, 1 (best) to 30 (fastest)
    pub gif_quality: i32,
    /// Concurrent GIF frame workers
    pub gif_workers: usize,
    /// Length of one gradient animation loop in milliseconds
    pub motion_period_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            weekly_quota: 3,
            license_api_url: "https://api.lemonsqueezy.com/v1/licenses/validate".to_string(),
            license_timeout_ms: None,
            checkout_url: "https://lovable.lemonsqueezy.com/checkout".to_string(),
            capture_quality: 1.0,
            pixel_ratio: 2.0,
            gif_frames: 20,
            gif_frame_delay_ms: 100,
            gif_quality: 10,
            gif_workers: 2,
            motion_period_ms: 3000,
        }
    }
}

impl ExportConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        let cfg: ExportConfig = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.license_api_url)
            .map_err(|e| Error::ConfigError(format!("license_api_url: {}", e)))?;
        url::Url::parse(&self.checkout_url)
            .map_err(|e| Error::ConfigError(format!("checkout_url: {}", e)))?;
        if !(0.0..=1.0).contains(&self.capture_quality) {
            return Err(Error::ConfigError("capture_quality must be within 0..=1".into()));
        }
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(Error::ConfigError("pixel_ratio must be positive".into()));
        }
        if self.motion_period_ms == 0 {
            return Err(Error::ConfigError("motion_period_ms must be positive".into()));
        }
        self.sequencer().validate()
    }

    pub fn capture_options(&self) -> capture::CaptureOptions {
        capture::CaptureOptions {
            quality: self.capture_quality,
            pixel_ratio: self.pixel_ratio,
        }
    }

    pub fn sequencer(&self) -> sequencer::FrameSequencer {
        sequencer::FrameSequencer {
            frames: self.gif_frames,
            delay_ms: self.gif_frame_delay_ms,
            quality: self.gif_quality,
            workers: self.gif_workers,
        }
    }
}

/// Output encoding of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Gif,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "gif" => Ok(ImageFormat::Gif),
            other => Err(Error::Other(format!("unknown image format '{}'", other))),
        }
    }
}

/// Whether the surface's background is animated, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Still,
    Animated,
}

impl Motion {
    /// GIF for animated surfaces, PNG otherwise.
    pub fn preferred_format(self) -> ImageFormat {
        match self {
            Motion::Still => ImageFormat::Png,
            Motion::Animated => ImageFormat::Gif,
        }
    }
}

impl From<bool> for Motion {
    fn from(animated: bool) -> Self {
        if animated {
            Motion::Animated
        } else {
            Motion::Still
        }
    }
}

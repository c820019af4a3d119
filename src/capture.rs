//! Canvas snapshot capture.
//!
//! A [`Capturer`] turns whatever is currently mounted on the editor surface
//! into a PNG [`Snapshot`]. Captures are taken at a fixed device pixel ratio
//! (2x by default) so exports stay sharp.

use crate::clock::Clock;
use crate::rendering::{render_surface, EditorSurface, Snapshot};
use crate::{Error, Result};
use std::future::Future;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// `0..=1`, maximum by default
    pub quality: f32,
    /// Device pixel ratio multiplier
    pub pixel_ratio: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: 1.0,
            pixel_ratio: 2.0,
        }
    }
}

/// Produces a still image of the editor surface.
///
/// Fails when nothing is mounted or when rendering fails; callers treat
/// either as a generic capture failure.
pub trait Capturer: Send + Sync {
    fn capture(&self) -> impl Future<Output = Result<Snapshot>> + Send;
}

impl<T: Capturer + ?Sized> Capturer for Arc<T> {
    fn capture(&self) -> impl Future<Output = Result<Snapshot>> + Send {
        (**self).capture()
    }
}

/// Renders a mounted [`EditorSurface`] with the built-in rasterizer.
///
/// Animated gradients advance with the clock, so two captures taken at
/// different times of a moving surface differ.
pub struct SurfaceCapturer<C> {
    surface: RwLock<Option<Arc<EditorSurface>>>,
    options: CaptureOptions,
    clock: C,
    motion_period_ms: u64,
}

impl<C: Clock> SurfaceCapturer<C> {
    pub fn new(options: CaptureOptions, clock: C, motion_period_ms: u64) -> Self {
        Self {
            surface: RwLock::new(None),
            options,
            clock,
            motion_period_ms: motion_period_ms.max(1),
        }
    }

    pub fn mount(&self, surface: EditorSurface) -> Result<()> {
        let mut slot = self
            .surface
            .write()
            .map_err(|_| Error::Capture("surface lock poisoned".into()))?;
        *slot = Some(Arc::new(surface));
        Ok(())
    }

    pub fn unmount(&self) -> Result<()> {
        let mut slot = self
            .surface
            .write()
            .map_err(|_| Error::Capture("surface lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }

    /// The motion flag of the mounted surface; `false` when unmounted.
    pub fn has_motion(&self) -> bool {
        self.surface
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.has_motion()))
            .unwrap_or(false)
    }

    fn mounted(&self) -> Result<Arc<EditorSurface>> {
        self.surface
            .read()
            .map_err(|_| Error::Capture("surface lock poisoned".into()))?
            .clone()
            .ok_or_else(|| Error::Capture("editor surface is not mounted".into()))
    }

    fn phase(&self) -> f32 {
        (self.clock.now_ms() % self.motion_period_ms) as f32 / self.motion_period_ms as f32
    }
}

impl<C: Clock> Capturer for SurfaceCapturer<C> {
    async fn capture(&self) -> Result<Snapshot> {
        let surface = self.mounted()?;
        let phase = self.phase();
        let CaptureOptions {
            quality,
            pixel_ratio,
        } = self.options;

        let snapshot = tokio::task::spawn_blocking(move || {
            render_surface(&surface, pixel_ratio, quality, phase)
        })
        .await
        .map_err(|e| Error::Capture(format!("render task failed: {}", e)))??;

        log::debug!(
            "captured {}x{} snapshot ({} bytes)",
            snapshot.width,
            snapshot.height,
            snapshot.png_data.len()
        );
        Ok(snapshot)
    }
}

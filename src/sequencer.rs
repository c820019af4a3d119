//! Animated capture: sample the surface repeatedly and encode a looping GIF.
//!
//! The surface is resampled back to back; frame timing comes from the GIF
//! delay metadata, not from throttling the captures. Nothing guarantees the
//! samples form a smooth loop of the underlying animation.

use crate::capture::Capturer;
use crate::rendering::Snapshot;
use crate::template::Template;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSequencer {
    /// Snapshots taken per animation
    pub frames: usize,
    /// Delay stored on every frame, in milliseconds
    pub delay_ms: u16,
    /// Palette quantizer sampling factor, 1 (best) to 30 (fastest)
    pub quality: i32,
    /// Maximum frames quantized concurrently
    pub workers: usize,
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self {
            frames: 20,
            delay_ms: 100,
            quality: 10,
            workers: 2,
        }
    }
}

impl FrameSequencer {
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            return Err(Error::ConfigError("frames must be at least 1".into()));
        }
        if !(1..=30).contains(&self.quality) {
            return Err(Error::ConfigError(format!(
                "gif quality must be within 1..=30, got {}",
                self.quality
            )));
        }
        if self.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".into()));
        }
        Ok(())
    }

    /// Capture `frames` snapshots and encode them at the template's size.
    pub async fn record<C: Capturer>(&self, capturer: &C, template: &Template) -> Result<Vec<u8>> {
        self.validate()?;
        let mut frames = Vec::with_capacity(self.frames);
        for i in 0..self.frames {
            let snap = capturer.capture().await?;
            log::trace!("captured frame {}/{}", i + 1, self.frames);
            frames.push(snap);
        }
        self.encode(frames, template.width, template.height).await
    }

    /// Encode already captured frames into an infinitely looping GIF.
    ///
    /// Frames are decoded, resized to `width x height` and quantized on at
    /// most `workers` blocking tasks, then written in their original order.
    pub async fn encode(&self, frames: Vec<Snapshot>, width: u32, height: u32) -> Result<Vec<u8>> {
        self.validate()?;
        let w = u16::try_from(width).map_err(|_| Error::Encode(format!("width {} too large for GIF", width)))?;
        let h = u16::try_from(height).map_err(|_| Error::Encode(format!("height {} too large for GIF", height)))?;
        if w == 0 || h == 0 {
            return Err(Error::Encode("GIF dimensions must be non-zero".into()));
        }

        let pool = Arc::new(Semaphore::new(self.workers));
        let speed = self.quality;
        let delay = (self.delay_ms / 10).max(1);
        let count = frames.len();

        let tasks = frames.into_iter().enumerate().map(|(index, snap)| {
            let pool = pool.clone();
            async move {
                let _permit = pool
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Encode(format!("worker pool closed: {}", e)))?;
                tokio::task::spawn_blocking(move || quantize_frame(&snap, w, h, speed, delay))
                    .await
                    .map_err(|e| Error::Encode(format!("frame {} worker failed: {}", index, e)))?
            }
        });
        let quantized = futures::future::try_join_all(tasks).await?;

        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, w, h, &[])
                .map_err(|e| Error::Encode(e.to_string()))?;
            encoder
                .set_repeat(gif::Repeat::Infinite)
                .map_err(|e| Error::Encode(e.to_string()))?;
            for frame in &quantized {
                encoder
                    .write_frame(frame)
                    .map_err(|e| Error::Encode(e.to_string()))?;
            }
        }
        log::info!("encoded {} GIF frames ({}x{}, {} bytes)", count, w, h, out.len());
        Ok(out)
    }
}

fn quantize_frame(snap: &Snapshot, w: u16, h: u16, speed: i32, delay: u16) -> Result<gif::Frame<'static>> {
    let decoded = image::load_from_memory_with_format(&snap.png_data, image::ImageFormat::Png)?.to_rgba8();
    let rgba = if decoded.width() == w as u32 && decoded.height() == h as u32 {
        decoded
    } else {
        image::imageops::resize(&decoded, w as u32, h as u32, image::imageops::FilterType::Triangle)
    };
    let mut raw = rgba.into_raw();
    let mut frame = gif::Frame::from_rgba_speed(w, h, &mut raw, speed);
    frame.delay = delay;
    frame.dispose = gif::DisposalMethod::Background;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::raster::encode_png;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32, c: [u8; 4]) -> Snapshot {
        encode_png(&RgbaImage::from_pixel(w, h, Rgba(c)), 0.0).unwrap()
    }

    #[test]
    fn defaults_match_the_editor() {
        let s = FrameSequencer::default();
        assert_eq!((s.frames, s.delay_ms, s.quality, s.workers), (20, 100, 10, 2));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        let s = FrameSequencer { quality: 0, ..Default::default() };
        assert!(s.validate().is_err());
        let s = FrameSequencer { workers: 0, ..Default::default() };
        assert!(s.validate().is_err());
    }

    #[tokio::test]
    async fn encode_downscales_and_keeps_order() {
        let frames = vec![
            solid(20, 10, [255, 0, 0, 255]),
            solid(20, 10, [0, 255, 0, 255]),
            solid(20, 10, [0, 0, 255, 255]),
        ];
        let gif_bytes = FrameSequencer::default().encode(frames, 10, 5).await.unwrap();
        assert_eq!(&gif_bytes[0..6], b"GIF89a");

        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = opts.read_info(&gif_bytes[..]).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (10, 5));
        let mut firsts = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            assert_eq!(frame.delay, 10);
            firsts.push([frame.buffer[0], frame.buffer[1], frame.buffer[2]]);
        }
        assert_eq!(firsts.len(), 3);
        assert!(firsts[0][0] > 200 && firsts[0][1] < 50);
        assert!(firsts[1][1] > 200 && firsts[1][0] < 50);
        assert!(firsts[2][2] > 200 && firsts[2][0] < 50);
    }
}

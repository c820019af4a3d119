//! User-triggered export and share actions.
//!
//! Both actions follow the same order: the export gate is consulted first
//! and no capture happens on denial. Failures never escape; they end up as a
//! notice and an outcome value. Two overlapping invocations are not
//! serialized against each other.

mod export;
mod share;

pub use export::ExportOutcome;
pub use share::{ShareOutcome, LINKEDIN_SHARE_URL};

use crate::capture::Capturer;
use crate::limiter::ExportGate;
use crate::platform::PlatformApi;
use crate::sequencer::FrameSequencer;
use crate::template::Template;
use crate::{ImageFormat, Result};

pub struct ImageActions<G, C, P> {
    gate: G,
    capturer: C,
    sequencer: FrameSequencer,
    platform: P,
    template: &'static Template,
}

impl<G, C, P> ImageActions<G, C, P>
where
    G: ExportGate,
    C: Capturer,
    P: PlatformApi,
{
    pub fn new(gate: G, capturer: C, sequencer: FrameSequencer, platform: P, template: &'static Template) -> Self {
        Self {
            gate,
            capturer,
            sequencer,
            platform,
            template,
        }
    }

    pub fn template(&self) -> &'static Template {
        self.template
    }

    pub fn capturer(&self) -> &C {
        &self.capturer
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Produce image bytes in `format`: one capture for PNG, a captured and
    /// encoded frame sequence for GIF.
    async fn render(&self, format: ImageFormat) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Png => Ok(self.capturer.capture().await?.png_data),
            ImageFormat::Gif => self.sequencer.record(&self.capturer, self.template).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::{DenyReason, LimitDecision};
    use crate::platform::{
        MemoryDownloads, Notice, Platform, RecordingLinkOpener, RecordingNotifier, RecordingShareSheet, ShareSheet,
        SharedFile,
    };
    use crate::rendering::Snapshot;
    use crate::template::{template, ShareTarget};
    use crate::{Error, ExportOutcome, Motion, ShareOutcome};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    static TINY_STORY: Template = Template {
        key: "tiny-story",
        name: "Tiny Story",
        width: 12,
        height: 20,
        share_target: ShareTarget::InstagramStory,
    };

    static TINY_GENERIC: Template = Template {
        key: "tiny-generic",
        name: "Tiny Generic",
        width: 10,
        height: 10,
        share_target: ShareTarget::Generic,
    };

    struct ScriptedGate {
        decision: LimitDecision,
    }

    impl ScriptedGate {
        fn allow() -> Self {
            Self::with(LimitDecision::Allowed { count: 1 })
        }

        fn with(decision: LimitDecision) -> Self {
            Self { decision }
        }
    }

    impl ExportGate for ScriptedGate {
        async fn check_limit(&self) -> LimitDecision {
            self.decision.clone()
        }
    }

    struct CountingCapturer {
        calls: AtomicUsize,
        fail: bool,
        /// Sleep 0, 5 or 10 ms before each capture, cycling per call
        jitter: bool,
    }

    impl CountingCapturer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                jitter: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn jittery() -> Self {
            Self {
                jitter: true,
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Capturer for CountingCapturer {
        async fn capture(&self) -> Result<Snapshot> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.jitter {
                tokio::time::sleep(Duration::from_millis((n % 3) as u64 * 5)).await;
            }
            if self.fail {
                return Err(Error::Capture("editor surface is not mounted".into()));
            }
            let shade = (n * 10 % 256) as u8;
            let img = image::RgbaImage::from_pixel(6, 10, image::Rgba([shade, 40, 200, 255]));
            crate::rendering::raster::encode_png(&img, 1.0)
        }
    }

    struct FailingShareSheet;

    impl ShareSheet for FailingShareSheet {
        fn can_share(&self) -> bool {
            true
        }

        fn share(&self, _file: SharedFile) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Err(Error::Platform("share sheet dismissed with an error".into())) })
        }
    }

    fn gif_frame_count(bytes: &[u8]) -> usize {
        let mut decoder = gif::DecodeOptions::new().read_info(bytes).unwrap();
        let mut frames = 0;
        while decoder.read_next_frame().unwrap().is_some() {
            frames += 1;
        }
        frames
    }

    struct Fixture {
        downloads: Arc<MemoryDownloads>,
        sheet: Arc<RecordingShareSheet>,
        links: Arc<RecordingLinkOpener>,
        notices: Arc<RecordingNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                downloads: Arc::new(MemoryDownloads::new()),
                sheet: Arc::new(RecordingShareSheet::new()),
                links: Arc::new(RecordingLinkOpener::new()),
                notices: Arc::new(RecordingNotifier::new()),
            }
        }

        fn platform(&self, can_share: bool) -> Platform {
            let platform = Platform::new()
                .with_downloads(self.downloads.clone())
                .with_links(self.links.clone())
                .with_notifier(self.notices.clone());
            if can_share {
                platform.with_share_sheet(self.sheet.clone())
            } else {
                platform
            }
        }
    }

    fn actions(
        gate: ScriptedGate,
        capturer: CountingCapturer,
        platform: Platform,
        template: &'static Template,
    ) -> ImageActions<Arc<ScriptedGate>, Arc<CountingCapturer>, Platform> {
        ImageActions::new(
            Arc::new(gate),
            Arc::new(capturer),
            FrameSequencer::default(),
            platform,
            template,
        )
    }

    #[tokio::test]
    async fn png_export_downloads_named_file() {
        let fx = Fixture::new();
        let story = template("instagram-story").unwrap();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(false), story);

        let outcome = actions.handle_export(Some(ImageFormat::Png), Motion::Still).await;
        assert_eq!(
            outcome,
            ExportOutcome::Downloaded {
                file_name: "job-post-instagram story.png".into(),
                format: ImageFormat::Png,
            }
        );
        assert_eq!(fx.downloads.names(), vec!["job-post-instagram story.png"]);
        assert_eq!(actions.capturer().calls(), 1);
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Success("Image downloaded successfully!".into())]
        );
    }

    #[tokio::test]
    async fn animated_export_captures_twenty_frames() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(false), &TINY_STORY);

        let outcome = actions.handle_export(None, Motion::Animated).await;
        assert!(matches!(outcome, ExportOutcome::Downloaded { format: ImageFormat::Gif, .. }));
        assert_eq!(actions.capturer().calls(), 20);

        let files = fx.downloads.files();
        assert_eq!(files[0].0, "job-post-tiny story.gif");
        assert_eq!(&files[0].1[..6], b"GIF89a");
    }

    #[tokio::test]
    async fn denied_export_never_captures() {
        let fx = Fixture::new();
        let gate = ScriptedGate::with(LimitDecision::Denied(DenyReason::QuotaExhausted { quota: 3 }));
        let actions = actions(gate, CountingCapturer::new(), fx.platform(true), &TINY_STORY);

        let outcome = actions.handle_export(Some(ImageFormat::Png), Motion::Still).await;
        assert_eq!(outcome, ExportOutcome::RateLimited(DenyReason::QuotaExhausted { quota: 3 }));
        assert_eq!(actions.capturer().calls(), 0);
        assert!(fx.downloads.names().is_empty());
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Shake, Notice::Error("You've reached your export limit.".into())]
        );
    }

    #[tokio::test]
    async fn capture_failure_is_reported_not_raised() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::failing(), fx.platform(false), &TINY_STORY);

        let outcome = actions.handle_export(Some(ImageFormat::Png), Motion::Still).await;
        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(fx.downloads.names().is_empty());
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Error("Failed to export image. Please try again.".into())]
        );
    }

    #[tokio::test]
    async fn story_share_uses_story_file_name() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(true), &TINY_STORY);

        let outcome = actions.handle_share(Motion::Still).await;
        assert_eq!(
            outcome,
            ShareOutcome::Shared {
                file_name: "story.png".into(),
                format: ImageFormat::Png,
            }
        );
        let shared = fx.sheet.shared();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].mime_type, "image/png");
        assert!(fx.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn linkedin_share_opens_intent_only() {
        let fx = Fixture::new();
        let linkedin = template("linkedin-post").unwrap();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(true), linkedin);

        let outcome = actions.handle_share(Motion::Still).await;
        assert_eq!(outcome, ShareOutcome::OpenedLink(LINKEDIN_SHARE_URL.into()));
        assert_eq!(fx.links.opened(), vec![LINKEDIN_SHARE_URL.to_string()]);
        assert!(fx.sheet.shared().is_empty());
        assert_eq!(actions.capturer().calls(), 1);
    }

    #[tokio::test]
    async fn unsupported_share_neither_shares_nor_downloads() {
        let fx = Fixture::new();
        let post = template("instagram-post").unwrap();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(false), post);

        assert_eq!(actions.handle_share(Motion::Still).await, ShareOutcome::Unsupported);
        assert!(fx.downloads.names().is_empty());
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Error("Sharing is not supported on this device".into())]
        );
    }

    #[tokio::test]
    async fn denied_share_shows_sharing_message() {
        let fx = Fixture::new();
        let gate = ScriptedGate::with(LimitDecision::Denied(DenyReason::MissingLicense));
        let actions = actions(gate, CountingCapturer::new(), fx.platform(true), &TINY_STORY);

        assert_eq!(
            actions.handle_share(Motion::Animated).await,
            ShareOutcome::RateLimited(DenyReason::MissingLicense)
        );
        assert_eq!(actions.capturer().calls(), 0);
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Shake, Notice::Error("You've reached your sharing limit.".into())]
        );
    }

    #[tokio::test]
    async fn slow_captures_still_yield_every_frame() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::jittery(), fx.platform(false), &TINY_STORY);

        let outcome = actions.handle_export(Some(ImageFormat::Gif), Motion::Still).await;
        assert!(matches!(outcome, ExportOutcome::Downloaded { format: ImageFormat::Gif, .. }));
        assert_eq!(actions.capturer().calls(), 20);

        let files = fx.downloads.files();
        assert_eq!(gif_frame_count(&files[0].1), 20);
    }

    #[tokio::test]
    async fn generic_share_hands_over_image_file() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(true), &TINY_GENERIC);

        let outcome = actions.handle_share(Motion::Still).await;
        assert_eq!(
            outcome,
            ShareOutcome::Shared {
                file_name: "image.png".into(),
                format: ImageFormat::Png,
            }
        );
        let shared = fx.sheet.shared();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].name, "image.png");
        assert_eq!(shared[0].mime_type, "image/png");
        assert_eq!(&shared[0].bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert!(fx.downloads.names().is_empty());
        assert!(fx.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn animated_story_share_hands_over_a_gif() {
        let fx = Fixture::new();
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(true), &TINY_STORY);

        let outcome = actions.handle_share(Motion::Animated).await;
        assert_eq!(
            outcome,
            ShareOutcome::Shared {
                file_name: "story.gif".into(),
                format: ImageFormat::Gif,
            }
        );
        let shared = fx.sheet.shared();
        assert_eq!(shared[0].name, "story.gif");
        assert_eq!(shared[0].mime_type, "image/gif");
        assert_eq!(&shared[0].bytes[..6], b"GIF89a");
        assert_eq!(gif_frame_count(&shared[0].bytes), 20);
        assert_eq!(actions.capturer().calls(), 20);
    }

    #[tokio::test]
    async fn share_sheet_failure_is_reported() {
        let fx = Fixture::new();
        let platform = fx.platform(false).with_share_sheet(Arc::new(FailingShareSheet));
        let actions = actions(ScriptedGate::allow(), CountingCapturer::new(), platform, &TINY_GENERIC);

        let outcome = actions.handle_share(Motion::Still).await;
        assert!(matches!(outcome, ShareOutcome::Failed(_)));
        assert_eq!(
            fx.notices.notices(),
            vec![Notice::Error("Failed to share image. Please try again.".into())]
        );
        assert!(fx.downloads.names().is_empty());
    }

    #[tokio::test]
    async fn actions_run_on_spawned_tasks() {
        let fx = Fixture::new();
        let actions = Arc::new(actions(ScriptedGate::allow(), CountingCapturer::new(), fx.platform(true), &TINY_STORY));

        let export = tokio::spawn({
            let actions = actions.clone();
            async move { actions.handle_export(Some(ImageFormat::Png), Motion::Still).await }
        });
        let share = tokio::spawn({
            let actions = actions.clone();
            async move { actions.handle_share(Motion::Still).await }
        });

        assert!(matches!(export.await.unwrap(), ExportOutcome::Downloaded { .. }));
        assert!(matches!(share.await.unwrap(), ShareOutcome::Shared { .. }));
        assert_eq!(actions.capturer().calls(), 2);
    }
}

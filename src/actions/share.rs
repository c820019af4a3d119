use super::ImageActions;
use crate::capture::Capturer;
use crate::limiter::{DenyReason, ExportGate, LimitDecision};
use crate::platform::{PlatformApi, SharedFile};
use crate::template::ShareTarget;
use crate::{ImageFormat, Motion, Result};

/// LinkedIn's web share intent. The captured image is not attached.
pub const LINKEDIN_SHARE_URL: &str = "https://www.linkedin.com/sharing/share-offsite/";

pub const SHARE_LIMIT_MESSAGE: &str = "You've reached your sharing limit.";
pub const SHARE_FAILED_MESSAGE: &str = "Failed to share image. Please try again.";
pub const INSTAGRAM_UNSUPPORTED_MESSAGE: &str = "Instagram sharing is not supported on this device";
pub const SHARE_UNSUPPORTED_MESSAGE: &str = "Sharing is not supported on this device";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared { file_name: String, format: ImageFormat },
    OpenedLink(String),
    /// No native share surface; nothing was shared or downloaded
    Unsupported,
    RateLimited(DenyReason),
    Failed(String),
}

impl<G, C, P> ImageActions<G, C, P>
where
    G: ExportGate,
    C: Capturer,
    P: PlatformApi,
{
    /// Share the surface according to the template's share target.
    pub async fn handle_share(&self, motion: Motion) -> ShareOutcome {
        let notifier = self.platform.notifier();

        if let LimitDecision::Denied(reason) = self.gate.check_limit().await {
            notifier.rate_limited();
            notifier.error(SHARE_LIMIT_MESSAGE);
            return ShareOutcome::RateLimited(reason);
        }

        let format = motion.preferred_format();
        let result = match self.render(format).await {
            Ok(bytes) => self.dispatch(format, bytes).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            log::error!("share of {} failed: {}", self.template.name, e);
            notifier.error(SHARE_FAILED_MESSAGE);
            ShareOutcome::Failed(e.to_string())
        })
    }

    async fn dispatch(&self, format: ImageFormat, bytes: Vec<u8>) -> Result<ShareOutcome> {
        match self.template.share_target {
            ShareTarget::InstagramStory => {
                self.native_share(format!("story.{}", format.extension()), format, bytes, INSTAGRAM_UNSUPPORTED_MESSAGE)
                    .await
            }
            ShareTarget::LinkedInPost => {
                log::debug!("dropping {} captured bytes for LinkedIn share intent", bytes.len());
                self.platform.links().open(LINKEDIN_SHARE_URL)?;
                Ok(ShareOutcome::OpenedLink(LINKEDIN_SHARE_URL.to_string()))
            }
            ShareTarget::Generic => {
                self.native_share(format!("image.{}", format.extension()), format, bytes, SHARE_UNSUPPORTED_MESSAGE)
                    .await
            }
        }
    }

    async fn native_share(
        &self,
        file_name: String,
        format: ImageFormat,
        bytes: Vec<u8>,
        unsupported: &str,
    ) -> Result<ShareOutcome> {
        let sheet = self.platform.share_sheet();
        if !sheet.can_share() {
            self.platform.notifier().error(unsupported);
            return Ok(ShareOutcome::Unsupported);
        }
        sheet
            .share(SharedFile {
                name: file_name.clone(),
                mime_type: format.mime_type(),
                bytes,
            })
            .await?;
        Ok(ShareOutcome::Shared { file_name, format })
    }
}

use super::ImageActions;
use crate::capture::Capturer;
use crate::limiter::{DenyReason, ExportGate, LimitDecision};
use crate::platform::PlatformApi;
use crate::{ImageFormat, Motion};

pub const EXPORT_LIMIT_MESSAGE: &str = "You've reached your export limit.";
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to export image. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Downloaded { file_name: String, format: ImageFormat },
    RateLimited(DenyReason),
    Failed(String),
}

impl<G, C, P> ImageActions<G, C, P>
where
    G: ExportGate,
    C: Capturer,
    P: PlatformApi,
{
    /// Export the surface as a download named after the template.
    ///
    /// An explicit `format` wins; otherwise animated surfaces export as GIF
    /// and still ones as PNG.
    pub async fn handle_export(&self, format: Option<ImageFormat>, motion: Motion) -> ExportOutcome {
        let notifier = self.platform.notifier();

        if let LimitDecision::Denied(reason) = self.gate.check_limit().await {
            notifier.rate_limited();
            notifier.error(EXPORT_LIMIT_MESSAGE);
            return ExportOutcome::RateLimited(reason);
        }

        let format = format.unwrap_or_else(|| motion.preferred_format());
        let file_name = self.template.export_file_name(format.extension());
        log::info!("exporting {} as {}", self.template.name, file_name);

        let result = match self.render(format).await {
            Ok(bytes) => self.platform.downloads().download(&file_name, &bytes),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                notifier.success(match format {
                    ImageFormat::Png => "Image downloaded successfully!",
                    ImageFormat::Gif => "GIF downloaded successfully!",
                });
                ExportOutcome::Downloaded { file_name, format }
            }
            Err(e) => {
                log::error!("export of {} failed: {}", file_name, e);
                notifier.error(EXPORT_FAILED_MESSAGE);
                ExportOutcome::Failed(e.to_string())
            }
        }
    }
}

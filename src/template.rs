//! Fixed registry of canvas templates.

use crate::{Error, Result};

/// Where a share of this template goes.
///
/// Resolved once in the registry so share dispatch never compares names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    /// Native share sheet with a `story.*` attachment
    InstagramStory,
    /// LinkedIn's web share intent; the image is not attached
    LinkedInPost,
    /// Native share sheet with an `image.*` attachment
    Generic,
}

/// An immutable canvas descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub share_target: ShareTarget,
}

impl Template {
    /// Download file name for this template, e.g. `job-post-instagram story.png`.
    pub fn export_file_name(&self, extension: &str) -> String {
        format!("job-post-{}.{}", self.name.to_lowercase(), extension)
    }
}

pub static TEMPLATES: [Template; 3] = [
    Template {
        key: "instagram-post",
        name: "Instagram Post",
        width: 1080,
        height: 1080,
        share_target: ShareTarget::Generic,
    },
    Template {
        key: "instagram-story",
        name: "Instagram Story",
        width: 1080,
        height: 1920,
        share_target: ShareTarget::InstagramStory,
    },
    Template {
        key: "linkedin-post",
        name: "LinkedIn Post",
        width: 1200,
        height: 627,
        share_target: ShareTarget::LinkedInPost,
    },
];

/// The template selected when none is given.
pub const DEFAULT_TEMPLATE: &str = "instagram-post";

/// Look up a template by its registry key.
pub fn template(key: &str) -> Result<&'static Template> {
    TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| Error::UnknownTemplate(key.to_string()))
}

/// All registered templates in display order.
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

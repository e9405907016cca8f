use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{ResourceDescriptor, ResourceKind};
use crate::storage;

pub const VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";
pub const PDF_URL: &str = "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf";

/// Configuration for the screen and its HTTP client
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub video_url: String,
    pub video_path: String,
    pub document_url: String,
    pub document_path: String,
    pub storage_root: PathBuf,
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        let storage_root = storage::document_root().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "no XDG data directory, storing files in the working directory");
            PathBuf::from(".")
        });

        Self {
            video_url: VIDEO_URL.to_string(),
            video_path: "/video.mp4".to_string(),
            document_url: PDF_URL.to_string(),
            document_path: "/pdf.pdf".to_string(),
            storage_root,
            user_agent: format!("media-screen/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl ScreenConfig {
    /// Descriptors in fetch order: video first, then document.
    pub fn descriptors(&self) -> Result<Vec<ResourceDescriptor>, url::ParseError> {
        Ok(vec![
            ResourceDescriptor::parse(ResourceKind::Video, &self.video_url, &self.video_path)?,
            ResourceDescriptor::parse(
                ResourceKind::Document,
                &self.document_url,
                &self.document_path,
            )?,
        ])
    }
}

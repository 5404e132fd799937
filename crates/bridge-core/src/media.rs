//! Media pipeline
//!
//! Turns an item's attachment list into an ordered content sequence:
//! classify by MIME type, keep supported images and videos, truncate to the
//! caller's limit, download each survivor and encode it.
//!
//! Filtering happens before truncation, and truncation before any download,
//! so the result depends on the order the provider listed the attachments.
//! The whole sequence is buffered and returned at once; a cancelled call
//! yields nothing rather than a partial payload.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::content::{ContentBlock, ToolResult};

/// Image types accepted by the media filter
const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Video types accepted by the media filter
const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/webm",
];

/// Image types that can be sent inline, with their canonical MIME type
const ENCODABLE_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "image/png"),
    ("image/jpeg", "image/jpeg"),
    ("image/jpg", "image/jpeg"),
    ("image/gif", "image/gif"),
    ("image/webp", "image/webp"),
    ("image/svg+xml", "image/svg+xml"),
];

/// Metadata for one attachment, as listed by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub source_url: String,
    pub author: String,
    /// `None` when the provider's timestamp could not be read
    pub created_at: Option<DateTime<Utc>>,
}

/// Broad media category of a supported attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a MIME type against the allow-list
///
/// Matching is exact after lowercasing. Anything else, including an empty
/// or malformed type, is unsupported.
pub fn classify(mime_type: &str) -> Option<MediaKind> {
    let mime = mime_type.trim().to_ascii_lowercase();
    if IMAGE_TYPES.contains(&mime.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_TYPES.contains(&mime.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Canonical MIME type for an image that can be sent inline
pub fn encodable_image_type(mime_type: &str) -> Option<&'static str> {
    let mime = mime_type.trim().to_ascii_lowercase();
    ENCODABLE_IMAGE_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == mime)
        .map(|(_, canonical)| *canonical)
}

/// Why a download produced no bytes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error("download timed out after {0:?}")]
    Timeout(Duration),

    #[error("download failed: {0}")]
    Failed(String),
}

/// Fetches attachment bytes
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Builds media results with a bounded per-download timeout
#[derive(Debug, Clone, Copy)]
pub struct MediaPipeline {
    timeout: Duration,
}

impl Default for MediaPipeline {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl MediaPipeline {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Assemble the media result for `item_id`
    ///
    /// A failed or timed-out download is reported inline and the batch
    /// carries on with the next attachment.
    pub async fn build_media_result(
        &self,
        item_id: &str,
        attachments: &[AttachmentRef],
        max_files: u32,
        downloader: &dyn Downloader,
    ) -> ToolResult {
        if attachments.is_empty() {
            return ToolResult::text(format!("No attachments found for `{}`.", item_id));
        }

        let media: Vec<(&AttachmentRef, MediaKind)> = attachments
            .iter()
            .filter_map(|a| classify(&a.mime_type).map(|kind| (a, kind)))
            .collect();

        if media.is_empty() {
            return ToolResult::text(format!(
                "No images or videos found for `{}`. Found {} other attachment(s).",
                item_id,
                attachments.len()
            ));
        }

        let retained: Vec<_> = media.into_iter().take(max_files as usize).collect();

        let mut result = ToolResult::default();
        result.push(ContentBlock::text(format!(
            "# Media Attachments for {}\n\nFound {} image(s)/video(s):\n",
            item_id,
            retained.len()
        )));

        for (index, (attachment, kind)) in retained.into_iter().enumerate() {
            tracing::info!(
                item = %item_id,
                file = %attachment.filename,
                mime = %attachment.mime_type,
                "Downloading attachment"
            );

            let bytes = match self.fetch(downloader, &attachment.source_url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(file = %attachment.filename, error = %err, "Attachment download failed");
                    result.push(ContentBlock::text(format!(
                        "Failed to download: `{}`",
                        attachment.filename
                    )));
                    continue;
                }
            };

            result.push(ContentBlock::text(describe(index + 1, attachment)));

            match kind {
                MediaKind::Image => match encodable_image_type(&attachment.mime_type) {
                    Some(canonical) => result.push(ContentBlock::binary(canonical, &bytes)),
                    None => result.push(ContentBlock::text(format!(
                        "Unsupported image format: {}",
                        attachment.mime_type
                    ))),
                },
                MediaKind::Video => result.push(ContentBlock::text(format!(
                    "Video file (download to view): {}",
                    attachment.source_url
                ))),
            }
        }

        result
    }

    async fn fetch(&self, downloader: &dyn Downloader, url: &str) -> Result<Vec<u8>, DownloadError> {
        match tokio::time::timeout(self.timeout, downloader.download(url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(DownloadError::Timeout(self.timeout)),
        }
    }
}

fn describe(position: usize, attachment: &AttachmentRef) -> String {
    format!(
        "## {}. {}\n- **Type:** {}\n- **Size:** {} bytes\n- **Author:** {}\n- **Created:** {}\n",
        position,
        attachment.filename,
        attachment.mime_type,
        group_thousands(attachment.size_bytes),
        attachment.author,
        attachment
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
    )
}

/// Render `1234567` as `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", Some(MediaKind::Image))]
    #[case("image/jpeg", Some(MediaKind::Image))]
    #[case("IMAGE/JPG", Some(MediaKind::Image))]
    #[case("image/svg+xml", Some(MediaKind::Image))]
    #[case("video/mp4", Some(MediaKind::Video))]
    #[case("video/x-msvideo", Some(MediaKind::Video))]
    #[case("video/webm", Some(MediaKind::Video))]
    #[case("image/bmp", None)]
    #[case("image/png; charset=binary", None)]
    #[case("text/plain", None)]
    #[case("application/pdf", None)]
    #[case("", None)]
    fn test_classify(#[case] mime: &str, #[case] expected: Option<MediaKind>) {
        assert_eq!(classify(mime), expected);
    }

    #[rstest]
    #[case("image/png", Some("image/png"))]
    #[case("image/jpg", Some("image/jpeg"))]
    #[case("Image/WebP", Some("image/webp"))]
    #[case("video/mp4", None)]
    #[case("image/tiff", None)]
    fn test_encodable_image_type(#[case] mime: &str, #[case] expected: Option<&str>) {
        assert_eq!(encodable_image_type(mime), expected);
    }

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1000, "1,000")]
    #[case(204800, "204,800")]
    #[case(1234567, "1,234,567")]
    fn test_group_thousands(#[case] value: u64, #[case] expected: &str) {
        assert_eq!(group_thousands(value), expected);
    }

    #[test]
    fn test_every_encodable_type_passes_the_filter() {
        for (mime, _) in ENCODABLE_IMAGE_TYPES {
            assert_eq!(classify(mime), Some(MediaKind::Image), "{}", mime);
        }
    }
}

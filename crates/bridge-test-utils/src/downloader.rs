//! [`StaticDownloader`] and attachment fixtures for media pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bridge_core::{AttachmentRef, DownloadError, Downloader};
use chrono::{TimeZone, Utc};

enum Outcome {
    Bytes(Vec<u8>),
    Fail(String),
    Hang,
}

/// Serves canned bytes per URL and records every requested URL.
///
/// Unknown URLs fail, like a 404 would.
#[derive(Default)]
pub struct StaticDownloader {
    outcomes: HashMap<String, Outcome>,
    requested: Mutex<Vec<String>>,
}

impl StaticDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, bytes: &[u8]) -> Self {
        self.outcomes.insert(url.to_string(), Outcome::Bytes(bytes.to_vec()));
        self
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.outcomes
            .insert(url.to_string(), Outcome::Fail(message.to_string()));
        self
    }

    /// Never resolve, so the pipeline's timeout has to fire.
    pub fn hang(mut self, url: &str) -> Self {
        self.outcomes.insert(url.to_string(), Outcome::Hang);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for StaticDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requested.lock().unwrap().push(url.to_string());

        match self.outcomes.get(url) {
            Some(Outcome::Bytes(bytes)) => Ok(bytes.clone()),
            Some(Outcome::Fail(message)) => Err(DownloadError::Failed(message.clone())),
            Some(Outcome::Hang) => std::future::pending().await,
            None => Err(DownloadError::Failed(format!("404 Not Found: {url}"))),
        }
    }
}

/// An attachment served from `https://files.test/<filename>`.
///
/// Author and timestamp are fixed so rendered metadata is predictable.
pub fn attachment(filename: &str, mime_type: &str, size_bytes: u64) -> AttachmentRef {
    AttachmentRef {
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        size_bytes,
        source_url: format!("https://files.test/{filename}"),
        author: "Ada Lovelace".to_string(),
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
    }
}

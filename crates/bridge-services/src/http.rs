//! Authenticated JSON-over-HTTP plumbing shared by the providers

use std::time::Duration;

use async_trait::async_trait;
use bridge_core::{DownloadError, Downloader};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Per-request timeout for API calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How requests authenticate against a backend
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// GitLab's `PRIVATE-TOKEN: <token>`
    PrivateToken(String),
    /// HTTP basic auth
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Auth::Bearer(_) => "Bearer",
            Auth::PrivateToken(_) => "PrivateToken",
            Auth::Basic { .. } => "Basic",
        };
        write!(f, "Auth::{kind}(<redacted>)")
    }
}

/// A backend base URL plus an authenticated client
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: Url,
    client: Client,
    auth: Auth,
}

impl HttpApi {
    pub fn new(base_url: &str, auth: Auth, verify_ssl: bool) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: base_url.to_string(),
                message: "not a base URL".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;

        Ok(Self {
            base_url,
            client,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL extended with `segments`, each percent-encoded
    ///
    /// A segment containing `/` stays one segment (`group/project` becomes
    /// `group%2Fproject`).
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::PrivateToken(token) => request.header("PRIVATE-TOKEN", token),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// GET a JSON document below the base URL
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments);
        tracing::debug!(url = %url, "GET");

        let response = self
            .authorize(self.client.get(url.clone()).query(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.path().to_string(),
                status,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// GET raw bytes from an absolute URL using this API's credentials
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.authorize(self.client.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Downloader for HttpApi {
    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, DownloadError> {
        self.get_bytes(url)
            .await
            .map_err(|e| DownloadError::Failed(e.to_string()))
    }
}

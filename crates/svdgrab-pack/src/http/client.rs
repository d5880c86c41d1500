//! HTTP client for index and pack retrieval.
//!
//! A thin wrapper around `reqwest`:
//! - one attempt per request, any status other than 200 becomes [`PackError::Status`]
//! - streaming downloads that publish their progress into a [`TransferProgress`]
//! - configurable User-Agent and timeouts
//!
//! # Examples
//!
//! ```no_run
//! use svdgrab_pack::http::{HttpClient, HttpClientConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new().with_connect_timeout(Duration::from_secs(5));
//! let client = HttpClient::with_config(config)?;
//!
//! let body = client.get_text("https://www.keil.com/pack/index.pidx").await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::downloader::TransferProgress;
use crate::{PackError, Result};

const DEFAULT_USER_AGENT: &str = concat!("svdgrab/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        // Packs can be hundreds of megabytes, so no overall timeout unless asked
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            user_agent: config.user_agent,
        })
    }

    /// Perform a GET request, failing on any status other than 200 OK
    pub async fn get(&self, url: &str) -> Result<Response> {
        log::debug!("HTTP GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            log::debug!("HTTP {} {}", status.as_u16(), url);
            return Err(PackError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// GET and read the whole body as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let text = response.text().await.map_err(|source| PackError::BodyRead {
            url: url.to_string(),
            source,
        })?;

        log::debug!("HTTP 200 {} ({} bytes)", url, text.len());
        Ok(text)
    }

    /// Stream a file to `dest`, publishing transferred bytes into `progress`.
    ///
    /// Returns the HTTP status code of the response. The partially written
    /// file is removed if the transfer fails midway.
    pub async fn download(&self, url: &str, dest: &Path, progress: &TransferProgress) -> Result<u16> {
        let response = self.get(url).await?;
        let status = response.status().as_u16();

        if let Some(total) = response.content_length() {
            progress.set_total(total);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let result = stream_to_file(response, url, dest, progress).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(dest).await;
        }
        result.map(|()| status)
    }

    /// Get the configured user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

async fn stream_to_file(response: Response, url: &str, dest: &Path, progress: &TransferProgress) -> Result<()> {
    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| PackError::BodyRead {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await?;
        progress.add(chunk.len() as u64);
    }

    file.flush().await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

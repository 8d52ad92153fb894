//! Network access for manifests and archives.

use async_trait::async_trait;
use futures_util::StreamExt;
use pvm_core::{Error, Fix, Result};
use pvm_ui::{Progress, Style};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Fetches bytes from the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a small document into memory.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// Stream a large file to `dest`, returning the number of bytes written.
    ///
    /// `dest` only appears once the transfer has completed.
    async fn download(&self, url: &str, dest: &Path, label: &str) -> Result<u64>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    get_timeout: Duration,
    download_timeout: Duration,
    show_progress: bool,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with default timeouts (30s documents, 5 minutes archives).
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            get_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(300),
            show_progress: true,
        }
    }

    /// Enable or disable the download progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    async fn send(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| fetch_error(url, "request failed", Some(e)))?;

        if !response.status().is_success() {
            return Err(fetch_error(
                url,
                &format!("HTTP {}", response.status()),
                None,
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url, self.get_timeout).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(url, "failed to read response body", Some(e)))?;
        Ok(bytes.to_vec())
    }

    async fn download(&self, url: &str, dest: &Path, label: &str) -> Result<u64> {
        let response = self.send(url, self.download_timeout).await?;

        let total_size = response.content_length().unwrap_or(0);
        let progress = if self.show_progress && total_size > 0 {
            Some(Progress::new(total_size, format!("Downloading {}", label)))
        } else {
            None
        };

        let temp_path = partial_path(dest);
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::io("failed to create download file", &temp_path, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    if let Some(pb) = progress {
                        pb.abandon();
                    }
                    let _ = tokio::fs::remove_file(&temp_path).await;
                    return Err(fetch_error(url, "download interrupted", Some(e)));
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io("failed to write download data", &temp_path, e))?;
            downloaded += chunk.len() as u64;
            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush()
            .await
            .map_err(|e| Error::io("failed to write download data", &temp_path, e))?;
        drop(file);

        if let Some(pb) = progress {
            pb.finish(format!("Downloaded {} ({})", label, Style::megabytes(downloaded)));
        }

        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(|e| Error::io("failed to finalize download", dest, e))?;

        Ok(downloaded)
    }
}

/// `{dest}.part`, where an in-flight download is written.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".part");
    PathBuf::from(s)
}

fn fetch_error(url: &str, message: &str, source: Option<reqwest::Error>) -> Error {
    Error::DistributionFetch {
        url: url.to_string(),
        message: message.to_string(),
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        fixes: vec![Fix::new("Check your network connection and that the version exists")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/cache/php-8.4.0.tar.gz")),
            PathBuf::from("/cache/php-8.4.0.tar.gz.part")
        );
    }

    #[test]
    fn test_default_timeouts() {
        let transport = HttpTransport::new();
        assert_eq!(transport.get_timeout, Duration::from_secs(30));
        assert_eq!(transport.download_timeout, Duration::from_secs(300));
        assert!(transport.show_progress);
        assert!(!transport.with_progress(false).show_progress);
    }
}

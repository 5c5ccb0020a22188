use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::ReadAt;
use crate::config::HttpConfig;
use anyhow::{Result, anyhow, bail};

/// Reads a remote archive with HTTP Range requests, so only the central
/// directory and the selected entries are transferred.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
    config: HttpConfig,
}

impl HttpRangeReader {
    /// Probe `url` with a HEAD request for Range support and length.
    pub async fn new(url: String, config: HttpConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        let resp = client.head(&url).send().await?;
        if !resp.status().is_success() {
            bail!("HEAD {url} failed with status {}", resp.status());
        }

        let accept_ranges = resp
            .headers()
            .get(reqwest::header::ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        if !accept_ranges.contains("bytes") {
            bail!("{url} does not support Range requests");
        }

        let size = resp
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("{url} did not return Content-Length"))?;

        debug!(%url, size, "opened remote archive");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
            config,
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let end = (offset + buf.len() as u64 - 1).min(self.size - 1);
        let expected = (end - offset + 1) as usize;

        let mut received = 0;
        let mut attempt = 0;

        while received < expected {
            let start = offset + received as u64;
            let result = self
                .client
                .get(&self.url)
                .header(reqwest::header::RANGE, format!("bytes={start}-{end}"))
                .send()
                .await;

            match result {
                Ok(resp) => {
                    if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        bail!("Range request failed with status {}", resp.status());
                    }
                    let bytes = resp.bytes().await?;
                    if bytes.is_empty() {
                        bail!("server returned an empty range for bytes={start}-{end}");
                    }
                    let n = bytes.len().min(expected - received);
                    buf[received..received + n].copy_from_slice(&bytes[..n]);
                    received += n;
                    self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt >= self.config.max_retries {
                        bail!("giving up after {attempt} attempts: {e}");
                    }
                    warn!(attempt, max = self.config.max_retries, error = %e, "range request failed, retrying");
                    tokio::time::sleep(self.config.backoff(attempt)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

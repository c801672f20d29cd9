use std::time::{Duration, Instant};

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::LauncherConfig;
use crate::engine::models::Manifest;

const USER_AGENT: &str = concat!("pgral-launcher/", env!("CARGO_PKG_VERSION"));

/// Bytes written by a completed download and their digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadSummary {
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
    manifest_timeout: Duration,
    download_timeout: Duration,
}

impl NetworkClient {
    pub fn new(config: &LauncherConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            manifest_timeout: config.manifest_timeout,
            download_timeout: config.download_timeout,
        }
    }

    pub async fn fetch_manifest(&self, url: &str) -> Result<Manifest, String> {
        debug!("fetch_manifest: GET {url}");
        let resp = self
            .client
            .get(url)
            .timeout(self.manifest_timeout)
            .send()
            .await
            .map_err(|e| format!("manifest request to {url} failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("manifest request bad status: {e}"))?;
        let text = resp
            .text()
            .await
            .map_err(|e| format!("manifest body error from {url}: {e}"))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .map_err(|e| format!("manifest parse error from {url}: {e}"))?;
        manifest.validated()
    }

    /// Stream `url` into `file`, hashing as chunks arrive. `progress` gets (downloaded, total).
    pub async fn download_to_file<F>(
        &self,
        url: &str,
        file: &mut File,
        mut progress: F,
    ) -> Result<DownloadSummary, String>
    where
        F: FnMut(u64, Option<u64>),
    {
        debug!("download: GET {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| format!("download request to {url} failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("download status error: {e}"))?;

        let total = response.content_length();
        let mut stream = response.bytes_stream();
        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut last_tick = Instant::now();

        progress(0, total);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("stream error: {e}"))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| format!("write error: {e}"))?;
            hasher.update(&chunk);
            downloaded += chunk.len() as u64;

            if last_tick.elapsed().as_secs_f32() > 0.1 {
                progress(downloaded, total);
                last_tick = Instant::now();
            }
        }
        progress(downloaded, total);

        file.flush()
            .await
            .map_err(|e| format!("flush error: {e}"))?;

        if let Some(total) = total
            && downloaded < total
        {
            return Err(format!(
                "download incomplete: received {} of {} bytes",
                downloaded, total
            ));
        }

        Ok(DownloadSummary {
            bytes: downloaded,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }
}

use std::time::Duration;

use crate::engine::models::UpdateChannel;

const MANIFEST_BASE: &str = "https://raw.githubusercontent.com/gateway19/pgral/refs/heads";
const MANIFEST_FILE: &str = "info.json";
const RELEASE_BASE: &str = "https://github.com/gateway19/pgral/releases/download";
const ASSET_NAME: &str = "pgral.exe";
const COMPANION_NAME: &str = "pgral.exe";

/// Everything the launcher needs to know about where updates live.
/// Built once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct LauncherConfig {
    pub manifest_base: String,
    pub manifest_file: String,
    pub release_base: String,
    pub asset_name: String,
    pub companion_name: String,
    pub manifest_timeout: Duration,
    pub download_timeout: Duration,
    pub connect_timeout: Duration,
    pub lock_timeout: Duration,
    pub show_progress: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            manifest_base: MANIFEST_BASE.into(),
            manifest_file: MANIFEST_FILE.into(),
            release_base: RELEASE_BASE.into(),
            asset_name: ASSET_NAME.into(),
            companion_name: COMPANION_NAME.into(),
            manifest_timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(10 * 60),
            connect_timeout: Duration::from_secs(15),
            lock_timeout: Duration::from_secs(30),
            show_progress: true,
        }
    }
}

impl LauncherConfig {
    /// Point both the manifest and the release host at `base` (used against local test servers).
    #[cfg(test)]
    pub fn with_hosts(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.manifest_base = format!("{base}/refs/heads");
        self.release_base = format!("{base}/releases/download");
        self
    }

    #[cfg(test)]
    pub fn with_timeouts(mut self, manifest: Duration, download: Duration) -> Self {
        self.manifest_timeout = manifest;
        self.download_timeout = download;
        self
    }

    #[cfg(test)]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Manifest URL for a channel; `None` when no channel was selected.
    pub fn manifest_url(&self, channel: UpdateChannel) -> Option<String> {
        let branch = channel.branch()?;
        Some(format!(
            "{}/{}/{}",
            self.manifest_base.trim_end_matches('/'),
            branch,
            self.manifest_file
        ))
    }

    pub fn asset_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}",
            self.release_base.trim_end_matches('/'),
            version,
            self.asset_name
        )
    }
}

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, debug, error, info, warn};

use crate::config::LauncherConfig;
use crate::engine::models::{LaunchRequest, UpdateChannel, VersionCheck};
use crate::engine::state::{RunReport, UpdateOutcome, UpdateStage};
use crate::env;
use crate::networking::NetworkClient;
use crate::process::{CompanionLauncher, ProcessLauncher};
use crate::storage::{CompanionStore, UpdateLock};
use crate::updater;

pub mod models;
pub mod state;

pub struct LauncherEngine<L = ProcessLauncher> {
    config: LauncherConfig,
    networking: NetworkClient,
    storage: CompanionStore,
    launcher: L,
}

impl LauncherEngine<ProcessLauncher> {
    pub fn new(config: LauncherConfig) -> Self {
        let storage = CompanionStore::new(env::companion_path(&config));
        Self::with_parts(config, storage, ProcessLauncher::new())
    }
}

impl<L: CompanionLauncher> LauncherEngine<L> {
    pub fn with_parts(config: LauncherConfig, storage: CompanionStore, launcher: L) -> Self {
        let networking = NetworkClient::new(&config);
        Self {
            config,
            networking,
            storage,
            launcher,
        }
    }

    /// Check for an update when a channel is selected, then start the companion.
    /// Update failures never prevent the launch.
    pub async fn run(&self, channel: UpdateChannel, request: &LaunchRequest) -> RunReport {
        let update = self.update(channel).await;
        match &update {
            UpdateOutcome::Skipped => debug!("run: update check disabled"),
            UpdateOutcome::UpToDate { version } => info!("run: companion up-to-date ({version})"),
            UpdateOutcome::Updated { version } => info!("run: companion updated to {version}"),
            UpdateOutcome::Failed { stage, reason } => warn!(
                "run: {stage} failed ({reason}); launching existing companion at {}",
                self.storage.path().display()
            ),
        }

        let launch = self.launcher.launch(self.storage.path(), request);
        if let Err(err) = &launch {
            error!("run: launch failed: {err}");
        }
        RunReport { update, launch }
    }

    pub async fn update(&self, channel: UpdateChannel) -> UpdateOutcome {
        if !channel.is_set() {
            return UpdateOutcome::Skipped;
        }

        let lock_path = env::lock_path(self.storage.path());
        let _lock = match UpdateLock::acquire(&lock_path, self.config.lock_timeout).await {
            Ok(lock) => lock,
            Err(err) => return UpdateOutcome::failed(UpdateStage::Lock, err),
        };

        let check =
            match updater::check_version(&self.networking, &self.config, channel, &self.storage)
                .await
            {
                Ok(check) => check,
                Err(err) => return UpdateOutcome::failed(UpdateStage::ManifestFetch, err),
            };

        if !check.checksums.needs_update() {
            return UpdateOutcome::UpToDate {
                version: check.version,
            };
        }

        println!("Updating to {} {}", channel, check.version);
        self.replace_companion(&check).await
    }

    async fn replace_companion(&self, check: &VersionCheck) -> UpdateOutcome {
        let url = self.config.asset_url(&check.version);
        let mut staged = match self.storage.stage() {
            Ok(staged) => staged,
            Err(err) => return UpdateOutcome::failed(UpdateStage::Install, err),
        };
        debug!(
            "update: downloading {url} into {}",
            staged.path().display()
        );

        let bar = self.progress_bar();
        let started = Instant::now();
        let result = self
            .networking
            .download_to_file(&url, staged.file_mut(), |downloaded, total| {
                if let Some(total) = total {
                    bar.set_length(total);
                }
                bar.set_position(downloaded);
            })
            .await;
        bar.finish_and_clear();

        let summary = match result {
            Ok(summary) => summary,
            Err(err) => {
                return UpdateOutcome::failed(UpdateStage::BinaryDownload, format!("{url}: {err}"));
            }
        };
        debug!(
            "update: received {} bytes in {:.1}s",
            summary.bytes,
            started.elapsed().as_secs_f32()
        );

        if summary.sha256 != check.checksums.remote {
            return UpdateOutcome::failed(
                UpdateStage::Verify,
                format!(
                    "{url} has sha256 {} but the manifest declares {}",
                    summary.sha256, check.checksums.remote
                ),
            );
        }

        if let Err(err) = self.storage.install(staged).await {
            return UpdateOutcome::failed(UpdateStage::Install, err);
        }
        UpdateOutcome::Updated {
            version: check.version.clone(),
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !progress_visible(self.config.show_progress, log::max_level()) {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "  {msg} [{bar:30}] {bytes}/{total_bytes} {bytes_per_sec} ETA {eta}",
        ) {
            pb.set_style(style);
        }
        pb.set_message(self.config.asset_name.clone());
        pb
    }
}

/// The download bar draws only while logging is at `warn` or quieter.
fn progress_visible(enabled: bool, log_level: LevelFilter) -> bool {
    enabled && log_level <= LevelFilter::Warn
}

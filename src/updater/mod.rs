use log::{debug, info};

use crate::config::LauncherConfig;
use crate::engine::models::{ChecksumPair, Manifest, UpdateChannel, VersionCheck};
use crate::networking::NetworkClient;
use crate::storage::CompanionStore;

/// Compare the companion on disk with the digest published on `channel`.
///
/// # Errors
/// Returns an error string if no channel is selected, or the manifest cannot be fetched or decoded.
pub async fn check_version(
    network: &NetworkClient,
    config: &LauncherConfig,
    channel: UpdateChannel,
    companion: &CompanionStore,
) -> Result<VersionCheck, String> {
    let url = config
        .manifest_url(channel)
        .ok_or("no update channel selected")?;

    let local = companion.local_digest();
    debug!(
        "check_version: local digest of {} = {:?}",
        companion.path().display(),
        local
    );

    let Manifest { sha256, version } = network.fetch_manifest(&url).await?;
    info!("check_version: {channel} publishes {version} ({sha256})");

    Ok(VersionCheck {
        checksums: ChecksumPair {
            local,
            remote: sha256,
        },
        version,
    })
}

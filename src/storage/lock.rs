use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use fs4::fs_std::FileExt;
use log::{debug, warn};

/// Exclusive OS file lock held while the companion is checked and replaced.
/// Released when dropped.
#[derive(Debug)]
pub struct UpdateLock {
    file: File,
    path: PathBuf,
}

impl UpdateLock {
    /// Wait up to `timeout` for the lock at `path`.
    pub async fn acquire(path: &Path, timeout: Duration) -> Result<Self, String> {
        let lock_path = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || -> Result<File, String> {
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|e| format!("failed to open lock file {}: {e}", lock_path.display()))?;
            file.lock_exclusive()
                .map_err(|e| format!("failed to lock {}: {e}", lock_path.display()))?;

            // Holder info is informational only.
            let _ = file.set_len(0);
            let _ = writeln!(
                file,
                "pid={} acquired={}",
                std::process::id(),
                Utc::now().to_rfc3339()
            );
            Ok(file)
        });

        let file = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(err)) => return Err(format!("lock task failed: {err}")),
            Err(_) => {
                return Err(format!(
                    "timed out after {}s waiting for {}; another launcher may be updating",
                    timeout.as_secs(),
                    path.display()
                ));
            }
        };
        debug!("lock: acquired {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!("lock: failed to unlock {}: {err}", self.path.display());
        }
    }
}

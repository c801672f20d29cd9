use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};
use sha2::{Digest, Sha256};
use tempfile::TempPath;
use tokio::fs::File;

pub mod lock;

pub use lock::UpdateLock;

const STAGING_PREFIX: &str = ".pgral-";
const STAGING_SUFFIX: &str = ".part";

/// Owns the companion binary on disk while an update is in progress.
#[derive(Clone, Debug)]
pub struct CompanionStore {
    path: PathBuf,
}

/// A replacement being written beside the companion. Removed on drop unless installed.
pub struct StagedBinary {
    file: File,
    path: TempPath,
}

impl StagedBinary {
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompanionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the companion, or an empty string when it cannot be read.
    pub fn local_digest(&self) -> String {
        match file_sha256(&self.path) {
            Ok(digest) => digest,
            Err(err) => {
                debug!("storage: treating companion as missing: {err}");
                String::new()
            }
        }
    }

    /// Open a temporary file in the companion's directory so the final rename stays on one filesystem.
    pub fn stage(&self) -> Result<StagedBinary, String> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| format!("failed to create companion dir: {e}"))?;
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| format!("failed to create staging file in {}: {e}", dir.display()))?;
        let (file, path) = temp.into_parts();
        debug!("storage: staging replacement at {}", path.display());
        Ok(StagedBinary {
            file: File::from_std(file),
            path,
        })
    }

    /// Flush the staged file and rename it over the companion.
    pub async fn install(&self, staged: StagedBinary) -> Result<(), String> {
        let StagedBinary { file, path } = staged;
        file.sync_all()
            .await
            .map_err(|e| format!("failed to sync staged binary: {e}"))?;
        drop(file);

        #[cfg(not(target_os = "windows"))]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .map_err(|e| format!("failed to mark staged binary executable: {e}"))?;
        }

        path.persist(&self.path).map_err(|e| {
            format!(
                "failed to replace {} (is it running?): {}",
                self.path.display(),
                e.error
            )
        })?;
        info!("storage: installed new companion at {}", self.path.display());
        Ok(())
    }
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = fs::File::open(path).map_err(|e| format!("checksum open error: {e}"))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let read = file
            .read(&mut buf)
            .map_err(|e| format!("checksum read error: {e}"))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hashes_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgral.exe");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(file_sha256(&path).unwrap(), ABC_DIGEST);

        // Larger than one read buffer.
        let big = vec![7u8; 20_000];
        fs::write(&path, &big).unwrap();
        let expected = format!("{:x}", Sha256::digest(&big));
        assert_eq!(file_sha256(&path).unwrap(), expected);
    }

    #[test]
    fn missing_companion_has_empty_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompanionStore::new(dir.path().join("pgral.exe"));
        assert!(!store.path().exists());
        assert_eq!(store.local_digest(), "");

        fs::write(store.path(), b"").unwrap();
        assert_eq!(store.local_digest(), EMPTY_DIGEST);
    }

    #[tokio::test]
    async fn installs_staged_binary_over_companion() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompanionStore::new(dir.path().join("pgral.exe"));
        fs::write(store.path(), b"old").unwrap();

        let mut staged = store.stage().unwrap();
        let staged_path = staged.path().to_path_buf();
        assert_eq!(staged_path.parent(), Some(dir.path()));
        staged.file_mut().write_all(b"abc").await.unwrap();
        staged.file_mut().flush().await.unwrap();

        store.install(staged).await.unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), b"abc");
        assert_eq!(store.local_digest(), ABC_DIGEST);
        assert!(!staged_path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[tokio::test]
    async fn dropped_staging_leaves_companion_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompanionStore::new(dir.path().join("pgral.exe"));
        fs::write(store.path(), b"old").unwrap();

        let mut staged = store.stage().unwrap();
        let staged_path = staged.path().to_path_buf();
        staged.file_mut().write_all(b"partial").await.unwrap();
        drop(staged);

        assert!(!staged_path.exists());
        assert_eq!(fs::read(store.path()).unwrap(), b"old");
    }
}

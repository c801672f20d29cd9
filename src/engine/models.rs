use std::fmt;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateChannel {
    #[default]
    Unset,
    Main,
    Beta,
}

impl UpdateChannel {
    /// Only the exact strings `main` and `beta` select a channel.
    pub fn parse(value: &str) -> Self {
        match value {
            "main" => UpdateChannel::Main,
            "beta" => UpdateChannel::Beta,
            _ => UpdateChannel::Unset,
        }
    }

    /// Branch segment of the manifest URL. Beta builds are published from `dev`.
    pub fn branch(self) -> Option<&'static str> {
        match self {
            UpdateChannel::Main => Some("main"),
            UpdateChannel::Beta => Some("dev"),
            UpdateChannel::Unset => None,
        }
    }

    pub fn is_set(self) -> bool {
        self != UpdateChannel::Unset
    }
}

impl fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateChannel::Main => "main",
            UpdateChannel::Beta => "beta",
            UpdateChannel::Unset => "",
        };
        f.write_str(label)
    }
}

// Extra keys in the published JSON are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub version: String,
}

impl Manifest {
    /// Normalise the digest and reject manifests that cannot drive an update.
    pub fn validated(self) -> Result<Self, String> {
        let sha256 = self.sha256.trim().to_ascii_lowercase();
        if sha256.len() != 64 || !sha256.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("manifest sha256 is not a hex digest: {:?}", self.sha256));
        }
        let version = self.version.trim().to_owned();
        if version.is_empty() {
            return Err("manifest version is empty".into());
        }
        Ok(Self { sha256, version })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksumPair {
    /// Digest of the companion on disk; empty when it could not be read.
    pub local: String,
    pub remote: String,
}

impl ChecksumPair {
    pub fn needs_update(&self) -> bool {
        self.local != self.remote
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionCheck {
    pub checksums: ChecksumPair,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    pub passthrough_url: String,
}

impl LaunchRequest {
    pub fn new(passthrough_url: impl Into<String>) -> Self {
        Self {
            passthrough_url: passthrough_url.into(),
        }
    }
}

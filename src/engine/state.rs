use std::fmt;

// Where in the update sequence a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStage {
    Lock,
    ManifestFetch,
    BinaryDownload,
    Verify,
    Install,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateStage::Lock => "lock",
            UpdateStage::ManifestFetch => "manifest fetch",
            UpdateStage::BinaryDownload => "binary download",
            UpdateStage::Verify => "verify",
            UpdateStage::Install => "install",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Skipped,
    UpToDate { version: String },
    Updated { version: String },
    Failed { stage: UpdateStage, reason: String },
}

impl UpdateOutcome {
    pub fn failed(stage: UpdateStage, reason: impl Into<String>) -> Self {
        UpdateOutcome::Failed {
            stage,
            reason: reason.into(),
        }
    }
}

/// What a single launcher run did.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub update: UpdateOutcome,
    pub launch: Result<(), String>,
}

impl RunReport {
    pub fn launched(&self) -> bool {
        self.launch.is_ok()
    }
}

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use crate::engine::models::LaunchRequest;

/// Starts the companion application. The engine never waits on it.
pub trait CompanionLauncher {
    fn launch(&self, companion: &Path, request: &LaunchRequest) -> Result<(), String>;
}

#[derive(Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl CompanionLauncher for ProcessLauncher {
    fn launch(&self, companion: &Path, request: &LaunchRequest) -> Result<(), String> {
        if !companion.is_file() {
            warn!("launch: companion not found at {}", companion.display());
            return Err(format!("companion not found at {}", companion.display()));
        }

        // Resolved before `current_dir` changes what a relative path points at.
        let companion = absolute_program(companion)?;
        let companion = companion.as_path();
        let args = companion_args(request);
        debug!("launch: {} {:?}", companion.display(), args);

        let mut cmd = if cfg!(target_os = "windows") {
            // `start` detaches; the empty string is its window title.
            let mut command = Command::new("cmd");
            command.arg("/c").arg("start").arg("").arg(companion);
            command
        } else {
            Command::new(companion)
        };
        cmd.args(&args);

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            // CREATE_NO_WINDOW
            cmd.creation_flags(0x08000000);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        if let Some(dir) = companion.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| format!("failed to start companion process: {e}"))?;
        info!("launch: companion started (pid {})", child.id());
        Ok(())
    }
}

fn absolute_program(companion: &Path) -> Result<PathBuf, String> {
    std::path::absolute(companion)
        .map_err(|e| format!("failed to resolve {}: {e}", companion.display()))
}

/// Wrap the passthrough URL in literal double quotes, the form the companion expects.
pub fn quoted_passthrough(url: &str) -> String {
    format!("\"{url}\"")
}

/// `-u "<url>"` when a URL was given, nothing otherwise.
pub fn companion_args(request: &LaunchRequest) -> Vec<String> {
    let quoted = quoted_passthrough(&request.passthrough_url);
    if quoted == "\"\"" {
        Vec::new()
    } else {
        vec!["-u".to_owned(), quoted]
    }
}

use std::env;
use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;

/// Directory holding the launcher executable; the companion lives beside it.
pub fn launcher_dir() -> PathBuf {
    let exe = env::current_exe()
        .ok()
        .or_else(|| env::args_os().next().map(PathBuf::from));
    exe.as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn companion_path(config: &LauncherConfig) -> PathBuf {
    companion_path_in(&launcher_dir(), config)
}

pub fn companion_path_in(dir: &Path, config: &LauncherConfig) -> PathBuf {
    dir.join(&config.companion_name)
}

/// Lock guarding check-and-replace, e.g. `pgral.exe.lock`.
pub fn lock_path(companion: &Path) -> PathBuf {
    let mut name = companion
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "companion".into());
    name.push(".lock");
    companion.with_file_name(name)
}

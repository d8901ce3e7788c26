use std::path::{Path, PathBuf};
use std::time::Duration;

use splitflash_core::config::SplitflashConfig;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub volume_path: Option<PathBuf>,
}

/// Fully resolved paths and knobs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub firmware_dir: PathBuf,
    pub build_script: PathBuf,
    pub build_target: String,
    pub volume_path: PathBuf,
    pub poll_interval: Duration,
}

impl Settings {
    pub fn from_config(config: &SplitflashConfig, base_dir: PathBuf, overrides: &Overrides) -> Self {
        Self {
            firmware_dir: config.firmware_dir(&base_dir),
            build_script: config.build_script(&base_dir),
            build_target: config.firmware.build_target.clone(),
            volume_path: overrides
                .volume_path
                .clone()
                .unwrap_or_else(|| config.device.volume_path.clone()),
            poll_interval: config.poll_interval(),
            base_dir,
        }
    }
}

/// Picks the directory holding `firmware/` and `build.sh`: the working
/// directory when it looks like a checkout, else the executable's directory
/// when it has builds, else the working directory.
pub fn resolve_base_dir(cwd: &Path, exe_dir: Option<&Path>) -> PathBuf {
    if cwd.join("firmware").is_dir() || cwd.join("build.sh").exists() {
        return cwd.to_path_buf();
    }

    match exe_dir {
        Some(dir) if dir.join("firmware").is_dir() => dir.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}

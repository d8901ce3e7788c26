use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::builder::DEFAULT_BUILD_TARGET;

const CONFIG_VERSION: u32 = 1;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const POLL_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=10_000;
const VOLUME_LABEL: &str = "NICENANO";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SplitflashConfig {
    pub version: u32,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub firmware: FirmwareConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub volume_path: PathBuf,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FirmwareConfig {
    pub dir: PathBuf,
    pub build_script: PathBuf,
    pub build_target: String,
}

impl Default for SplitflashConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            device: DeviceConfig::default(),
            firmware: FirmwareConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            volume_path: default_volume_path(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("firmware"),
            build_script: PathBuf::from("build.sh"),
            build_target: DEFAULT_BUILD_TARGET.to_string(),
        }
    }
}

impl SplitflashConfig {
    pub fn firmware_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.firmware.dir)
    }

    pub fn build_script(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.firmware.build_script)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.device.poll_interval_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn default_volume_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        return Path::new("/Volumes").join(VOLUME_LABEL);
    }

    match std::env::var("USER") {
        Ok(user) if !user.trim().is_empty() => Path::new("/media").join(user).join(VOLUME_LABEL),
        _ => Path::new("/media").join(VOLUME_LABEL),
    }
}

pub fn resolve_config_path() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("splitflash")
        .join("config.toml"))
}

/// Loads the config at `path`, falling back to defaults when no file exists.
pub fn load_config_or_default(path: &Path) -> Result<SplitflashConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(SplitflashConfig::default());
    }
    load_config(path)
}

pub fn load_config(path: &Path) -> Result<SplitflashConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: SplitflashConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

pub fn validate_config(config: &SplitflashConfig) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::Validation {
        message: message.to_string(),
    };

    if config.version != CONFIG_VERSION {
        return Err(invalid("version must be 1"));
    }

    if config.device.volume_path.as_os_str().is_empty() {
        return Err(invalid("device.volume_path must be non-empty"));
    }

    if !POLL_INTERVAL_RANGE_MS.contains(&config.device.poll_interval_ms) {
        return Err(ConfigError::Validation {
            message: format!(
                "device.poll_interval_ms must be between {} and {}",
                POLL_INTERVAL_RANGE_MS.start(),
                POLL_INTERVAL_RANGE_MS.end()
            ),
        });
    }

    if config.firmware.dir.as_os_str().is_empty() {
        return Err(invalid("firmware.dir must be non-empty"));
    }

    if config.firmware.build_script.as_os_str().is_empty() {
        return Err(invalid("firmware.build_script must be non-empty"));
    }

    if config.firmware.build_target.trim().is_empty() {
        return Err(invalid("firmware.build_target must be non-empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_config_from_toml(raw: &str) -> Result<SplitflashConfig, ConfigError> {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), raw).expect("write temp config");
        load_config(file.path())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load_config_from_toml("version = 1\n").expect("valid config");
        assert_eq!(config.device.poll_interval_ms, 500);
        assert_eq!(config.firmware.build_target, "both");
        assert_eq!(config.firmware.dir, PathBuf::from("firmware"));
        assert!(config.device.volume_path.ends_with("NICENANO"));
    }

    #[test]
    fn accepts_full_config() {
        let raw = r#"
version = 1

[device]
volume_path = "/Volumes/NICENANO"
poll_interval_ms = 250

[firmware]
dir = "out"
build_script = "scripts/build.sh"
build_target = "left"
"#;

        let config = load_config_from_toml(raw).expect("valid config");
        assert_eq!(config.device.volume_path, PathBuf::from("/Volumes/NICENANO"));
        assert_eq!(config.poll_interval(), std::time::Duration::from_millis(250));
        assert_eq!(
            config.build_script(Path::new("/work")),
            PathBuf::from("/work/scripts/build.sh")
        );
        assert_eq!(
            config.firmware_dir(Path::new("/work")),
            PathBuf::from("/work/out")
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let error = load_config_from_toml("version = 2\n").expect_err("config should fail");
        assert!(error.to_string().contains("version must be 1"));
    }

    #[test]
    fn rejects_out_of_range_poll_interval() {
        let raw = r#"
version = 1

[device]
poll_interval_ms = 5
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("poll_interval_ms must be between"));
    }

    #[test]
    fn rejects_blank_build_target() {
        let raw = r#"
version = 1

[firmware]
build_target = "  "
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("build_target must be non-empty"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let error = load_config_from_toml("version = ").expect_err("config should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config =
            load_config_or_default(&temp.path().join("config.toml")).expect("default config");
        assert_eq!(config, SplitflashConfig::default());
    }
}

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{SplitflashConfig, load_config};
use crate::firmware;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

#[derive(Debug, Clone)]
pub struct DoctorRequest {
    pub base_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub volume_override: Option<PathBuf>,
}

const DEPENDENT_CHECKS: [&str; 3] = [
    "build script executable",
    "firmware directory readable",
    "device volume mounted",
];

pub fn run_doctor(request: &DoctorRequest) -> DoctorReport {
    let mut checks = Vec::new();

    checks.push(match env::consts::OS {
        "macos" => pass_check("os is supported", "detected macOS"),
        "linux" => pass_check("os is supported", "detected Linux"),
        detected => fail_check(
            "os is supported",
            format!("detected {detected}, expected macOS or Linux"),
        ),
    });

    checks.push(if request.base_dir.is_dir() {
        pass_check(
            "base dir resolved",
            request.base_dir.display().to_string(),
        )
    } else {
        fail_check(
            "base dir resolved",
            format!("{} is not a directory", request.base_dir.display()),
        )
    });

    let config = match request.config_path.as_deref() {
        None => {
            checks.push(fail_check(
                "config is valid",
                "could not resolve home directory for config path",
            ));
            push_skipped_checks(&mut checks, &DEPENDENT_CHECKS, "config path is unknown");
            return DoctorReport { checks };
        }
        Some(path) if !path.exists() => {
            checks.push(pass_check(
                "config is valid",
                format!("no file at {}, using defaults", path.display()),
            ));
            SplitflashConfig::default()
        }
        Some(path) => match load_config(path) {
            Ok(config) => {
                checks.push(pass_check(
                    "config is valid",
                    format!("loaded {}", path.display()),
                ));
                config
            }
            Err(error) => {
                checks.push(fail_check("config is valid", error.to_string()));
                push_skipped_checks(&mut checks, &DEPENDENT_CHECKS, "config is invalid");
                return DoctorReport { checks };
            }
        },
    };

    checks.push(check_build_script(&config.build_script(&request.base_dir)));
    checks.push(check_firmware_dir(&config.firmware_dir(&request.base_dir)));

    let volume = request
        .volume_override
        .clone()
        .unwrap_or_else(|| config.device.volume_path.clone());
    checks.push(check_volume(&volume));

    DoctorReport { checks }
}

fn check_build_script(script: &Path) -> DoctorCheck {
    const NAME: &str = "build script executable";

    if !script.exists() {
        return fail_check(NAME, format!("missing {}", script.display()));
    }

    if is_executable_file(script) {
        pass_check(NAME, format!("found {}", script.display()))
    } else {
        fail_check(
            NAME,
            format!("{} is not an executable file", script.display()),
        )
    }
}

fn check_firmware_dir(dir: &Path) -> DoctorCheck {
    const NAME: &str = "firmware directory readable";

    if !dir.exists() {
        return pass_check(
            NAME,
            format!("no builds yet ({} does not exist)", dir.display()),
        );
    }

    match firmware::scan(dir) {
        Ok(builds) => {
            let complete = builds.iter().filter(|build| build.is_complete()).count();
            pass_check(
                NAME,
                format!(
                    "{} builds in {} ({complete} with both halves)",
                    builds.len(),
                    dir.display()
                ),
            )
        }
        Err(error) => fail_check(NAME, error.to_string()),
    }
}

fn check_volume(volume: &Path) -> DoctorCheck {
    const NAME: &str = "device volume mounted";

    if volume.exists() {
        pass_check(NAME, format!("mounted at {}", volume.display()))
    } else {
        fail_check(
            NAME,
            format!(
                "not mounted at {}; double-tap reset to enter the bootloader",
                volume.display()
            ),
        )
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}

fn push_skipped_checks(checks: &mut Vec<DoctorCheck>, names: &[&str], reason: &str) {
    checks.extend(
        names
            .iter()
            .copied()
            .map(|name| skipped_check(name, reason)),
    );
}

fn is_executable_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match path.metadata() {
            Ok(metadata) => metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        true
    }
}

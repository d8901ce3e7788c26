use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const LEFT_FIRMWARE: &str = "corne_left.uf2";
pub const RIGHT_FIRMWARE: &str = "corne_right.uf2";
pub const RESET_FIRMWARE: &str = "settings_reset.uf2";

const FIRMWARE_EXTENSION: &str = "uf2";
const BUILD_DATE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// A dated directory of firmware images. Never constructed with an empty
/// `files` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub date: String,
    pub path: PathBuf,
    pub files: Vec<FirmwareFile>,
    pub has_left: bool,
    pub has_right: bool,
    pub has_reset: bool,
}

impl Build {
    pub fn is_complete(&self) -> bool {
        self.has_left && self.has_right
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }

    pub fn firmware_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read firmware directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

struct ListedEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Lists the dated builds under `root`, newest first. A missing root is an
/// empty result. Only a failure to read `root` itself is an error; unreadable
/// builds and files inside it are skipped.
pub fn scan(root: &Path) -> Result<Vec<Build>, ScanError> {
    let entries = match sorted_entries(root) {
        Ok(entries) => entries,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "firmware root missing, no builds");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ScanError::ReadDir {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    let mut builds = Vec::new();
    for entry in entries {
        if !entry.is_dir || !is_build_date(&entry.name) {
            continue;
        }

        if let Some(build) = scan_build(entry.name, entry.path) {
            builds.push(build);
        }
    }

    builds.sort_by(|left, right| right.date.cmp(&left.date));
    debug!(root = %root.display(), count = builds.len(), "firmware scan finished");
    Ok(builds)
}

pub fn is_build_date(name: &str) -> bool {
    name.len() == BUILD_DATE_LEN && name.bytes().all(|byte| byte.is_ascii_digit())
}

fn scan_build(date: String, path: PathBuf) -> Option<Build> {
    let entries = match sorted_entries(&path) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(build = %path.display(), %error, "skipping unreadable build");
            return None;
        }
    };

    let mut build = Build {
        date,
        path,
        files: Vec::new(),
        has_left: false,
        has_right: false,
        has_reset: false,
    };

    for entry in entries {
        if entry.is_dir
            || entry.path.extension().and_then(|value| value.to_str()) != Some(FIRMWARE_EXTENSION)
        {
            continue;
        }

        let metadata = match fs::metadata(&entry.path) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(file = %entry.path.display(), %error, "skipping unreadable firmware file");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        match entry.name.as_str() {
            LEFT_FIRMWARE => build.has_left = true,
            RIGHT_FIRMWARE => build.has_right = true,
            RESET_FIRMWARE => build.has_reset = true,
            _ => {}
        }

        build.files.push(FirmwareFile {
            name: entry.name,
            path: entry.path,
            size: metadata.len(),
        });
    }

    (!build.files.is_empty()).then_some(build)
}

/// Entries of `dir` sorted by name. The directory flag comes from the listing
/// and does not follow symlinks.
fn sorted_entries(dir: &Path) -> io::Result<Vec<ListedEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = entry
            .file_type()
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        entries.push(ListedEntry {
            name,
            path: entry.path(),
            is_dir,
        });
    }

    entries.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(entries)
}

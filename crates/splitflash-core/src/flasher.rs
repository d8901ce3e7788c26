use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::firmware::{LEFT_FIRMWARE, RESET_FIRMWARE, RIGHT_FIRMWARE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStep {
    Left,
    Right,
    ResetLeft,
    ResetRight,
}

/// Each first half is followed by its second half; second halves end the
/// sequence.
const STEP_SEQUENCE: [(FlashStep, Option<FlashStep>); 4] = [
    (FlashStep::Left, Some(FlashStep::Right)),
    (FlashStep::Right, None),
    (FlashStep::ResetLeft, Some(FlashStep::ResetRight)),
    (FlashStep::ResetRight, None),
];

impl FlashStep {
    pub fn next(self) -> Option<FlashStep> {
        STEP_SEQUENCE
            .iter()
            .find(|(step, _)| *step == self)
            .and_then(|(_, next)| *next)
    }

    pub fn firmware_name(self) -> &'static str {
        match self {
            Self::Left => LEFT_FIRMWARE,
            Self::Right => RIGHT_FIRMWARE,
            Self::ResetLeft | Self::ResetRight => RESET_FIRMWARE,
        }
    }

    pub fn is_reset(self) -> bool {
        matches!(self, Self::ResetLeft | Self::ResetRight)
    }

    pub fn is_first_half(self) -> bool {
        matches!(self, Self::Left | Self::ResetLeft)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "LEFT half",
            Self::Right => "RIGHT half",
            Self::ResetLeft => "LEFT half (reset)",
            Self::ResetRight => "RIGHT half (reset)",
        }
    }
}

impl fmt::Display for FlashStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum FlashError {
    #[error("firmware path has no file name: {0}")]
    InvalidSource(PathBuf),
    #[error("failed to open firmware {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to stat firmware {path}: {source}")]
    StatSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create {path} on device: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy firmware to {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("short write: copied {written} of {expected} bytes")]
    ShortWrite { expected: u64, written: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReport {
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Copies firmware images onto the bootloader volume.
#[derive(Debug, Clone)]
pub struct Flasher {
    volume_path: PathBuf,
}

impl Flasher {
    pub fn new(volume_path: impl Into<PathBuf>) -> Self {
        Self {
            volume_path: volume_path.into(),
        }
    }

    pub fn volume_path(&self) -> &Path {
        &self.volume_path
    }

    pub fn flash(&self, step: FlashStep, source: &Path) -> Result<FlashReport, FlashError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| FlashError::InvalidSource(source.to_path_buf()))?;
        let destination = self.volume_path.join(file_name);
        info!(%step, source = %source.display(), destination = %destination.display(), "flashing");

        let mut reader = File::open(source).map_err(|error| FlashError::OpenSource {
            path: source.to_path_buf(),
            source: error,
        })?;
        let expected = reader
            .metadata()
            .map_err(|error| FlashError::StatSource {
                path: source.to_path_buf(),
                source: error,
            })?
            .len();

        let mut writer =
            File::create(&destination).map_err(|error| FlashError::CreateDestination {
                path: destination.clone(),
                source: error,
            })?;

        let bytes = copy_verified(&mut reader, &mut writer, expected, &destination)
            .inspect_err(|error| warn!(%step, %error, "flash failed"))?;

        info!(%step, bytes, "flash finished");
        Ok(FlashReport { destination, bytes })
    }
}

/// Compares against the size observed before the copy started. This is a
/// length check, not a checksum.
fn copy_verified<R, W>(
    reader: &mut R,
    writer: &mut W,
    expected: u64,
    destination: &Path,
) -> Result<u64, FlashError>
where
    R: Read,
    W: Write,
{
    let copy_error = |source| FlashError::Copy {
        path: destination.to_path_buf(),
        source,
    };

    let written = io::copy(reader, writer).map_err(copy_error)?;
    writer.flush().map_err(copy_error)?;

    if written != expected {
        return Err(FlashError::ShortWrite { expected, written });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    use super::{FlashError, FlashStep, Flasher, copy_verified};

    #[test]
    fn steps_pair_first_and_second_halves() {
        assert_eq!(FlashStep::Left.next(), Some(FlashStep::Right));
        assert_eq!(FlashStep::ResetLeft.next(), Some(FlashStep::ResetRight));
        assert_eq!(FlashStep::Right.next(), None);
        assert_eq!(FlashStep::ResetRight.next(), None);
    }

    #[test]
    fn steps_map_to_firmware_files() {
        assert_eq!(FlashStep::Left.firmware_name(), "corne_left.uf2");
        assert_eq!(FlashStep::Right.firmware_name(), "corne_right.uf2");
        assert_eq!(FlashStep::ResetLeft.firmware_name(), "settings_reset.uf2");
        assert_eq!(FlashStep::ResetRight.firmware_name(), "settings_reset.uf2");
        assert!(FlashStep::ResetRight.is_reset());
        assert!(!FlashStep::Right.is_first_half());
        assert_eq!(FlashStep::ResetLeft.to_string(), "LEFT half (reset)");
    }

    #[test]
    fn flash_copies_file_under_its_basename() {
        let temp = tempfile::tempdir().expect("temp dir");
        let volume = temp.path().join("NICENANO");
        fs::create_dir(&volume).expect("mount");
        let source = temp.path().join("20240115").join("corne_left.uf2");
        fs::create_dir_all(source.parent().expect("parent")).expect("build dir");
        fs::write(&source, vec![7u8; 4096]).expect("write firmware");

        let report = Flasher::new(&volume)
            .flash(FlashStep::Left, &source)
            .expect("flash");

        assert_eq!(report.bytes, 4096);
        assert_eq!(report.destination, volume.join("corne_left.uf2"));
        assert_eq!(fs::read(&report.destination).expect("read"), vec![7u8; 4096]);
    }

    #[test]
    fn flash_overwrites_existing_destination() {
        let temp = tempfile::tempdir().expect("temp dir");
        let volume = temp.path().join("NICENANO");
        fs::create_dir(&volume).expect("mount");
        fs::write(volume.join("corne_right.uf2"), vec![1u8; 9000]).expect("stale file");
        let source = temp.path().join("corne_right.uf2");
        fs::write(&source, vec![2u8; 10]).expect("write firmware");

        Flasher::new(&volume)
            .flash(FlashStep::Right, &source)
            .expect("flash");

        assert_eq!(
            fs::read(volume.join("corne_right.uf2")).expect("read"),
            vec![2u8; 10]
        );
    }

    #[test]
    fn missing_source_reports_open_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let error = Flasher::new(temp.path())
            .flash(FlashStep::Left, &temp.path().join("missing.uf2"))
            .expect_err("flash should fail");
        assert!(matches!(error, FlashError::OpenSource { .. }));
    }

    #[test]
    fn missing_volume_reports_create_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let source = temp.path().join("corne_left.uf2");
        fs::write(&source, b"uf2").expect("write firmware");

        let error = Flasher::new(temp.path().join("NICENANO"))
            .flash(FlashStep::Left, &source)
            .expect_err("flash should fail");
        assert!(matches!(error, FlashError::CreateDestination { .. }));
    }

    #[test]
    fn short_copy_is_failure_without_io_error() {
        let mut reader = Cursor::new(vec![0u8; 10]);
        let mut writer = Vec::new();

        let error = copy_verified(&mut reader, &mut writer, 20, Path::new("/dev/null"))
            .expect_err("short copy");
        assert!(matches!(
            error,
            FlashError::ShortWrite {
                expected: 20,
                written: 10
            }
        ));
        assert_eq!(writer.len(), 10);
    }

    #[test]
    fn source_without_file_name_is_rejected() {
        let error = Flasher::new("/tmp")
            .flash(FlashStep::Left, Path::new("/"))
            .expect_err("flash should fail");
        assert!(matches!(error, FlashError::InvalidSource(_)));
    }
}

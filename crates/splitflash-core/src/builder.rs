use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::command_runner::CommandRunner;

pub const DEFAULT_BUILD_TARGET: &str = "both";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStep {
    ActivateEnv,
    BuildLeft,
    BuildRight,
    CopyFirmware,
    Complete,
}

impl BuildStep {
    pub const SCHEDULE: [BuildStep; 4] = [
        BuildStep::ActivateEnv,
        BuildStep::BuildLeft,
        BuildStep::BuildRight,
        BuildStep::CopyFirmware,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ActivateEnv => "Activate environment",
            Self::BuildLeft => "Build left half",
            Self::BuildRight => "Build right half",
            Self::CopyFirmware => "Copy to firmware/",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display-only build progress. Advances on the UI tick and has no relation
/// to what the build script is actually doing; success and failure come
/// from the exit status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildProgress {
    ticks: u32,
}

impl BuildProgress {
    pub const TICKS_PER_STEP: u32 = 20;

    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn step(&self) -> BuildStep {
        BuildStep::SCHEDULE[self.step_index()]
    }

    pub fn percent(&self) -> u16 {
        (self.step_index() as u16 * 100) / BuildStep::SCHEDULE.len() as u16
    }

    fn step_index(&self) -> usize {
        let index = (self.ticks / Self::TICKS_PER_STEP) as usize;
        index.min(BuildStep::SCHEDULE.len() - 1)
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to start build script {script}: {source:#}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("build script {script} exited with status {status}")]
    Failed { script: PathBuf, status: i32 },
}

/// Runs the external build script as `script <target>` from the base
/// directory. Output is captured and dropped.
#[derive(Clone)]
pub struct Builder {
    script: PathBuf,
    working_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Builder {
    pub fn new(
        script: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            script: script.into(),
            working_dir: working_dir.into(),
            runner,
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn build(&self, target: &str) -> Result<(), BuildError> {
        let program = self.script.to_string_lossy();
        info!(script = %self.script.display(), target, "build started");

        let output = self
            .runner
            .run(&program, &[target], Some(&self.working_dir))
            .map_err(|source| BuildError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        if !output.success() {
            warn!(
                script = %self.script.display(),
                status = output.status_code,
                output_bytes = output.combined().len(),
                "build script failed"
            );
            return Err(BuildError::Failed {
                script: self.script.clone(),
                status: output.status_code,
            });
        }

        info!(target, "build finished");
        Ok(())
    }
}

mod activity;
mod effect;
mod message;
mod model;
mod runtime;
mod session;
mod settings;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use splitflash_core::command_runner::CommandRunner;
use splitflash_core::config::{SplitflashConfig, load_config_or_default, resolve_config_path};
use splitflash_core::doctor::{DoctorReport, DoctorRequest, run_doctor};
use splitflash_core::firmware::{self, Build};

pub use activity::{ActivityLog, LogEntry, LogLevel, MAX_ENTRIES};
pub use effect::Effect;
pub use message::{Key, Msg};
pub use model::{DialogChoice, Model, ModelOptions, Panel, Phase};
pub use runtime::{Dispatch, Runtime, TICK_INTERVAL};
pub use session::Session;
pub use settings::{Overrides, Settings, resolve_base_dir};

pub struct App {
    runner: Arc<dyn CommandRunner>,
}

impl App {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn load_config(&self) -> Result<SplitflashConfig> {
        let config_path = resolve_config_path().context("failed to resolve config path")?;

        load_config_or_default(&config_path).map_err(|error| {
            anyhow!(
                "invalid config at {}: {error}\nFix or remove the config and retry.",
                config_path.display()
            )
        })
    }

    pub fn settings(&self, overrides: &Overrides) -> Result<Settings> {
        let config = self.load_config()?;
        let base_dir = self.base_dir(overrides)?;
        Ok(Settings::from_config(&config, base_dir, overrides))
    }

    pub fn doctor(&self, overrides: &Overrides) -> Result<DoctorReport> {
        Ok(run_doctor(&DoctorRequest {
            base_dir: self.base_dir(overrides)?,
            config_path: resolve_config_path().ok(),
            volume_override: overrides.volume_path.clone(),
        }))
    }

    pub fn list_builds(&self, settings: &Settings) -> Result<Vec<Build>> {
        firmware::scan(&settings.firmware_dir).with_context(|| {
            format!(
                "failed to scan firmware directory {}",
                settings.firmware_dir.display()
            )
        })
    }

    fn base_dir(&self, overrides: &Overrides) -> Result<PathBuf> {
        if let Some(base_dir) = &overrides.base_dir {
            return Ok(base_dir.clone());
        }

        let cwd = env::current_dir().context("failed to resolve working directory")?;
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from));
        Ok(resolve_base_dir(&cwd, exe_dir.as_deref()))
    }
}

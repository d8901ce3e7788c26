use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use splitflash_core::builder::BuildProgress;
use splitflash_core::device::{DeviceStatus, StatusChange};
use splitflash_core::firmware::Build;
use splitflash_core::flasher::FlashStep;
use tracing::debug;

use crate::activity::{ActivityLog, LogLevel};
use crate::effect::Effect;
use crate::message::{Key, Msg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    WaitingDevice,
    Flashing,
    /// Idle with the factory-reset confirmation open.
    FactoryResetPending,
    Complete,
}

impl Phase {
    fn is_busy(self) -> bool {
        matches!(self, Self::Building | Self::WaitingDevice | Self::Flashing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Firmware,
    Status,
    Log,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Firmware, Panel::Status, Panel::Log];

    fn next(self) -> Self {
        match self {
            Self::Firmware => Self::Status,
            Self::Status => Self::Log,
            Self::Log => Self::Firmware,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Firmware => "Firmware",
            Self::Status => "Status",
            Self::Log => "Log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    pub build_target: String,
    pub volume_path: PathBuf,
}

/// Orchestrator state. Mutated only through [`Model::update`], which returns
/// the background work the caller must start.
#[derive(Debug, Clone)]
pub struct Model {
    phase: Phase,
    panel: Panel,
    show_help: bool,
    dialog_choice: DialogChoice,
    width: u16,
    height: u16,

    builds: Vec<Build>,
    selected: usize,
    device_status: DeviceStatus,

    pending_step: Option<FlashStep>,
    wait_generation: u64,
    flash_build: Option<Build>,
    completed_steps: Vec<FlashStep>,
    started_at: Option<Instant>,
    finished_in: Option<Duration>,

    build_progress: BuildProgress,
    spinner: usize,
    tick_armed: bool,

    log: ActivityLog,
    build_target: String,
    volume_path: PathBuf,
}

impl Model {
    pub fn init(
        options: ModelOptions,
        scanned: Result<Vec<Build>, String>,
        device_status: DeviceStatus,
    ) -> (Self, Vec<Effect>) {
        let mut model = Self {
            phase: Phase::Idle,
            panel: Panel::Firmware,
            show_help: false,
            dialog_choice: DialogChoice::Cancel,
            width: 0,
            height: 0,
            builds: Vec::new(),
            selected: 0,
            device_status,
            pending_step: None,
            wait_generation: 0,
            flash_build: None,
            completed_steps: Vec::new(),
            started_at: None,
            finished_in: None,
            build_progress: BuildProgress::default(),
            spinner: 0,
            tick_armed: false,
            log: ActivityLog::default(),
            build_target: options.build_target,
            volume_path: options.volume_path,
        };

        model.log.push(LogLevel::Info, "App started");
        model.apply_scan(scanned);
        if device_status == DeviceStatus::Connected {
            model.log.push(LogLevel::Success, "Device connected");
        }

        (model, vec![Effect::Poll])
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        let mut effects = Vec::new();

        match msg {
            Msg::Resize { width, height } => {
                self.width = width;
                self.height = height;
            }
            Msg::Key(key) => self.handle_key(key, &mut effects),
            Msg::PollFinished(change) => {
                if let Some(change) = change.filter(|change| !change.cancelled) {
                    self.observe(change.status);
                }
                effects.push(Effect::Poll);
            }
            Msg::DeviceStatusChange { generation, change } => {
                self.handle_wait_result(generation, change, &mut effects)
            }
            Msg::BuildComplete { success, error } => {
                self.handle_build_complete(success, error, &mut effects)
            }
            Msg::FlashComplete {
                step,
                success,
                error,
            } => self.handle_flash_complete(step, success, error, &mut effects),
            Msg::BuildsScanned(scanned) => self.apply_scan(scanned),
            Msg::Tick => {
                self.tick_armed = false;
                self.spinner = self.spinner.wrapping_add(1);
                if self.phase == Phase::Building {
                    self.build_progress.advance();
                }
                if self.phase.is_busy() {
                    self.arm_tick(&mut effects);
                }
            }
        }

        effects
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn dialog_choice(&self) -> Option<DialogChoice> {
        (self.phase == Phase::FactoryResetPending).then_some(self.dialog_choice)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.builds.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&Build> {
        self.builds.get(self.selected)
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.device_status
    }

    /// Status for the header indicator; shows `Waiting` while a wait is armed.
    pub fn header_status(&self) -> DeviceStatus {
        if self.phase == Phase::WaitingDevice {
            DeviceStatus::Waiting
        } else {
            self.device_status
        }
    }

    pub fn pending_step(&self) -> Option<FlashStep> {
        self.pending_step
    }

    /// Generation of the most recently armed wait. Wait results carrying any
    /// other generation are ignored.
    pub fn wait_generation(&self) -> u64 {
        self.wait_generation
    }

    pub fn flash_build(&self) -> Option<&Build> {
        self.flash_build.as_ref()
    }

    pub fn completed_steps(&self) -> &[FlashStep] {
        &self.completed_steps
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_in
            .or_else(|| self.started_at.map(|started| started.elapsed()))
    }

    pub fn build_progress(&self) -> BuildProgress {
        self.build_progress
    }

    pub fn spinner(&self) -> usize {
        self.spinner
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn build_target(&self) -> &str {
        &self.build_target
    }

    pub fn volume_path(&self) -> &Path {
        &self.volume_path
    }

    fn handle_key(&mut self, key: Key, effects: &mut Vec<Effect>) {
        match key {
            Key::CtrlC if self.phase == Phase::FactoryResetPending => {
                self.close_dialog();
                return;
            }
            Key::CtrlC => {
                effects.push(Effect::Quit);
                return;
            }
            Key::Char('q')
                if !self.show_help && matches!(self.phase, Phase::Idle | Phase::Complete) =>
            {
                effects.push(Effect::Quit);
                return;
            }
            Key::Char('?') => {
                if self.phase == Phase::Idle {
                    self.show_help = !self.show_help;
                }
                return;
            }
            Key::Esc => {
                self.handle_escape(effects);
                return;
            }
            _ => {}
        }

        if self.phase == Phase::FactoryResetPending {
            self.handle_dialog_key(key, effects);
            return;
        }

        if self.show_help {
            return;
        }

        match self.phase {
            Phase::Idle => self.handle_idle_key(key, effects),
            Phase::Complete if key == Key::Enter => self.finish_complete(),
            _ => {}
        }
    }

    fn handle_escape(&mut self, effects: &mut Vec<Effect>) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.phase {
            Phase::FactoryResetPending => self.close_dialog(),
            Phase::WaitingDevice => {
                effects.push(Effect::CancelWait);
                self.abandon_sequence();
                self.log.push(LogLevel::Info, "Cancelled");
            }
            Phase::Complete => self.finish_complete(),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: Key, effects: &mut Vec<Effect>) {
        match key {
            Key::Left | Key::Char('h') => self.dialog_choice = DialogChoice::Confirm,
            Key::Right | Key::Char('l') => self.dialog_choice = DialogChoice::Cancel,
            Key::Enter => match self.dialog_choice {
                DialogChoice::Confirm => {
                    self.phase = Phase::Idle;
                    self.start_factory_reset(effects);
                }
                DialogChoice::Cancel => self.close_dialog(),
            },
            _ => {}
        }
    }

    fn handle_idle_key(&mut self, key: Key, effects: &mut Vec<Effect>) {
        match key {
            Key::Up | Key::Char('k') if self.panel == Panel::Firmware => {
                self.selected = self.selected.saturating_sub(1);
            }
            Key::Down | Key::Char('j') if self.panel == Panel::Firmware => {
                if self.selected + 1 < self.builds.len() {
                    self.selected += 1;
                }
            }
            Key::Tab => self.panel = self.panel.next(),
            Key::Char('1') => self.panel = Panel::Firmware,
            Key::Char('2') => self.panel = Panel::Status,
            Key::Char('3') => self.panel = Panel::Log,
            Key::Char('b') => self.start_build(effects),
            Key::Char('f') | Key::Enter => self.prepare_flash(effects),
            Key::Char('r') => {
                if self.selected().is_some_and(|build| build.has_reset) {
                    self.dialog_choice = DialogChoice::Cancel;
                    self.phase = Phase::FactoryResetPending;
                }
            }
            _ => {}
        }
    }

    fn handle_wait_result(
        &mut self,
        generation: u64,
        change: StatusChange,
        effects: &mut Vec<Effect>,
    ) {
        if generation != self.wait_generation {
            debug!(
                generation,
                current = self.wait_generation,
                "ignoring result of superseded wait"
            );
            return;
        }

        if change.cancelled {
            if self.phase == Phase::WaitingDevice {
                self.abandon_sequence();
                self.log.push(LogLevel::Info, "Cancelled");
            }
            return;
        }

        self.observe(change.status);
        if change.status == DeviceStatus::Connected && self.phase == Phase::WaitingDevice {
            self.start_flash(effects);
        }
    }

    fn handle_build_complete(
        &mut self,
        success: bool,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        if self.phase != Phase::Building {
            debug!(success, "ignoring build result outside of build");
            return;
        }

        self.phase = Phase::Idle;
        if success {
            self.log.push(LogLevel::Success, "Build complete");
            effects.push(Effect::Rescan);
        } else {
            self.log.push(
                LogLevel::Error,
                format!("Build failed: {}", error.unwrap_or_default()),
            );
        }
    }

    fn handle_flash_complete(
        &mut self,
        step: FlashStep,
        success: bool,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        if self.phase != Phase::Flashing || self.pending_step != Some(step) {
            debug!(%step, success, "ignoring stale flash result");
            return;
        }

        if !success {
            self.log.push(
                LogLevel::Error,
                format!("Flash failed: {}", error.unwrap_or_default()),
            );
            self.abandon_sequence();
            return;
        }

        self.log.push(LogLevel::Success, format!("{step} flashed"));
        self.completed_steps.push(step);

        match step.next() {
            Some(next) => {
                self.pending_step = Some(next);
                self.phase = Phase::WaitingDevice;
                self.log.push(LogLevel::Info, "Waiting for device...");
                self.arm_wait(effects);
                self.arm_tick(effects);
            }
            None => {
                self.pending_step = None;
                self.phase = Phase::Complete;
                self.finished_in = self.started_at.map(|started| started.elapsed());
                self.log.push(LogLevel::Success, "Flash complete");
            }
        }
    }

    fn start_build(&mut self, effects: &mut Vec<Effect>) {
        self.phase = Phase::Building;
        self.build_progress = BuildProgress::default();
        self.started_at = Some(Instant::now());
        self.finished_in = None;
        self.log.push(LogLevel::Info, "Build started");

        effects.push(Effect::Build {
            target: self.build_target.clone(),
        });
        self.arm_tick(effects);
    }

    fn prepare_flash(&mut self, effects: &mut Vec<Effect>) {
        let Some(build) = self.selected().cloned() else {
            self.log.push(LogLevel::Error, "No firmware selected");
            return;
        };

        if !build.is_complete() {
            self.log.push(LogLevel::Error, "Missing firmware files");
            return;
        }

        self.begin_sequence(build, FlashStep::Left, effects);
    }

    fn start_factory_reset(&mut self, effects: &mut Vec<Effect>) {
        let Some(build) = self.selected().filter(|build| build.has_reset).cloned() else {
            return;
        };

        self.log.push(LogLevel::Warning, "Factory reset started");
        self.begin_sequence(build, FlashStep::ResetLeft, effects);
    }

    fn begin_sequence(&mut self, build: Build, first: FlashStep, effects: &mut Vec<Effect>) {
        self.flash_build = Some(build);
        self.completed_steps.clear();
        self.pending_step = Some(first);
        self.started_at = Some(Instant::now());
        self.finished_in = None;

        if self.device_status == DeviceStatus::Connected {
            self.start_flash(effects);
            return;
        }

        self.phase = Phase::WaitingDevice;
        self.log.push(LogLevel::Info, "Waiting for device...");
        self.arm_wait(effects);
        self.arm_tick(effects);
    }

    fn arm_wait(&mut self, effects: &mut Vec<Effect>) {
        self.wait_generation += 1;
        effects.push(Effect::WaitForConnect {
            generation: self.wait_generation,
        });
    }

    fn start_flash(&mut self, effects: &mut Vec<Effect>) {
        let (Some(step), Some(build)) = (self.pending_step, self.flash_build.as_ref()) else {
            self.abandon_sequence();
            return;
        };

        let source = build.firmware_path(step.firmware_name());
        self.phase = Phase::Flashing;
        self.log.push(LogLevel::Info, format!("Flashing {step}"));

        effects.push(Effect::Flash { step, source });
        self.arm_tick(effects);
    }

    fn observe(&mut self, status: DeviceStatus) {
        if status == self.device_status {
            return;
        }

        self.device_status = status;
        match status {
            DeviceStatus::Connected => self.log.push(LogLevel::Success, "Device connected"),
            _ => self.log.push(LogLevel::Info, "Device disconnected"),
        }
    }

    fn apply_scan(&mut self, scanned: Result<Vec<Build>, String>) {
        match scanned {
            Ok(builds) => {
                self.log
                    .push(LogLevel::Info, format!("Found {} builds", builds.len()));
                self.builds = builds;
                self.selected = self.selected.min(self.builds.len().saturating_sub(1));
            }
            Err(error) => self
                .log
                .push(LogLevel::Error, format!("Scan failed: {error}")),
        }
    }

    fn arm_tick(&mut self, effects: &mut Vec<Effect>) {
        if !self.tick_armed {
            self.tick_armed = true;
            effects.push(Effect::ScheduleTick);
        }
    }

    fn close_dialog(&mut self) {
        self.phase = Phase::Idle;
        self.dialog_choice = DialogChoice::Cancel;
    }

    fn abandon_sequence(&mut self) {
        self.phase = Phase::Idle;
        self.pending_step = None;
    }

    fn finish_complete(&mut self) {
        self.phase = Phase::Idle;
        self.completed_steps.clear();
    }
}

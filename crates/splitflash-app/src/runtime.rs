use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use splitflash_core::builder::Builder;
use splitflash_core::command_runner::CommandRunner;
use splitflash_core::device::{DeviceStatus, Watcher};
use splitflash_core::firmware::{self, Build};
use splitflash_core::flasher::Flasher;
use tracing::debug;

use crate::effect::Effect;
use crate::message::Msg;
use crate::settings::Settings;

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Quit,
}

/// Runs reducer effects on worker threads. Every worker reports back through
/// `sender` with a single message; a closed channel means the loop is gone
/// and the result is dropped.
pub struct Runtime {
    sender: Sender<Msg>,
    watcher: Watcher,
    builder: Builder,
    flasher: Flasher,
    firmware_dir: PathBuf,
    tick_interval: Duration,
}

impl Runtime {
    pub fn new(settings: &Settings, runner: Arc<dyn CommandRunner>, sender: Sender<Msg>) -> Self {
        Self {
            sender,
            watcher: Watcher::new(&settings.volume_path).with_interval(settings.poll_interval),
            builder: Builder::new(&settings.build_script, &settings.base_dir, runner),
            flasher: Flasher::new(&settings.volume_path),
            firmware_dir: settings.firmware_dir.clone(),
            tick_interval: TICK_INTERVAL,
        }
    }

    pub fn check_device(&self) -> DeviceStatus {
        self.watcher.check()
    }

    pub fn scan(&self) -> Result<Vec<Build>, String> {
        firmware::scan(&self.firmware_dir).map_err(|error| error.to_string())
    }

    pub fn dispatch(&mut self, effects: Vec<Effect>) -> Dispatch {
        let mut outcome = Dispatch::Continue;
        for effect in effects {
            if self.run(effect) == Dispatch::Quit {
                outcome = Dispatch::Quit;
            }
        }
        outcome
    }

    fn run(&mut self, effect: Effect) -> Dispatch {
        debug!(?effect, "dispatching effect");

        match effect {
            Effect::Poll => {
                let pending = self.watcher.poll();
                self.spawn(move || Some(Msg::PollFinished(pending.run())));
            }
            Effect::WaitForConnect { generation } => {
                let pending = self.watcher.wait_for_connect();
                self.spawn(move || {
                    pending
                        .run()
                        .map(|change| Msg::DeviceStatusChange { generation, change })
                });
            }
            Effect::CancelWait => self.watcher.cancel(),
            Effect::Build { target } => {
                let builder = self.builder.clone();
                self.spawn(move || Some(Msg::build_result(builder.build(&target))));
            }
            Effect::Flash { step, source } => {
                let flasher = self.flasher.clone();
                self.spawn(move || Some(Msg::flash_result(step, flasher.flash(step, &source))));
            }
            Effect::Rescan => {
                let root = self.firmware_dir.clone();
                self.spawn(move || {
                    Some(Msg::BuildsScanned(
                        firmware::scan(&root).map_err(|error| error.to_string()),
                    ))
                });
            }
            Effect::ScheduleTick => {
                let interval = self.tick_interval;
                self.spawn(move || {
                    thread::sleep(interval);
                    Some(Msg::Tick)
                });
            }
            Effect::Quit => {
                self.watcher.cancel();
                return Dispatch::Quit;
            }
        }

        Dispatch::Continue
    }

    fn spawn<F>(&self, work: F)
    where
        F: FnOnce() -> Option<Msg> + Send + 'static,
    {
        let sender = self.sender.clone();
        thread::spawn(move || {
            if let Some(msg) = work() {
                let _ = sender.send(msg);
            }
        });
    }
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use splitflash_app::{Effect, Key, Model, ModelOptions, Msg, Session};
use splitflash_core::command_runner::{CommandOutput, CommandRunner};
use splitflash_core::device::DeviceStatus;
use splitflash_core::firmware::{Build, FirmwareFile};

pub static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const VOLUME: &str = "/Volumes/NICENANO";

#[derive(Default)]
pub struct QueueRunner {
    outputs: Mutex<VecDeque<anyhow::Result<CommandOutput>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl QueueRunner {
    pub fn new(outputs: Vec<anyhow::Result<CommandOutput>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl CommandRunner for QueueRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        _cwd: Option<&Path>,
    ) -> anyhow::Result<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|value| (*value).to_string()));
        self.calls.lock().expect("calls lock").push(call);

        self.outputs
            .lock()
            .expect("outputs lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted output")))
    }
}

pub fn output(stdout: &str, stderr: &str, status: i32) -> anyhow::Result<CommandOutput> {
    Ok(CommandOutput {
        status_code: status,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    })
}

/// In-memory build at `/fw/<date>` holding `names`, 100 KiB each.
pub fn build(date: &str, names: &[&str]) -> Build {
    let path = PathBuf::from("/fw").join(date);
    let files = names
        .iter()
        .map(|name| FirmwareFile {
            name: (*name).to_string(),
            path: path.join(name),
            size: 100 * 1024,
        })
        .collect();

    Build {
        date: date.to_string(),
        has_left: names.contains(&"corne_left.uf2"),
        has_right: names.contains(&"corne_right.uf2"),
        has_reset: names.contains(&"settings_reset.uf2"),
        path,
        files,
    }
}

pub fn complete_build(date: &str) -> Build {
    build(
        date,
        &["corne_left.uf2", "corne_right.uf2", "settings_reset.uf2"],
    )
}

pub fn model_with(builds: Vec<Build>, status: DeviceStatus) -> Model {
    let (model, effects) = Model::init(
        ModelOptions {
            build_target: "both".to_string(),
            volume_path: PathBuf::from(VOLUME),
        },
        Ok(builds),
        status,
    );
    assert_eq!(effects, vec![Effect::Poll]);
    model
}

pub fn press(model: &mut Model, key: Key) -> Vec<Effect> {
    model.update(Msg::Key(key))
}

pub fn press_char(model: &mut Model, value: char) -> Vec<Effect> {
    press(model, Key::Char(value))
}

pub fn last_log(model: &Model) -> String {
    model
        .log()
        .last()
        .map(|entry| entry.message.clone())
        .unwrap_or_default()
}

pub fn write_firmware(root: &Path, date: &str, names: &[&str]) -> PathBuf {
    let dir = root.join(date);
    fs::create_dir_all(&dir).expect("create build dir");
    for name in names {
        fs::write(dir.join(name), name.as_bytes().repeat(64)).expect("write firmware");
    }
    dir
}

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Feeds worker messages into `session` until `done` holds or the deadline
/// passes.
pub fn pump_until<F>(session: &mut Session, timeout: Duration, mut done: F) -> bool
where
    F: FnMut(&Model) -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done(session.model()) {
            return true;
        }
        if let Some(msg) = session.recv_timeout(Duration::from_millis(20)) {
            session.handle(msg);
        }
    }
    done(session.model())
}

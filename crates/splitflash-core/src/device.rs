use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::debug;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    #[default]
    Disconnected,
    Connected,
    Waiting,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Waiting => write!(f, "Waiting..."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: DeviceStatus,
    pub cancelled: bool,
}

impl StatusChange {
    pub fn observed(status: DeviceStatus) -> Self {
        Self {
            status,
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: DeviceStatus::Disconnected,
            cancelled: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    revoked: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

/// Watches the bootloader mount point. Holds at most one live
/// [`PendingWait`]; arming a new one revokes the previous token.
#[derive(Debug)]
pub struct Watcher {
    volume_path: PathBuf,
    interval: Duration,
    last_status: Arc<Mutex<DeviceStatus>>,
    wait_generation: Arc<AtomicU64>,
    active_wait: Option<CancelToken>,
}

impl Watcher {
    pub fn new(volume_path: impl Into<PathBuf>) -> Self {
        Self {
            volume_path: volume_path.into(),
            interval: POLL_INTERVAL,
            last_status: Arc::new(Mutex::new(DeviceStatus::Disconnected)),
            wait_generation: Arc::new(AtomicU64::new(0)),
            active_wait: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn volume_path(&self) -> &Path {
        &self.volume_path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn check(&self) -> DeviceStatus {
        let status = probe(&self.volume_path);
        *self
            .last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = status;
        status
    }

    pub fn poll(&self) -> PendingPoll {
        PendingPoll {
            volume_path: self.volume_path.clone(),
            interval: self.interval,
            last_status: Arc::clone(&self.last_status),
        }
    }

    pub fn wait_for_connect(&mut self) -> PendingWait {
        self.cancel();

        let generation = self.wait_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancelToken::default();
        self.active_wait = Some(token.clone());
        debug!(generation, "armed wait for device");

        PendingWait {
            volume_path: self.volume_path.clone(),
            interval: self.interval,
            token,
            generation,
            latest_generation: Arc::clone(&self.wait_generation),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.active_wait.take() {
            token.cancel();
        }
    }

    pub fn has_active_wait(&self) -> bool {
        self.active_wait
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    pub fn wait_for_eject(&self) -> PendingEject {
        PendingEject {
            volume_path: self.volume_path.clone(),
            interval: self.interval,
        }
    }
}

fn probe(volume_path: &Path) -> DeviceStatus {
    if volume_path.exists() {
        DeviceStatus::Connected
    } else {
        DeviceStatus::Disconnected
    }
}

/// One edge-triggered probe, run off the dispatch thread.
#[derive(Debug)]
pub struct PendingPoll {
    volume_path: PathBuf,
    interval: Duration,
    last_status: Arc<Mutex<DeviceStatus>>,
}

impl PendingPoll {
    pub fn run(self) -> Option<StatusChange> {
        thread::sleep(self.interval);
        let status = probe(&self.volume_path);

        let mut last = self
            .last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *last == status {
            return None;
        }

        let previous = *last;
        debug!(from = %previous, to = %status, "device status changed");
        *last = status;
        Some(StatusChange::observed(status))
    }
}

#[derive(Debug)]
pub struct PendingWait {
    volume_path: PathBuf,
    interval: Duration,
    token: CancelToken,
    generation: u64,
    latest_generation: Arc<AtomicU64>,
}

impl PendingWait {
    /// Blocks until the volume appears or the token is revoked. A wait that
    /// was superseded by a newer one returns `None`.
    pub fn run(self) -> Option<StatusChange> {
        loop {
            if self.token.is_cancelled() {
                if self.latest_generation.load(Ordering::SeqCst) == self.generation {
                    debug!(generation = self.generation, "wait for device cancelled");
                    return Some(StatusChange::cancelled());
                }
                debug!(generation = self.generation, "wait for device superseded");
                return None;
            }

            if probe(&self.volume_path) == DeviceStatus::Connected {
                return Some(StatusChange::observed(DeviceStatus::Connected));
            }

            thread::sleep(self.interval);
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

#[derive(Debug)]
pub struct PendingEject {
    volume_path: PathBuf,
    interval: Duration,
}

impl PendingEject {
    pub fn run(self) -> StatusChange {
        while probe(&self.volume_path) == DeviceStatus::Connected {
            thread::sleep(self.interval);
        }
        StatusChange::observed(DeviceStatus::Disconnected)
    }
}

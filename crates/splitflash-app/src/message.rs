use splitflash_core::device::StatusChange;
use splitflash_core::firmware::Build;
use splitflash_core::flasher::FlashStep;

/// Keys the orchestrator reacts to. Terminal-specific decoding happens in the
/// UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Enter,
    Esc,
    CtrlC,
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Resize {
        width: u16,
        height: u16,
    },
    Key(Key),
    /// Result of one edge-triggered probe. `None` means nothing changed.
    PollFinished(Option<StatusChange>),
    /// Result of the cancellable wait for the device to mount, tagged with
    /// the generation of the wait that produced it.
    DeviceStatusChange {
        generation: u64,
        change: StatusChange,
    },
    BuildComplete {
        success: bool,
        error: Option<String>,
    },
    FlashComplete {
        step: FlashStep,
        success: bool,
        error: Option<String>,
    },
    BuildsScanned(Result<Vec<Build>, String>),
    Tick,
}

impl Msg {
    pub fn build_result(result: Result<(), impl ToString>) -> Self {
        match result {
            Ok(()) => Self::BuildComplete {
                success: true,
                error: None,
            },
            Err(error) => Self::BuildComplete {
                success: false,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn flash_result<T>(step: FlashStep, result: Result<T, impl ToString>) -> Self {
        match result {
            Ok(_) => Self::FlashComplete {
                step,
                success: true,
                error: None,
            },
            Err(error) => Self::FlashComplete {
                step,
                success: false,
                error: Some(error.to_string()),
            },
        }
    }
}

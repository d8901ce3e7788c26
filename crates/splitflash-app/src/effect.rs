use std::path::PathBuf;

use splitflash_core::flasher::FlashStep;

/// Follow-up work requested by the reducer. Each background effect answers
/// with exactly one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// One probe after the poll interval; answers `Msg::PollFinished`.
    Poll,
    /// Replaces any outstanding wait; answers `Msg::DeviceStatusChange`
    /// carrying the same generation.
    WaitForConnect { generation: u64 },
    CancelWait,
    Build { target: String },
    Flash { step: FlashStep, source: PathBuf },
    Rescan,
    ScheduleTick,
    Quit,
}

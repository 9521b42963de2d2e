//! Launcher core: process supervision, readiness probing and the launch state machine.

mod about;
mod cancel;
mod controller;
mod error;
mod launch_config;
mod probe;
mod supervisor;

#[cfg(test)]
mod tests;

pub use about::AboutInfo;
pub use cancel::{CancelGuard, CancelSignal};
pub use controller::{LauncherController, LauncherEvent, LauncherState, LauncherStatus, Progress};
pub use error::{
    ControllerError, ControllerResult, ProbeError, ProbeErrorResult,
    SupervisorError, SupervisorResult,
};
pub use launch_config::{CommandSet, LaunchConfig, OutputMode};
pub use probe::{HttpProbeTarget, ProbeResult, ProbeStream, ProbeTarget, ReadinessProbe};
pub use supervisor::{
    ProcessExit, ProcessSupervisor, ServerProcessHandle, StepKind, StopOutcome, SupervisorEvent,
    process_exists,
};

pub use dl_config::LaunchMode;

/// Lines of server stderr kept for error reports
pub const STDERR_TAIL_LINES: usize = 20;

/// Buffered launcher events before slow subscribers start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

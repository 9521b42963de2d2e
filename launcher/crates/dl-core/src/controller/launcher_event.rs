use crate::{LaunchMode, LauncherStatus};

use serde::Serialize;

/// Everything a presentation shell needs to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LauncherEvent {
    StateChanged {
        status: LauncherStatus,
    },
    Started {
        pid: u32,
        mode: LaunchMode,
    },
    ProbeAttempt {
        attempt: u32,
        ready: bool,
    },
    /// Emitted once per launch; the shell should display `url`
    Ready {
        url: String,
    },
    /// Shell should reload the displayed page
    Reload {
        url: String,
    },
    ProcessExited {
        pid: u32,
        code: Option<i32>,
        expected: bool,
    },
}

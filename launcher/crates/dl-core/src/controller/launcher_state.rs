use std::fmt;

use serde::Serialize;

/// Lifecycle of one launcher session.
///
/// `Stopped` is terminal; `Error` can be left by launching again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherState {
    Idle,
    InstallingDependencies,
    Starting,
    ProbingReadiness,
    Ready,
    Error,
    Stopped,
}

impl LauncherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LauncherState::Idle => "idle",
            LauncherState::InstallingDependencies => "installing_dependencies",
            LauncherState::Starting => "starting",
            LauncherState::ProbingReadiness => "probing_readiness",
            LauncherState::Ready => "ready",
            LauncherState::Error => "error",
            LauncherState::Stopped => "stopped",
        }
    }

    /// A launch is accepted from here.
    pub fn can_launch(&self) -> bool {
        matches!(self, LauncherState::Idle | LauncherState::Error)
    }

    /// A launch is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LauncherState::InstallingDependencies
                | LauncherState::Starting
                | LauncherState::ProbingReadiness
        )
    }
}

impl fmt::Display for LauncherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

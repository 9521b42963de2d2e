use crate::{LaunchMode, LauncherState};

use serde::Serialize;

/// Progress indicator shown next to the status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Idle,
    Indeterminate,
    Complete,
}

/// Snapshot published on every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherStatus {
    pub state: LauncherState,
    pub status_text: String,
    pub progress: Progress,
    pub error: Option<String>,
    pub recovery_hint: Option<String>,
    pub ready_url: Option<String>,
    pub pid: Option<u32>,
    pub mode: LaunchMode,
}

/// Why the last launch ended in `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub message: String,
    pub hint: String,
}

impl Failure {
    pub(crate) fn new(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: hint.into(),
        }
    }
}

pub(crate) fn build_launcher_status(
    state: LauncherState,
    failure: Option<&Failure>,
    ready_url: Option<&str>,
    pid: Option<u32>,
    mode: LaunchMode,
) -> LauncherStatus {
    let (status_text, progress) = match state {
        LauncherState::Idle => (String::from("Waiting to launch"), Progress::Idle),
        LauncherState::InstallingDependencies => (
            String::from("Installing dependencies... This may take a few minutes."),
            Progress::Indeterminate,
        ),
        LauncherState::Starting => (String::from("Starting server..."), Progress::Indeterminate),
        LauncherState::ProbingReadiness => (
            String::from("Server started, loading dashboard..."),
            Progress::Indeterminate,
        ),
        LauncherState::Ready => (
            String::from("Dashboard loaded successfully"),
            Progress::Complete,
        ),
        LauncherState::Error => (
            format!(
                "Error starting server: {}",
                failure.map_or("unknown error", |f| f.message.as_str())
            ),
            Progress::Idle,
        ),
        LauncherState::Stopped => (String::from("Stopped"), Progress::Idle),
    };

    let (error, recovery_hint) = match (state, failure) {
        (LauncherState::Error, Some(failure)) => {
            (Some(failure.message.clone()), Some(failure.hint.clone()))
        }
        _ => (None, None),
    };

    LauncherStatus {
        state,
        status_text,
        progress,
        error,
        recovery_hint,
        ready_url: ready_url
            .filter(|_| state == LauncherState::Ready)
            .map(String::from),
        pid,
        mode,
    }
}

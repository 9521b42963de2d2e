use crate::StepKind;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Dependency install failed with exit code {code:?}: {stderr} {location}")]
    DependencyInstallFailed {
        code: Option<i32>,
        stderr: String,
        location: ErrorLocation,
    },

    #[error("Production build failed with exit code {code:?}: {stderr} {location}")]
    BuildFailed {
        code: Option<i32>,
        stderr: String,
        location: ErrorLocation,
    },

    #[error("Failed to spawn '{program}': {source} {location}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("{step} cancelled before completion {location}")]
    StepCancelled {
        step: StepKind,
        location: ErrorLocation,
    },

    #[error("Server process {pid} is still running {location}")]
    AlreadyRunning { pid: u32, location: ErrorLocation },

    #[error("Failed to signal process {pid}: {message} {location}")]
    Signal {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn step_failed(step: StepKind, code: Option<i32>, stderr: impl Into<String>) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let stderr = stderr.into();
        match step {
            StepKind::Install => Self::DependencyInstallFailed {
                code,
                stderr,
                location,
            },
            StepKind::Build => Self::BuildFailed {
                code,
                stderr,
                location,
            },
        }
    }

    #[track_caller]
    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn step_cancelled(step: StepKind) -> Self {
        Self::StepCancelled {
            step,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signal(pid: u32, message: impl Into<String>) -> Self {
        Self::Signal {
            pid,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::StepCancelled { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::DependencyInstallFailed { .. } => {
                "Installing dependencies failed. \
                   Check network access and the install command output in the logs."
            }
            Self::BuildFailed { .. } => {
                "The production build failed. \
                   Run the build command manually in the project directory to see the errors."
            }
            Self::SpawnFailed { .. } => {
                "The server command could not be started. \
                   Check that it is installed and on PATH, and that the project directory exists."
            }
            Self::AlreadyRunning { .. } => {
                "A server process is already running. Stop it before launching again."
            }
            Self::Signal { .. } => {
                "The server process could not be stopped. \
                   It may need to be terminated manually."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for SupervisorError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type SupervisorResult<T> = std::result::Result<T, SupervisorError>;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid probe URL '{url}': {message} {location}")]
    Config {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to build HTTP client: {source} {location}")]
    Client {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },
}

impl ProbeError {
    #[track_caller]
    pub fn config(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            url: url.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config { .. } => {
                "The probe URL is invalid. \
                   Set launch.probe_url to a plain http:// address."
            }
            Self::Client { .. } => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Client {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ProbeErrorResult<T> = std::result::Result<T, ProbeError>;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Launcher controller is no longer running {location}")]
    ControllerGone { location: ErrorLocation },
}

impl ControllerError {
    #[track_caller]
    pub fn gone() -> Self {
        Self::ControllerGone {
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

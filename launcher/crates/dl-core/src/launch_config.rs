use dl_config::{ConfigErrorResult, LaunchMode, LauncherConfig};

use std::path::PathBuf;
use std::time::Duration;

/// What happens to the server's stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Forward lines to the log and keep a stderr tail for error reports
    #[default]
    Capture,
    /// Send server output to the null device
    Discard,
}

/// Argument vectors for every external command the supervisor runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    pub install: Vec<String>,
    pub build: Vec<String>,
    pub dev: Vec<String>,
    pub start: Vec<String>,
    /// Relative to the project directory
    pub dependency_marker: PathBuf,
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            install: argv(&["npm", "install"]),
            build: argv(&["npm", "run", "build"]),
            dev: argv(&["npm", "run", "dev"]),
            start: argv(&["npm", "run", "start"]),
            dependency_marker: PathBuf::from("node_modules"),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Resolved launch parameters handed to the controller and supervisor.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub project_directory: PathBuf,
    pub mode: LaunchMode,
    pub probe_url: String,
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
    pub graceful_stop_timeout: Duration,
    pub commands: CommandSet,
    pub output: OutputMode,
}

impl LaunchConfig {
    /// Defaults for a dev-mode npm project in `project_directory`.
    pub fn new(project_directory: impl Into<PathBuf>) -> Self {
        Self {
            project_directory: project_directory.into(),
            mode: LaunchMode::Dev,
            probe_url: String::from("http://localhost:3000"),
            probe_interval: Duration::from_millis(1000),
            probe_timeout: Duration::from_millis(1000),
            graceful_stop_timeout: Duration::from_millis(5000),
            commands: CommandSet::default(),
            output: OutputMode::Capture,
        }
    }

    /// Resolve a validated `LauncherConfig`.
    pub fn from_config(config: &LauncherConfig, output: OutputMode) -> ConfigErrorResult<Self> {
        let launch = &config.launch;
        let commands = &config.commands;

        Ok(Self {
            project_directory: launch.project_path()?,
            mode: launch.mode,
            probe_url: launch.probe_url.trim().to_string(),
            probe_interval: Duration::from_millis(launch.probe_interval_ms),
            probe_timeout: Duration::from_millis(launch.probe_timeout_ms),
            graceful_stop_timeout: Duration::from_millis(launch.graceful_stop_timeout_ms),
            commands: CommandSet {
                install: commands.install_argv(),
                build: commands.build_argv(),
                dev: commands.dev_argv(),
                start: commands.start_argv(),
                dependency_marker: PathBuf::from(&commands.dependency_marker),
            },
            output,
        })
    }

    pub fn dependency_marker_path(&self) -> PathBuf {
        self.project_directory.join(&self.commands.dependency_marker)
    }

    /// Long-running server command for the configured mode.
    pub fn server_argv(&self) -> &[String] {
        match self.mode {
            LaunchMode::Dev => &self.commands.dev,
            LaunchMode::Production => &self.commands.start,
        }
    }
}

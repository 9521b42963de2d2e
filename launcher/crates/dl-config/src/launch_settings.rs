use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_GRACEFUL_STOP_TIMEOUT_MS, DEFAULT_PROBE_INTERVAL_MS,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PROBE_URL, DEFAULT_PROJECT_DIRECTORY, LaunchMode,
    MAX_GRACEFUL_STOP_TIMEOUT_MS, MAX_PROBE_MS, MIN_PROBE_MS,
};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Server project directory (relative paths resolve against cwd)
    pub project_directory: String,
    pub mode: LaunchMode,
    /// Address polled until the server answers
    pub probe_url: String,
    pub probe_interval_ms: u64,
    /// Per-attempt socket timeout
    pub probe_timeout_ms: u64,
    /// Grace period between SIGTERM and SIGKILL
    pub graceful_stop_timeout_ms: u64,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            project_directory: String::from(DEFAULT_PROJECT_DIRECTORY),
            mode: LaunchMode::default(),
            probe_url: String::from(DEFAULT_PROBE_URL),
            probe_interval_ms: DEFAULT_PROBE_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            graceful_stop_timeout_ms: DEFAULT_GRACEFUL_STOP_TIMEOUT_MS,
        }
    }
}

impl LaunchSettings {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_PROBE_MS..=MAX_PROBE_MS).contains(&self.probe_interval_ms) {
            return Err(ConfigError::launch(format!(
                "launch.probe_interval_ms must be {}-{}, got {}",
                MIN_PROBE_MS, MAX_PROBE_MS, self.probe_interval_ms
            )));
        }

        if !(MIN_PROBE_MS..=MAX_PROBE_MS).contains(&self.probe_timeout_ms) {
            return Err(ConfigError::launch(format!(
                "launch.probe_timeout_ms must be {}-{}, got {}",
                MIN_PROBE_MS, MAX_PROBE_MS, self.probe_timeout_ms
            )));
        }

        if self.graceful_stop_timeout_ms > MAX_GRACEFUL_STOP_TIMEOUT_MS {
            return Err(ConfigError::launch(format!(
                "launch.graceful_stop_timeout_ms must be <= {}, got {}",
                MAX_GRACEFUL_STOP_TIMEOUT_MS, self.graceful_stop_timeout_ms
            )));
        }

        let url = self.probe_url.trim();
        // Plain HTTP only: the probe client is built without a TLS backend
        let rest = url.strip_prefix("http://").ok_or_else(|| {
            ConfigError::launch(format!(
                "launch.probe_url must be a plain http:// address, got '{}'",
                self.probe_url
            ))
        })?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(ConfigError::launch(format!(
                "launch.probe_url has no host: '{}'",
                self.probe_url
            )));
        }

        let project_dir = self.project_path()?;
        if !project_dir.is_dir() {
            return Err(ConfigError::launch(format!(
                "launch.project_directory is not a directory: {}",
                project_dir.display()
            )));
        }

        Ok(())
    }

    /// Absolute project directory.
    pub fn project_path(&self) -> ConfigErrorResult<PathBuf> {
        let path = PathBuf::from(&self.project_directory);
        if path.is_absolute() {
            return Ok(path);
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(path))
    }
}

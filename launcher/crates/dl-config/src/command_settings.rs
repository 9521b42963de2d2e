use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_BUILD_COMMAND, DEFAULT_DEPENDENCY_MARKER,
    DEFAULT_DEV_COMMAND, DEFAULT_INSTALL_COMMAND, DEFAULT_START_COMMAND,
};

use std::path::{Component, Path};

use serde::Deserialize;

/// External commands the supervisor runs inside the project directory.
///
/// Each command is a whitespace-separated argv string, e.g. `"npm run dev"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub install: String,
    pub build: String,
    pub dev: String,
    pub start: String,
    /// Directory whose presence means dependencies are installed
    pub dependency_marker: String,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            install: String::from(DEFAULT_INSTALL_COMMAND),
            build: String::from(DEFAULT_BUILD_COMMAND),
            dev: String::from(DEFAULT_DEV_COMMAND),
            start: String::from(DEFAULT_START_COMMAND),
            dependency_marker: String::from(DEFAULT_DEPENDENCY_MARKER),
        }
    }
}

impl CommandSettings {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, value) in [
            ("install", &self.install),
            ("build", &self.build),
            ("dev", &self.dev),
            ("start", &self.start),
        ] {
            if Self::split(value).is_empty() {
                return Err(ConfigError::command(format!(
                    "commands.{name} must not be empty"
                )));
            }
        }

        let marker = Path::new(&self.dependency_marker);
        if self.dependency_marker.trim().is_empty()
            || marker.is_absolute()
            || marker
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ConfigError::command(format!(
                "commands.dependency_marker must be a relative path without '..', got '{}'",
                self.dependency_marker
            )));
        }

        Ok(())
    }

    pub fn install_argv(&self) -> Vec<String> {
        Self::split(&self.install)
    }

    pub fn build_argv(&self) -> Vec<String> {
        Self::split(&self.build)
    }

    pub fn dev_argv(&self) -> Vec<String> {
        Self::split(&self.dev)
    }

    pub fn start_argv(&self) -> Vec<String> {
        Self::split(&self.start)
    }

    fn split(command: &str) -> Vec<String> {
        command.split_whitespace().map(String::from).collect()
    }
}

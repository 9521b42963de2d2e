use crate::{LaunchConfig, LaunchMode};

use serde::Serialize;

/// Static facts shown by the settings view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutInfo {
    pub name: String,
    pub version: String,
    pub server_url: String,
    pub mode: LaunchMode,
    pub project_directory: String,
    pub server_command: String,
}

impl AboutInfo {
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            name: String::from("Dashboard Launcher"),
            version: String::from(env!("CARGO_PKG_VERSION")),
            server_url: config.probe_url.clone(),
            mode: config.mode,
            project_directory: config.project_directory.display().to_string(),
            server_command: config.server_argv().join(" "),
        }
    }

    /// Human-readable lines, one fact each.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{} v{}", self.name, self.version),
            format!("Server: {}", self.server_url),
            format!("Mode: {}", self.mode),
            format!("Project: {}", self.project_directory),
            format!("Command: {}", self.server_command),
        ]
    }
}

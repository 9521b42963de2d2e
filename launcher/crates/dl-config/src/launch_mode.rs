use crate::ConfigError;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which server command variant the launcher runs.
///
/// `Dev` runs the dev command directly. `Production` runs the build
/// command to completion and then the start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    #[default]
    Dev,
    Production,
}

impl LaunchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Dev => "dev",
            LaunchMode::Production => "production",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(LaunchMode::Dev),
            "production" | "prod" => Ok(LaunchMode::Production),
            other => Err(ConfigError::launch(format!(
                "launch.mode must be 'dev' or 'production', got '{other}'"
            ))),
        }
    }
}

mod command_settings;
mod config;
mod error;
mod launch_mode;
mod launch_settings;
mod log_level;
mod logging_config;

#[cfg(test)]
mod tests;

pub use command_settings::CommandSettings;
pub use config::LauncherConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use launch_mode::LaunchMode;
pub use launch_settings::LaunchSettings;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;

pub const CONFIG_DIR_ENV: &str = "DL_CONFIG_DIR";
pub const CONFIG_FILENAME: &str = "launcher.toml";
const DEFAULT_CONFIG_DIR: &str = ".launcher";

const DEFAULT_PROJECT_DIRECTORY: &str = ".";
const DEFAULT_PROBE_URL: &str = "http://localhost:3000";
const DEFAULT_PROBE_INTERVAL_MS: u64 = 1000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;
const DEFAULT_GRACEFUL_STOP_TIMEOUT_MS: u64 = 5000;

const MIN_PROBE_MS: u64 = 10;
const MAX_PROBE_MS: u64 = 60_000;
const MAX_GRACEFUL_STOP_TIMEOUT_MS: u64 = 300_000;

const DEFAULT_INSTALL_COMMAND: &str = "npm install";
const DEFAULT_BUILD_COMMAND: &str = "npm run build";
const DEFAULT_DEV_COMMAND: &str = "npm run dev";
const DEFAULT_START_COMMAND: &str = "npm run start";
const DEFAULT_DEPENDENCY_MARKER: &str = "node_modules";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
const DEFAULT_LOG_COLORED: bool = true;

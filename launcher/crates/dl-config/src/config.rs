use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, CommandSettings, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, LaunchSettings, LoggingConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LauncherConfig {
    pub launch: LaunchSettings,
    pub commands: CommandSettings,
    pub logging: LoggingConfig,
}

impl LauncherConfig {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for DL_CONFIG_DIR env var, else use ./.launcher/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load launcher.toml if it exists, else use defaults
    /// 4. Apply DL_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            LauncherConfig::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: DL_CONFIG_DIR env var > ./.launcher/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.launch.validate()?;
        self.commands.validate()?;

        if let Some(ref file) = self.logging.file
            && (file.trim().is_empty() || file.contains(['/', '\\']))
        {
            return Err(ConfigError::logging(format!(
                "logging.file must be a plain file name, got '{file}'"
            )));
        }

        Ok(())
    }

    /// Absolute path of the log directory, if file logging is enabled.
    pub fn log_dir(&self) -> ConfigErrorResult<Option<PathBuf>> {
        if self.logging.file.is_none() {
            return Ok(None);
        }
        Ok(Some(Self::config_dir()?.join(&self.logging.dir)))
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  launch: dir={}, mode={}",
            self.launch.project_directory, self.launch.mode
        );
        info!(
            "  probe: url={}, interval={}ms, timeout={}ms",
            self.launch.probe_url, self.launch.probe_interval_ms, self.launch.probe_timeout_ms
        );
        info!(
            "  stop: graceful_timeout={}ms",
            self.launch.graceful_stop_timeout_ms
        );
        info!(
            "  commands: install='{}', build='{}', dev='{}', start='{}', marker={}",
            self.commands.install,
            self.commands.build,
            self.commands.dev,
            self.commands.start,
            self.commands.dependency_marker
        );
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("none")
        );
    }

    fn apply_env_overrides(&mut self) {
        // Launch
        Self::apply_env_string("DL_PROJECT_DIR", &mut self.launch.project_directory);
        Self::apply_env_parse("DL_MODE", &mut self.launch.mode);
        Self::apply_env_string("DL_PROBE_URL", &mut self.launch.probe_url);
        Self::apply_env_parse("DL_PROBE_INTERVAL_MS", &mut self.launch.probe_interval_ms);
        Self::apply_env_parse("DL_PROBE_TIMEOUT_MS", &mut self.launch.probe_timeout_ms);
        Self::apply_env_parse(
            "DL_GRACEFUL_STOP_TIMEOUT_MS",
            &mut self.launch.graceful_stop_timeout_ms,
        );

        // Commands
        Self::apply_env_string("DL_INSTALL_COMMAND", &mut self.commands.install);
        Self::apply_env_string("DL_BUILD_COMMAND", &mut self.commands.build);
        Self::apply_env_string("DL_DEV_COMMAND", &mut self.commands.dev);
        Self::apply_env_string("DL_START_COMMAND", &mut self.commands.start);
        Self::apply_env_string(
            "DL_DEPENDENCY_MARKER",
            &mut self.commands.dependency_marker,
        );

        // Logging
        Self::apply_env_parse("DL_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("DL_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("DL_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}

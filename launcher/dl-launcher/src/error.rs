use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Config error: {0}")]
    Config(#[from] dl_config::ConfigError),

    #[error("Controller error: {0}")]
    Controller(#[from] dl_core::ControllerError),

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LauncherError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

use dl_config::{LaunchMode, LauncherConfig, LogLevel};

use std::path::PathBuf;

use clap::{Args, Parser};

/// Flags shared by both launchers. Each one overrides launcher.toml and DL_* variables.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Server project directory
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Address polled until the server answers
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Print one JSON event per line instead of text
    #[arg(long)]
    pub json: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "dashboard-launcher")]
#[command(about = "Install, start and supervise the dashboard server")]
#[command(version)]
pub struct DashboardCli {
    /// Build and run the production server instead of the dev server
    #[arg(long)]
    pub production: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "kiosk-launcher")]
#[command(about = "Start the dashboard server for an unattended kiosk display")]
#[command(version)]
pub struct KioskCli {
    /// Ask the display for full-screen presentation
    #[arg(long)]
    pub fullscreen: bool,

    /// Build and run the production server instead of the dev server
    #[arg(long)]
    pub production: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parsed flags of either launcher.
#[derive(Debug, Clone, Default)]
pub struct LaunchArgs {
    pub production: bool,
    pub fullscreen: bool,
    pub common: CommonArgs,
}

impl DashboardCli {
    pub fn into_args(self) -> LaunchArgs {
        LaunchArgs {
            production: self.production,
            fullscreen: false,
            common: self.common,
        }
    }
}

impl KioskCli {
    pub fn into_args(self) -> LaunchArgs {
        LaunchArgs {
            production: self.production,
            fullscreen: self.fullscreen,
            common: self.common,
        }
    }
}

impl LaunchArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut LauncherConfig) {
        if self.production {
            config.launch.mode = LaunchMode::Production;
        }
        if let Some(ref dir) = self.common.project_dir {
            config.launch.project_directory = dir.display().to_string();
        }
        if let Some(ref url) = self.common.url {
            config.launch.probe_url = url.clone();
        }
        if let Some(ref level) = self.common.log_level {
            config.logging.level = LogLevel::parse_lenient(level);
        }
    }
}

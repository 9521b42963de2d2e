//! Terminal shells for the dashboard and kiosk launchers.

mod cli;
mod error;
mod input;
mod logging;
mod render;
mod run;
mod shell;
mod shell_command;
mod signals;
mod variant;


pub use cli::{CommonArgs, DashboardCli, KioskCli, LaunchArgs};
pub use error::{LauncherError, Result as LauncherResult};
pub use logging::setup_logging;
pub use render::{help_lines, render_event};
pub use run::run;
pub use shell::{ShellInput, ShellOptions, ShellOutcome, TerminalShell};
pub use shell_command::{ShellCommand, parse_command};
pub use variant::Variant;

use crate::input::spawn_stdin_reader;
use crate::signals::spawn_signal_listener;
use crate::{
    LaunchArgs, LauncherResult, ShellOptions, ShellOutcome, TerminalShell, Variant, setup_logging,
};

use dl_config::LauncherConfig;
use dl_core::{LaunchConfig, LauncherController};

use std::io::IsTerminal;
use std::process::ExitCode;

use tokio::sync::mpsc;
use tracing::{error, info};

const INPUT_CHANNEL_CAPACITY: usize = 16;

/// Entry point shared by both launcher binaries.
pub async fn run(variant: Variant, args: LaunchArgs) -> ExitCode {
    match run_launcher(variant, args).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_launcher(variant: Variant, args: LaunchArgs) -> LauncherResult<ShellOutcome> {
    // 1. Load configuration, then command-line overrides
    let mut config = LauncherConfig::load()?;
    args.apply(&mut config);
    config.validate()?;

    // 2. Initialize logging
    setup_logging(&config)?;

    info!(
        "Starting {} v{}",
        variant.binary_name(),
        env!("CARGO_PKG_VERSION")
    );
    config.log_summary();
    if variant == Variant::Kiosk {
        info!("  display: fullscreen={}", args.fullscreen);
    }

    // 3. Controller
    let launch_config = LaunchConfig::from_config(&config, variant.output_mode())?;
    let controller = LauncherController::spawn(launch_config);

    // 4. Input sources
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    spawn_signal_listener(input_tx.clone());
    spawn_stdin_reader(input_tx);

    let options = ShellOptions {
        variant,
        fullscreen: args.fullscreen,
        json: args.common.json,
        interactive: std::io::stdin().is_terminal(),
    };

    let outcome = TerminalShell::new(controller, options).run(input_rx).await?;
    info!("{} exiting ({:?})", variant.binary_name(), outcome);
    Ok(outcome)
}

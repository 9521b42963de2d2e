use crate::ShellInput;

use tokio::sync::mpsc;
use tracing::{error, info};

/// Turn SIGINT/SIGTERM (Ctrl+C elsewhere) into shell input.
pub(crate) fn spawn_signal_listener(input_tx: mpsc::Sender<ShellInput>) {
    #[cfg(unix)]
    {
        std::thread::spawn(move || {
            use signal_hook::consts::{SIGINT, SIGTERM};
            use signal_hook::iterator::Signals;

            let mut signals = match Signals::new([SIGINT, SIGTERM]) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to register signal handlers: {e}");
                    return;
                }
            };

            for sig in signals.forever() {
                info!("Received signal {sig}, stopping launcher");
                if input_tx.blocking_send(ShellInput::Signal(sig)).is_err() {
                    return;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            loop {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C, stopping launcher");
                        if input_tx.send(ShellInput::Signal(2)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Failed to listen for Ctrl+C: {e}");
                        return;
                    }
                }
            }
        });
    }
}

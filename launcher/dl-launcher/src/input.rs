use crate::ShellInput;

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::debug;

/// Forward stdin lines to the shell.
///
/// Runs on a plain thread: a blocking stdin read inside the runtime would
/// hold up shutdown until the next Enter.
pub(crate) fn spawn_stdin_reader(input_tx: mpsc::Sender<ShellInput>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input_tx.blocking_send(ShellInput::Line(line)).is_err() {
                return;
            }
        }
        debug!("stdin closed");
    });
}

//! Server process supervision: dependency install, build, spawn and stop.

mod output;
mod process_handle;
mod signals;
mod step;
mod supervisor_event;

pub use process_handle::{ProcessExit, ServerProcessHandle, StopOutcome};
pub use signals::process_exists;
pub use step::StepKind;
pub use supervisor_event::SupervisorEvent;

use crate::supervisor::output::OutputCapture;
use crate::{CancelGuard, LaunchConfig, LaunchMode, OutputMode, SupervisorError, SupervisorResult};

use std::panic::Location;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use error_location::ErrorLocation;
use tokio::process::Child;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Owns at most one server process at a time.
pub struct ProcessSupervisor {
    events_tx: mpsc::Sender<SupervisorEvent>,
    current: Option<ServerProcessHandle>,
}

impl ProcessSupervisor {
    pub fn new(events_tx: mpsc::Sender<SupervisorEvent>) -> Self {
        Self {
            events_tx,
            current: None,
        }
    }

    /// True when the dependency marker is missing from the project directory.
    pub fn needs_install(config: &LaunchConfig) -> bool {
        !config.dependency_marker_path().exists()
    }

    pub async fn install_dependencies(
        config: &LaunchConfig,
        cancel: &mut CancelGuard,
    ) -> SupervisorResult<()> {
        step::run_step(StepKind::Install, &config.commands.install, config, cancel).await
    }

    pub async fn build(config: &LaunchConfig, cancel: &mut CancelGuard) -> SupervisorResult<()> {
        step::run_step(StepKind::Build, &config.commands.build, config, cancel).await
    }

    /// Install if needed, build in production mode, then spawn the server.
    pub async fn start(
        &mut self,
        config: &LaunchConfig,
        cancel: &mut CancelGuard,
    ) -> SupervisorResult<&ServerProcessHandle> {
        if Self::needs_install(config) {
            Self::install_dependencies(config, cancel).await?;
        } else {
            info!(
                "Dependencies present at {}, skipping install",
                config.dependency_marker_path().display()
            );
        }

        if config.mode == LaunchMode::Production {
            Self::build(config, cancel).await?;
        }

        self.spawn(config)
    }

    /// Spawn the long-running server command for the configured mode.
    pub fn spawn(&mut self, config: &LaunchConfig) -> SupervisorResult<&ServerProcessHandle> {
        if let Some(current) = &self.current {
            if current.is_running() {
                return Err(SupervisorError::AlreadyRunning {
                    pid: current.pid(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            // Leftovers of a server that exited on its own
            if let Err(e) = signals::kill_group(current.pid()) {
                warn!("Failed to clear process group {}: {e}", current.pid());
            }
            self.current = None;
        }

        let argv = config.server_argv();
        let mut cmd = step::group_command(argv, &config.project_directory)?;
        match config.output {
            OutputMode::Capture => cmd.stdout(Stdio::piped()).stderr(Stdio::piped()),
            OutputMode::Discard => cmd.stdout(Stdio::null()).stderr(Stdio::null()),
        };
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| SupervisorError::spawn_failed(&argv[0], e))?;
        let pid = child.id().ok_or_else(|| {
            SupervisorError::spawn_failed(
                &argv[0],
                std::io::Error::other("process exited before its pid was read"),
            )
        })?;

        info!(
            "Spawned server pid {pid} ({} mode): '{}'",
            config.mode,
            argv.join(" ")
        );

        let output = match config.output {
            OutputMode::Capture => Some(OutputCapture::attach(&mut child, "server", true)),
            OutputMode::Discard => None,
        };

        if let Err(e) = self.events_tx.try_send(SupervisorEvent::Started {
            pid,
            mode: config.mode,
        }) {
            warn!("Failed to publish start of pid {pid}: {e}");
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        let stop_requested = Arc::new(AtomicBool::new(false));
        spawn_watcher(
            child,
            pid,
            output,
            stop_requested.clone(),
            exit_tx,
            self.events_tx.clone(),
        );

        let handle = self.current.insert(ServerProcessHandle::new(
            pid,
            config.mode,
            exit_rx,
            stop_requested,
        ));
        Ok(&*handle)
    }

    /// Stop the current server, if any. Idempotent.
    ///
    /// A server that already exited on its own still has its process group
    /// cleared before the handle is dropped.
    pub async fn stop(&mut self, grace: Duration) -> SupervisorResult<StopOutcome> {
        let Some(current) = self.current.as_mut() else {
            return Ok(StopOutcome::AlreadyStopped);
        };

        let outcome = current.stop(grace).await?;
        self.current = None;
        Ok(outcome)
    }

    pub fn current(&self) -> Option<&ServerProcessHandle> {
        self.current.as_ref()
    }
}

/// Reap the child, then publish its exit on the handle and the event channel.
fn spawn_watcher(
    mut child: Child,
    pid: u32,
    mut output: Option<OutputCapture>,
    stop_requested: Arc<AtomicBool>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
    events_tx: mpsc::Sender<SupervisorEvent>,
) {
    tokio::spawn(async move {
        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                warn!("Failed to wait for server pid {pid}: {e}");
                None
            }
        };

        if let Some(ref mut output) = output {
            output.drain().await;
        }

        let exit = ProcessExit {
            code,
            expected: stop_requested.load(Ordering::SeqCst),
            stderr_tail: output.map(|o| o.stderr_tail()).unwrap_or_default(),
        };

        if exit.expected {
            info!("Server pid {pid} exited with code {code:?}");
        } else {
            warn!("Server pid {pid} exited unexpectedly with code {code:?}");
        }

        exit_tx.send_replace(Some(exit.clone()));
        let _ = events_tx
            .send(SupervisorEvent::ProcessExited { pid, exit })
            .await;
    });
}

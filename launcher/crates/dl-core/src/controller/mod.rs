//! Launch state machine and the handle shells use to drive it.

mod actor;
mod controller_command;
mod launcher_event;
mod launcher_state;
mod launcher_status;

pub use launcher_event::LauncherEvent;
pub use launcher_state::LauncherState;
pub use launcher_status::{LauncherStatus, Progress};

pub(crate) use launcher_status::{Failure, build_launcher_status};

use crate::controller::actor::ControllerActor;
use crate::controller::controller_command::ControllerCommand;
use crate::{AboutInfo, ControllerError, ControllerResult, EVENT_CHANNEL_CAPACITY, LaunchConfig};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::info;

/// Cloneable handle to a running launcher.
///
/// Commands are queued to a single actor task, so every transition happens
/// in order on one task. The actor stops the server and exits once the last
/// handle is dropped.
#[derive(Clone)]
pub struct LauncherController {
    command_tx: mpsc::Sender<ControllerCommand>,
    status_rx: watch::Receiver<LauncherStatus>,
    events_tx: broadcast::Sender<LauncherEvent>,
    about: AboutInfo,
}

impl LauncherController {
    /// Start the controller task in `Idle`. Must be called inside a tokio runtime.
    pub fn spawn(config: LaunchConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(ControllerActor::initial_status(config.mode));
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let about = AboutInfo::from_config(&config);

        info!(
            "Launcher controller for {} ({} mode)",
            config.project_directory.display(),
            config.mode
        );

        let actor = ControllerActor::new(config, command_rx, status_tx, events_tx.clone());
        tokio::spawn(actor.run());

        Self {
            command_tx,
            status_rx,
            events_tx,
            about,
        }
    }

    /// Begin a launch. Ignored unless `Idle` or `Error`.
    pub async fn launch(&self) -> ControllerResult<()> {
        self.send(ControllerCommand::Launch).await
    }

    /// Ask the shell to reload the page. Only acts in `Ready`.
    pub async fn refresh(&self) -> ControllerResult<()> {
        self.send(ControllerCommand::Refresh).await
    }

    /// Stop everything and wait for the final state.
    ///
    /// Safe from any state, including repeated calls.
    pub async fn stop_requested(&self) -> ControllerResult<LauncherState> {
        let (done_tx, done_rx) = oneshot::channel();

        if self
            .command_tx
            .send(ControllerCommand::Stop { done: done_tx })
            .await
            .is_err()
        {
            return self.state_if_stopped();
        }

        match done_rx.await {
            Ok(state) => Ok(state),
            Err(_) => self.state_if_stopped(),
        }
    }

    pub fn status(&self) -> LauncherStatus {
        self.status_rx.borrow().clone()
    }

    pub fn state(&self) -> LauncherState {
        self.status_rx.borrow().state
    }

    /// Events from now on. Subscribe before `launch()` to see every transition.
    pub fn subscribe(&self) -> broadcast::Receiver<LauncherEvent> {
        self.events_tx.subscribe()
    }

    /// Latest-value view of the status.
    pub fn watch_status(&self) -> watch::Receiver<LauncherStatus> {
        self.status_rx.clone()
    }

    pub fn about(&self) -> &AboutInfo {
        &self.about
    }

    async fn send(&self, command: ControllerCommand) -> ControllerResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ControllerError::gone())
    }

    fn state_if_stopped(&self) -> ControllerResult<LauncherState> {
        match self.state() {
            LauncherState::Stopped => Ok(LauncherState::Stopped),
            _ => Err(ControllerError::gone()),
        }
    }
}

use crate::LauncherState;

use tokio::sync::oneshot;

/// Requests from `LauncherController` handles to the actor.
#[derive(Debug)]
pub(crate) enum ControllerCommand {
    Launch,
    Refresh,
    /// Acknowledged with the final state once everything is stopped
    Stop { done: oneshot::Sender<LauncherState> },
}

use crate::supervisor::signals;
use crate::{LaunchMode, SupervisorResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

const GROUP_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Upper bound on waiting for SIGKILLed group members to be reaped by init
const GROUP_REAP_TIMEOUT: Duration = Duration::from_secs(1);

/// How a server process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessExit {
    /// None when terminated by a signal
    pub code: Option<i32>,
    /// True when the exit followed a stop request
    pub expected: bool,
    /// Last stderr lines, empty when output was discarded
    pub stderr_tail: String,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// Exited within the grace period
    Graceful,
    /// Needed SIGKILL after the grace period
    Killed,
    /// Nothing to stop
    AlreadyStopped,
}

/// Handle to a running server process.
///
/// The child itself is owned by a watcher task that reaps it and publishes
/// the exit; the handle only observes and signals.
#[derive(Debug)]
pub struct ServerProcessHandle {
    pid: u32,
    mode: LaunchMode,
    started_at: DateTime<Utc>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
    stop_requested: Arc<AtomicBool>,
    stopped: bool,
}

impl ServerProcessHandle {
    pub(crate) fn new(
        pid: u32,
        mode: LaunchMode,
        exit_rx: watch::Receiver<Option<ProcessExit>>,
        stop_requested: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pid,
            mode,
            started_at: Utc::now(),
            exit_rx,
            stop_requested,
            stopped: false,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Exit details once the process has been reaped.
    pub fn exit(&self) -> Option<ProcessExit> {
        self.exit_rx.borrow().clone()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_rx.borrow().as_ref().and_then(|exit| exit.code)
    }

    pub fn is_running(&self) -> bool {
        self.exit_rx.borrow().is_none()
    }

    /// Stop the process group: SIGTERM, wait up to `grace`, then SIGKILL.
    ///
    /// The group is signalled even when the leader already exited on its own,
    /// so helpers it forked do not outlive it. Returns only once the leader
    /// has been reaped. Calling it again is a no-op that reports
    /// `AlreadyStopped`.
    pub async fn stop(&mut self, grace: Duration) -> SupervisorResult<StopOutcome> {
        if self.stopped {
            return Ok(StopOutcome::AlreadyStopped);
        }

        let leader_running = self.is_running();
        if !leader_running && !signals::group_exists(self.pid) {
            self.stopped = true;
            return Ok(StopOutcome::AlreadyStopped);
        }

        if leader_running {
            self.stop_requested.store(true, Ordering::SeqCst);
            info!("Sending termination to server pid {}", self.pid);
        } else {
            info!(
                "Server pid {} already exited, terminating the rest of its process group",
                self.pid
            );
        }
        signals::terminate_group(self.pid)?;

        if timeout(grace, self.wait_group_exit()).await.is_ok() {
            self.stopped = true;
            if leader_running {
                info!("Server pid {} exited gracefully", self.pid);
                return Ok(StopOutcome::Graceful);
            }
            return Ok(StopOutcome::AlreadyStopped);
        }

        warn!(
            "Server group {} still running after {}ms, force killing",
            self.pid,
            grace.as_millis()
        );
        signals::kill_group(self.pid)?;
        self.wait_exit().await;
        if timeout(GROUP_REAP_TIMEOUT, self.wait_group_gone())
            .await
            .is_err()
        {
            warn!("Process group {} still present after SIGKILL", self.pid);
        }
        self.stopped = true;

        Ok(StopOutcome::Killed)
    }

    async fn wait_group_exit(&self) {
        self.wait_exit().await;
        self.wait_group_gone().await;
    }

    async fn wait_exit(&self) {
        let mut exit_rx = self.exit_rx.clone();
        // A closed channel means the watcher is gone; nothing left to wait for
        let _ = exit_rx.wait_for(|exit| exit.is_some()).await;
    }

    async fn wait_group_gone(&self) {
        while signals::group_exists(self.pid) {
            sleep(GROUP_POLL_INTERVAL).await;
        }
    }
}

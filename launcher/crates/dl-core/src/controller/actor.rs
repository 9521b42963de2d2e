//! The state machine behind `LauncherController`.

use crate::controller::controller_command::ControllerCommand;
use crate::controller::{Failure, build_launcher_status};
use crate::{
    CancelSignal, LaunchConfig, LaunchMode, LauncherEvent, LauncherState, LauncherStatus,
    ProbeResult, ProbeStream, ProcessExit, ProcessSupervisor, ReadinessProbe, StepKind,
    SupervisorEvent,
};

use futures::StreamExt;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

pub(crate) struct ControllerActor {
    config: LaunchConfig,
    supervisor: ProcessSupervisor,
    supervisor_rx: mpsc::Receiver<SupervisorEvent>,
    command_rx: mpsc::Receiver<ControllerCommand>,
    status_tx: watch::Sender<LauncherStatus>,
    events_tx: broadcast::Sender<LauncherEvent>,
    state: LauncherState,
    failure: Option<Failure>,
    ready_url: Option<String>,
    pid: Option<u32>,
    probe: Option<ProbeStream>,
    probe_cancel: Option<CancelSignal>,
    pending_stops: Vec<oneshot::Sender<LauncherState>>,
    /// Every handle is gone; wind down without acknowledgements
    closing: bool,
}

impl ControllerActor {
    pub(crate) fn new(
        config: LaunchConfig,
        command_rx: mpsc::Receiver<ControllerCommand>,
        status_tx: watch::Sender<LauncherStatus>,
        events_tx: broadcast::Sender<LauncherEvent>,
    ) -> Self {
        let (supervisor_tx, supervisor_rx) = mpsc::channel(16);

        Self {
            config,
            supervisor: ProcessSupervisor::new(supervisor_tx),
            supervisor_rx,
            command_rx,
            status_tx,
            events_tx,
            state: LauncherState::Idle,
            failure: None,
            ready_url: None,
            pid: None,
            probe: None,
            probe_cancel: None,
            pending_stops: Vec::new(),
            closing: false,
        }
    }

    pub(crate) fn initial_status(mode: LaunchMode) -> LauncherStatus {
        build_launcher_status(LauncherState::Idle, None, None, None, mode)
    }

    pub(crate) async fn run(mut self) {
        debug!("Launcher controller running");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("All controller handles dropped, shutting down");
                        self.closing = true;
                        self.stop().await;
                        break;
                    }
                },
                Some(event) = self.supervisor_rx.recv() => {
                    self.handle_supervisor_event(event).await;
                }
                result = next_probe_result(&mut self.probe), if self.probe.is_some() => {
                    self.handle_probe_result(result);
                }
            }
        }

        debug!("Launcher controller stopped");
    }

    async fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Launch => self.launch().await,
            ControllerCommand::Refresh => self.refresh(),
            ControllerCommand::Stop { done } => {
                self.pending_stops.push(done);
                self.stop().await;
            }
        }
    }

    async fn launch(&mut self) {
        if !self.state.can_launch() {
            info!("Launch ignored while {}", self.state);
            return;
        }

        self.failure = None;
        self.ready_url = None;
        self.pid = None;

        if ProcessSupervisor::needs_install(&self.config) {
            self.transition(LauncherState::InstallingDependencies);
            if !self.run_step(StepKind::Install).await {
                return;
            }
        }

        self.transition(LauncherState::Starting);

        if self.config.mode == LaunchMode::Production && !self.run_step(StepKind::Build).await {
            return;
        }

        let spawned = self.supervisor.spawn(&self.config).map(|handle| handle.pid());
        match spawned {
            Ok(pid) => {
                self.pid = Some(pid);
                self.emit(LauncherEvent::Started {
                    pid,
                    mode: self.config.mode,
                });
                self.transition(LauncherState::ProbingReadiness);
                self.start_probe().await;
            }
            Err(e) => {
                error!("Failed to start server: {e}");
                self.fail(Failure::new(e.to_string(), e.recovery_hint()));
            }
        }
    }

    /// Run a preparation step while still answering stop requests.
    ///
    /// Returns true when the launch should continue.
    async fn run_step(&mut self, step: StepKind) -> bool {
        let cancel = CancelSignal::new();
        let mut guard = cancel.guard();
        let config = self.config.clone();

        let work = async move {
            match step {
                StepKind::Install => {
                    ProcessSupervisor::install_dependencies(&config, &mut guard).await
                }
                StepKind::Build => ProcessSupervisor::build(&config, &mut guard).await,
            }
        };
        tokio::pin!(work);

        let result = loop {
            tokio::select! {
                result = &mut work => break result,
                command = self.command_rx.recv(), if !self.closing => match command {
                    Some(ControllerCommand::Stop { done }) => {
                        info!("Stop requested during {step}");
                        self.pending_stops.push(done);
                        cancel.cancel();
                    }
                    Some(other) => debug!("{other:?} ignored during {step}"),
                    None => {
                        self.closing = true;
                        cancel.cancel();
                    }
                },
            }
        };

        if self.closing || !self.pending_stops.is_empty() {
            self.stop().await;
            return false;
        }

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                self.fail(Failure::new(e.to_string(), e.recovery_hint()));
                false
            }
        }
    }

    fn refresh(&mut self) {
        match (self.state, &self.ready_url) {
            (LauncherState::Ready, Some(url)) => {
                info!("Reloading {url}");
                self.emit(LauncherEvent::Reload { url: url.clone() });
            }
            _ => debug!("Refresh ignored while {}", self.state),
        }
    }

    /// Cancel probing, stop the server and settle in `Stopped`.
    async fn stop(&mut self) {
        if self.state != LauncherState::Stopped {
            info!("Stopping launcher from {}", self.state);
            self.cancel_probe().await;

            match self
                .supervisor
                .stop(self.config.graceful_stop_timeout)
                .await
            {
                Ok(outcome) => info!("Server stop outcome: {outcome:?}"),
                Err(e) => error!("Failed to stop server: {e}"),
            }

            self.pid = None;
            self.ready_url = None;
            self.transition(LauncherState::Stopped);
        }

        for done in self.pending_stops.drain(..) {
            let _ = done.send(self.state);
        }
    }

    async fn handle_supervisor_event(&mut self, event: SupervisorEvent) {
        match event {
            SupervisorEvent::Started { pid, mode } => {
                debug!("Supervisor started pid {pid} ({mode} mode)");
            }
            SupervisorEvent::ProcessExited { pid, exit } => {
                self.emit(LauncherEvent::ProcessExited {
                    pid,
                    code: exit.code,
                    expected: exit.expected,
                });

                if self.pid != Some(pid) {
                    debug!("Ignoring exit of untracked pid {pid}");
                    return;
                }

                self.pid = None;

                if !exit.expected && self.state != LauncherState::Stopped {
                    self.cancel_probe().await;
                    self.clear_exited_server().await;
                    self.fail(Failure::new(
                        unexpected_exit_message(&exit),
                        "The server stopped on its own. Check the server output in the logs, \
                         then launch again.",
                    ));
                }
            }
        }
    }

    /// Terminate whatever the exited server left running in its process group.
    async fn clear_exited_server(&mut self) {
        match self
            .supervisor
            .stop(self.config.graceful_stop_timeout)
            .await
        {
            Ok(outcome) => debug!("Cleared exited server: {outcome:?}"),
            Err(e) => warn!("Failed to clear exited server: {e}"),
        }
    }

    async fn start_probe(&mut self) {
        let cancel = CancelSignal::new();

        match ReadinessProbe::start(
            &self.config.probe_url,
            self.config.probe_interval,
            self.config.probe_timeout,
            cancel.guard(),
        ) {
            Ok(stream) => {
                self.probe = Some(stream);
                self.probe_cancel = Some(cancel);
            }
            Err(e) => {
                error!("Cannot probe readiness: {e}");
                if let Err(stop_error) = self
                    .supervisor
                    .stop(self.config.graceful_stop_timeout)
                    .await
                {
                    warn!("Failed to stop server after probe error: {stop_error}");
                }
                self.pid = None;
                self.fail(Failure::new(e.to_string(), e.recovery_hint()));
            }
        }
    }

    fn handle_probe_result(&mut self, result: Option<ProbeResult>) {
        let Some(result) = result else {
            self.probe = None;
            self.probe_cancel = None;
            return;
        };

        self.emit(LauncherEvent::ProbeAttempt {
            attempt: result.attempt(),
            ready: result.is_ready(),
        });

        if result.is_ready() && self.state == LauncherState::ProbingReadiness {
            self.probe = None;
            self.probe_cancel = None;

            let url = self.config.probe_url.clone();
            self.ready_url = Some(url.clone());
            self.transition(LauncherState::Ready);
            self.emit(LauncherEvent::Ready { url });
        }
    }

    /// Signal the probe and let an in-flight attempt finish.
    async fn cancel_probe(&mut self) {
        if let Some(cancel) = self.probe_cancel.take() {
            cancel.cancel();
        }
        if let Some(mut probe) = self.probe.take() {
            while let Some(result) = probe.next().await {
                debug!("Discarding probe result after cancel: {result:?}");
            }
        }
    }

    fn fail(&mut self, failure: Failure) {
        self.failure = Some(failure);
        self.transition(LauncherState::Error);
    }

    fn transition(&mut self, state: LauncherState) {
        if self.state == state {
            return;
        }

        info!("Launcher state: {} -> {}", self.state, state);
        self.state = state;

        let status = build_launcher_status(
            self.state,
            self.failure.as_ref(),
            self.ready_url.as_deref(),
            self.pid,
            self.config.mode,
        );
        self.status_tx.send_replace(status.clone());
        self.emit(LauncherEvent::StateChanged { status });
    }

    fn emit(&self, event: LauncherEvent) {
        // No subscribers is fine
        let _ = self.events_tx.send(event);
    }
}

async fn next_probe_result(probe: &mut Option<ProbeStream>) -> Option<ProbeResult> {
    match probe {
        Some(probe) => probe.next().await,
        None => std::future::pending().await,
    }
}

fn unexpected_exit_message(exit: &ProcessExit) -> String {
    let mut message = match exit.code {
        Some(code) => format!("Server exited unexpectedly with code {code}"),
        None => String::from("Server was terminated by a signal"),
    };
    if !exit.stderr_tail.is_empty() {
        message.push_str(": ");
        message.push_str(&exit.stderr_tail);
    }
    message
}

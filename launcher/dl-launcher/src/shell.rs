use crate::{LauncherResult, ShellCommand, Variant, help_lines, parse_command, render_event};

use dl_core::{LauncherController, LauncherEvent, LauncherState};

use std::process::ExitCode;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellOptions {
    pub variant: Variant,
    pub fullscreen: bool,
    pub json: bool,
    /// Someone is at the keyboard; errors wait for a retry instead of exiting
    pub interactive: bool,
}

/// What the shell reads besides launcher events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Line(String),
    Signal(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    /// Stopped on request
    Stopped,
    /// Launch failed with nobody around to retry
    Failed,
}

impl ShellOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellOutcome::Stopped => ExitCode::SUCCESS,
            ShellOutcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Terminal presentation of a launcher: prints events, reads commands.
pub struct TerminalShell {
    controller: LauncherController,
    options: ShellOptions,
}

impl TerminalShell {
    pub fn new(controller: LauncherController, options: ShellOptions) -> Self {
        Self {
            controller,
            options,
        }
    }

    /// Launch, then run until quit, a signal, or an unattended failure.
    pub async fn run(
        &self,
        mut input_rx: mpsc::Receiver<ShellInput>,
    ) -> LauncherResult<ShellOutcome> {
        let mut events = self.controller.subscribe();
        self.controller.launch().await?;

        let mut input_open = true;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        self.print_event(&event);
                        if !self.options.interactive && Self::is_failure(&event) {
                            info!("Launch failed and no one is attached, exiting");
                            self.stop(&mut events).await?;
                            return Ok(ShellOutcome::Failed);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Shell fell behind, skipped {skipped} launcher events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Launcher event channel closed");
                        return Ok(ShellOutcome::Stopped);
                    }
                },

                input = input_rx.recv(), if input_open => match input {
                    Some(ShellInput::Signal(_)) => {
                        self.stop(&mut events).await?;
                        return Ok(ShellOutcome::Stopped);
                    }
                    Some(ShellInput::Line(line)) => {
                        if self.handle_line(&line).await? {
                            self.stop(&mut events).await?;
                            return Ok(ShellOutcome::Stopped);
                        }
                    }
                    None => {
                        debug!("Shell input closed");
                        input_open = false;
                    }
                },
            }
        }
    }

    /// Returns true when the user asked to quit.
    async fn handle_line(&self, line: &str) -> LauncherResult<bool> {
        let Some(command) = parse_command(self.options.variant, line) else {
            if !line.trim().is_empty() && self.options.variant == Variant::Dashboard {
                println!("Unknown command '{}', type 'h' for help", line.trim());
            }
            return Ok(false);
        };

        match command {
            ShellCommand::Quit => return Ok(true),
            ShellCommand::Refresh => self.controller.refresh().await?,
            ShellCommand::Launch => {
                let state = self.controller.state();
                if state.can_launch() {
                    self.controller.launch().await?;
                } else if state.is_busy() {
                    println!("Launch already in progress ({state})");
                } else {
                    println!("Nothing to launch while {state}");
                }
            }
            ShellCommand::Settings => self.print_settings(),
            ShellCommand::Help => {
                for line in help_lines(self.options.variant) {
                    println!("{line}");
                }
            }
        }

        Ok(false)
    }

    async fn stop(&self, events: &mut broadcast::Receiver<LauncherEvent>) -> LauncherResult<()> {
        let state = self.controller.stop_requested().await?;
        info!("Launcher finished in state {state}");

        while let Ok(event) = events.try_recv() {
            self.print_event(&event);
        }
        Ok(())
    }

    fn print_event(&self, event: &LauncherEvent) {
        if let Some(text) = render_event(event, &self.options) {
            println!("{text}");
        }
    }

    fn print_settings(&self) {
        let about = self.controller.about();
        if self.options.json {
            if let Ok(json) = serde_json::to_string(about) {
                println!("{json}");
            }
            return;
        }
        for line in about.lines() {
            println!("{line}");
        }
    }

    fn is_failure(event: &LauncherEvent) -> bool {
        matches!(
            event,
            LauncherEvent::StateChanged { status } if status.state == LauncherState::Error
        )
    }
}

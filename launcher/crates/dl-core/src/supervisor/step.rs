use crate::supervisor::output::OutputCapture;
use crate::supervisor::signals;
use crate::{
    CancelGuard, LaunchConfig, OutputMode, StopOutcome, SupervisorError, SupervisorResult,
};

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// One-shot preparation step run before the server starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Install,
    Build,
}

impl StepKind {
    fn label(self) -> &'static str {
        match self {
            StepKind::Install => "install",
            StepKind::Build => "build",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Install => write!(f, "Dependency install"),
            StepKind::Build => write!(f, "Production build"),
        }
    }
}

/// Command in `dir` with its own process group and no stdin.
pub(crate) fn group_command(argv: &[String], dir: &Path) -> SupervisorResult<Command> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        SupervisorError::spawn_failed(
            "",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        )
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir).stdin(Stdio::null());

    #[cfg(unix)]
    {
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
    }

    #[cfg(windows)]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    Ok(cmd)
}

/// Run an install or build step to completion, or until `cancel` fires.
pub(crate) async fn run_step(
    step: StepKind,
    argv: &[String],
    config: &LaunchConfig,
    cancel: &mut CancelGuard,
) -> SupervisorResult<()> {
    if cancel.is_cancelled() {
        return Err(SupervisorError::step_cancelled(step));
    }

    let mut cmd = group_command(argv, &config.project_directory)?;
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!("{step}: running '{}'", argv.join(" "));

    let mut child = cmd
        .spawn()
        .map_err(|e| SupervisorError::spawn_failed(&argv[0], e))?;
    let pid = child.id().unwrap_or_default();
    let mut output =
        OutputCapture::attach(&mut child, step.label(), config.output == OutputMode::Capture);

    let status = tokio::select! {
        status = child.wait() => status?,
        _ = cancel.cancelled() => {
            warn!("{step} cancelled, stopping pid {pid}");
            let outcome = terminate_child(&mut child, pid, config.graceful_stop_timeout).await;
            info!("{step} stopped: {outcome:?}");
            return Err(SupervisorError::step_cancelled(step));
        }
    };

    output.drain().await;

    if status.success() {
        info!("{step} finished");
        Ok(())
    } else {
        Err(SupervisorError::step_failed(
            step,
            status.code(),
            output.stderr_tail(),
        ))
    }
}

/// SIGTERM the child's group, escalate to SIGKILL after `grace`, and reap it.
pub(crate) async fn terminate_child(child: &mut Child, pid: u32, grace: Duration) -> StopOutcome {
    if let Err(e) = signals::terminate_group(pid) {
        warn!("{e}");
    }

    if tokio::time::timeout(grace, child.wait()).await.is_ok() {
        return StopOutcome::Graceful;
    }

    warn!("pid {pid} ignored termination for {grace:?}, killing");
    let reaped = match signals::kill_group(pid) {
        Ok(()) => child.wait().await.map(|_| ()),
        Err(e) => {
            warn!("{e}");
            child.kill().await
        }
    };
    if let Err(e) = reaped {
        warn!("Failed to reap pid {pid}: {e}");
    }
    StopOutcome::Killed
}

use crate::{LaunchMode, ProcessExit};

/// Notifications from the supervisor to its owner.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    Started { pid: u32, mode: LaunchMode },
    ProcessExited { pid: u32, exit: ProcessExit },
}

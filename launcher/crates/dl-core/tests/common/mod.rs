#![allow(dead_code)]

pub(crate) mod delayed_server;

pub use delayed_server::*;

use dl_core::{CommandSet, LaunchConfig, LauncherEvent, LauncherState};

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn sh(script: &str) -> Vec<String> {
    vec![String::from("sh"), String::from("-c"), String::from(script)]
}

pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Port with nothing listening on it (at the time of the call).
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Fast-polling config whose server is a plain `sleep`.
pub fn test_config(project: &Path) -> LaunchConfig {
    let mut config = LaunchConfig::new(project);
    config.probe_url = format!("http://127.0.0.1:{}", free_port());
    config.probe_interval = Duration::from_millis(100);
    config.probe_timeout = Duration::from_millis(200);
    config.graceful_stop_timeout = Duration::from_secs(2);
    config.commands = CommandSet {
        install: sh("mkdir node_modules"),
        build: sh("true"),
        dev: argv(&["sleep", "30"]),
        start: argv(&["sleep", "30"]),
        dependency_marker: PathBuf::from("node_modules"),
    };
    config
}

pub fn install_dependencies(project: &Path) {
    std::fs::create_dir_all(project.join("node_modules")).unwrap();
}

pub async fn next_event(events: &mut broadcast::Receiver<LauncherEvent>) -> LauncherEvent {
    timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for launcher event")
        .expect("launcher event channel closed")
}

/// States seen until `target` (inclusive), skipping other events.
pub async fn states_until(
    events: &mut broadcast::Receiver<LauncherEvent>,
    target: LauncherState,
) -> Vec<LauncherState> {
    let mut states = Vec::new();
    loop {
        if let LauncherEvent::StateChanged { status } = next_event(events).await {
            states.push(status.state);
            if status.state == target {
                return states;
            }
        }
    }
}

/// Alive and not a zombie waiting to be reaped.
pub fn is_alive(pid: u32) -> bool {
    if !dl_core::process_exists(pid) {
        return false;
    }
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        // No procfs: trust the signal check
        Err(_) => !Path::new("/proc/self/stat").exists(),
    }
}

/// Poll until `pid` is gone or the deadline passes.
pub async fn wait_for_exit(pid: u32, deadline: Duration) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if !is_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !is_alive(pid)
}

/// Pid a server script wrote with `echo $! > file`.
pub async fn read_pid_file(path: &Path) -> u32 {
    timeout(EVENT_TIMEOUT, async {
        loop {
            if let Ok(text) = std::fs::read_to_string(path)
                && let Ok(pid) = text.trim().parse()
            {
                return pid;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("timed out waiting for pid file")
}

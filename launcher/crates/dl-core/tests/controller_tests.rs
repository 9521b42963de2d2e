//! Launch state machine scenarios against real child processes.
#![cfg(unix)]

mod common;

use common::{
    argv, free_port, install_dependencies, is_alive, next_event, read_pid_file, sh,
    spawn_delayed_http_server, spawn_silent_server, states_until, test_config, wait_for_exit,
};
use dl_core::{LauncherController, LauncherEvent, LauncherState};

use std::sync::atomic::Ordering;
use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::eq;
use tempfile::TempDir;
use tokio::time::Instant;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_server_binding_after_350ms_when_launched_then_ready_in_window() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let port = free_port();
    let mut config = test_config(project.path());
    config.probe_url = format!("http://127.0.0.1:{port}");
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    let status_rx = controller.watch_status();
    assert_that!(controller.state(), eq(LauncherState::Idle));

    // When
    controller.launch().await.unwrap();

    let mut states = Vec::new();
    let mut ready_events = 0;
    let mut started_at = None;
    let mut ready_after = None;
    let mut server = None;

    while ready_after.is_none() {
        match next_event(&mut events).await {
            LauncherEvent::Started { .. } => {
                started_at = Some(Instant::now());
                server = Some(spawn_delayed_http_server(
                    port,
                    Duration::from_millis(350),
                ));
            }
            LauncherEvent::StateChanged { status } => states.push(status.state),
            LauncherEvent::Ready { url } => {
                ready_events += 1;
                assert_that!(url.as_str(), eq(format!("http://127.0.0.1:{port}").as_str()));
                ready_after = started_at.map(|at| at.elapsed());
            }
            _ => {}
        }
    }

    // Then
    assert_eq!(
        states,
        vec![
            LauncherState::Starting,
            LauncherState::ProbingReadiness,
            LauncherState::Ready,
        ]
    );
    assert_that!(ready_events, eq(1));
    let elapsed = ready_after.unwrap();
    assert!(elapsed >= Duration::from_millis(300), "ready too early: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(800), "ready too late: {elapsed:?}");
    assert_eq!(
        controller.status().ready_url,
        Some(format!("http://127.0.0.1:{port}"))
    );

    let final_state = controller.stop_requested().await.unwrap();
    assert_that!(final_state, eq(LauncherState::Stopped));
    assert_that!(status_rx.borrow().state, eq(LauncherState::Stopped));
    assert_eq!(status_rx.borrow().ready_url, None);
    if let Some(server) = server {
        server.abort();
    }
}

#[tokio::test]
async fn given_missing_server_binary_when_launched_then_error_mentions_spawn() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let mut config = test_config(project.path());
    config.commands.dev = argv(&["definitely-not-a-dashboard-server"]);
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();

    // When
    controller.launch().await.unwrap();
    let states = states_until(&mut events, LauncherState::Error).await;

    // Then
    assert_eq!(states, vec![LauncherState::Starting, LauncherState::Error]);
    let status = controller.status();
    let error = status.error.unwrap();
    assert!(error.contains("spawn"), "error: {error}");
    assert!(status.recovery_hint.is_some());
    assert!(status.status_text.starts_with("Error starting server:"));
}

#[tokio::test]
async fn given_server_exiting_with_code_1_while_probing_when_launched_then_error() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let mut config = test_config(project.path());
    config.commands.dev = sh("sleep 0.3; exit 1");
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();

    // When
    controller.launch().await.unwrap();
    let states = states_until(&mut events, LauncherState::Error).await;

    // Then
    assert_eq!(
        states,
        vec![
            LauncherState::Starting,
            LauncherState::ProbingReadiness,
            LauncherState::Error,
        ]
    );
    let error = controller.status().error.unwrap();
    assert!(error.contains("code 1"), "error: {error}");
}

#[tokio::test]
async fn given_install_in_progress_when_stop_requested_then_stopped_without_starting() {
    // Given
    let project = TempDir::new().unwrap();
    let mut config = test_config(project.path());
    config.commands.install = argv(&["sleep", "30"]);
    config.graceful_stop_timeout = Duration::from_millis(500);
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    let states = states_until(&mut events, LauncherState::InstallingDependencies).await;
    assert_eq!(states, vec![LauncherState::InstallingDependencies]);

    // When
    let started = Instant::now();
    let final_state = controller.stop_requested().await.unwrap();

    // Then
    assert_that!(final_state, eq(LauncherState::Stopped));
    assert!(started.elapsed() < Duration::from_secs(5));
    let states = states_until(&mut events, LauncherState::Stopped).await;
    assert_eq!(states, vec![LauncherState::Stopped]);
}

#[tokio::test]
async fn given_stopped_launcher_when_launch_or_stop_again_then_stays_stopped() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let controller = LauncherController::spawn(test_config(project.path()));
    let first = controller.stop_requested().await.unwrap();

    // When
    controller.launch().await.unwrap();
    let second = controller.stop_requested().await.unwrap();

    // Then
    assert_that!(first, eq(LauncherState::Stopped));
    assert_that!(second, eq(LauncherState::Stopped));
    assert_that!(controller.state(), eq(LauncherState::Stopped));
}

#[tokio::test]
async fn given_error_state_when_launched_again_then_retries() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let mut config = test_config(project.path());
    config.commands.dev = sh("if [ -f attempted ]; then sleep 30; else touch attempted; exit 1; fi");
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    states_until(&mut events, LauncherState::Error).await;

    // When
    controller.launch().await.unwrap();
    let states = states_until(&mut events, LauncherState::ProbingReadiness).await;

    // Then
    assert_eq!(
        states,
        vec![LauncherState::Starting, LauncherState::ProbingReadiness]
    );
    assert_eq!(controller.status().error, None);

    controller.stop_requested().await.unwrap();
}

#[tokio::test]
async fn given_ready_launcher_when_refreshed_then_reload_event_emitted() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let port = free_port();
    let mut config = test_config(project.path());
    config.probe_url = format!("http://127.0.0.1:{port}");
    let server = spawn_delayed_http_server(port, Duration::ZERO);
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    states_until(&mut events, LauncherState::Ready).await;

    // When
    controller.refresh().await.unwrap();

    // Then
    loop {
        match next_event(&mut events).await {
            LauncherEvent::Reload { url } => {
                assert_that!(url.as_str(), eq(format!("http://127.0.0.1:{port}").as_str()));
                break;
            }
            LauncherEvent::Ready { .. } | LauncherEvent::ProbeAttempt { .. } => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }

    controller.stop_requested().await.unwrap();
    server.abort();
}

#[tokio::test]
async fn given_probing_launcher_when_all_handles_dropped_then_server_stopped() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let controller = LauncherController::spawn(test_config(project.path()));
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    states_until(&mut events, LauncherState::ProbingReadiness).await;
    let pid = controller.status().pid.unwrap();

    // When
    drop(controller);

    // Then
    assert!(wait_for_exit(pid, Duration::from_secs(5)).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_ready_launcher_when_server_exits_then_error_with_exit_code() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let port = free_port();
    let mut config = test_config(project.path());
    config.probe_url = format!("http://127.0.0.1:{port}");
    config.commands.dev = sh("sleep 1; exit 1");
    let server = spawn_delayed_http_server(port, Duration::ZERO);
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    let states = states_until(&mut events, LauncherState::Ready).await;
    assert_eq!(
        states,
        vec![
            LauncherState::Starting,
            LauncherState::ProbingReadiness,
            LauncherState::Ready,
        ]
    );

    // When
    let states = states_until(&mut events, LauncherState::Error).await;

    // Then
    assert_eq!(states, vec![LauncherState::Error]);
    let status = controller.status();
    let error = status.error.unwrap();
    assert!(error.contains("code 1"), "error: {error}");
    assert_eq!(status.ready_url, None);

    controller.stop_requested().await.unwrap();
    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_server_exiting_with_child_alive_when_stop_requested_then_child_terminated() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let mut config = test_config(project.path());
    config.commands.dev = sh("sleep 30 & echo $! > child.pid; sleep 0.3; exit 1");
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    let child = read_pid_file(&project.path().join("child.pid")).await;
    states_until(&mut events, LauncherState::Error).await;

    // When
    let final_state = controller.stop_requested().await.unwrap();

    // Then
    assert_that!(final_state, eq(LauncherState::Stopped));
    assert!(wait_for_exit(child, Duration::from_secs(2)).await);
    assert!(!is_alive(child));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_attempt_in_flight_when_stop_requested_then_stopped_within_probe_timeout() {
    // Given
    let project = TempDir::new().unwrap();
    install_dependencies(project.path());
    let (port, accepted, server) = spawn_silent_server().await;
    let mut config = test_config(project.path());
    config.probe_url = format!("http://127.0.0.1:{port}");
    let probe_timeout = config.probe_timeout;
    let controller = LauncherController::spawn(config);
    let mut events = controller.subscribe();
    controller.launch().await.unwrap();
    states_until(&mut events, LauncherState::ProbingReadiness).await;

    let waiting = Instant::now();
    while accepted.load(Ordering::SeqCst) == 0 {
        assert!(waiting.elapsed() < Duration::from_secs(5), "no attempt reached the server");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // When
    let started = Instant::now();
    let final_state = controller.stop_requested().await.unwrap();
    let elapsed = started.elapsed();

    // Then
    assert_that!(final_state, eq(LauncherState::Stopped));
    assert!(
        elapsed <= probe_timeout + Duration::from_millis(500),
        "stop took {elapsed:?}"
    );

    let attempts_at_stop = accepted.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_that!(accepted.load(Ordering::SeqCst), eq(attempts_at_stop));

    server.abort();
}

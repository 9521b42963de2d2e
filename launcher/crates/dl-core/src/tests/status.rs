use crate::controller::{Failure, build_launcher_status};
use crate::{LaunchMode, LauncherEvent, LauncherState, Progress};

use googletest::assert_that;
use googletest::prelude::eq;
use serde_json::json;

#[test]
fn given_installing_state_when_status_built_then_install_text_and_spinner() {
    // When
    let status = build_launcher_status(
        LauncherState::InstallingDependencies,
        None,
        None,
        None,
        LaunchMode::Dev,
    );

    // Then
    assert_that!(
        status.status_text.as_str(),
        eq("Installing dependencies... This may take a few minutes.")
    );
    assert_that!(status.progress, eq(Progress::Indeterminate));
    assert_eq!(status.error, None);
}

#[test]
fn given_error_state_with_failure_when_status_built_then_error_and_hint_exposed() {
    // Given
    let failure = Failure::new("Failed to spawn 'npm'", "Check PATH");

    // When
    let status = build_launcher_status(
        LauncherState::Error,
        Some(&failure),
        None,
        None,
        LaunchMode::Dev,
    );

    // Then
    assert_that!(
        status.status_text.as_str(),
        eq("Error starting server: Failed to spawn 'npm'")
    );
    assert_eq!(status.error.as_deref(), Some("Failed to spawn 'npm'"));
    assert_eq!(status.recovery_hint.as_deref(), Some("Check PATH"));
    assert_that!(status.progress, eq(Progress::Idle));
}

#[test]
fn given_stale_failure_when_state_not_error_then_no_error_reported() {
    // Given
    let failure = Failure::new("old failure", "old hint");

    // When
    let status = build_launcher_status(
        LauncherState::Starting,
        Some(&failure),
        None,
        Some(42),
        LaunchMode::Production,
    );

    // Then
    assert_eq!(status.error, None);
    assert_eq!(status.recovery_hint, None);
    assert_eq!(status.pid, Some(42));
}

#[test]
fn given_ready_state_when_status_built_then_url_and_complete_progress() {
    // When
    let status = build_launcher_status(
        LauncherState::Ready,
        None,
        Some("http://localhost:3000"),
        Some(7),
        LaunchMode::Dev,
    );

    // Then
    assert_eq!(status.ready_url.as_deref(), Some("http://localhost:3000"));
    assert_that!(status.progress, eq(Progress::Complete));
    assert_that!(
        status.status_text.as_str(),
        eq("Dashboard loaded successfully")
    );
}

#[test]
fn given_launch_states_when_checked_then_only_idle_and_error_accept_launch() {
    let accepting: Vec<LauncherState> = [
        LauncherState::Idle,
        LauncherState::InstallingDependencies,
        LauncherState::Starting,
        LauncherState::ProbingReadiness,
        LauncherState::Ready,
        LauncherState::Error,
        LauncherState::Stopped,
    ]
    .into_iter()
    .filter(LauncherState::can_launch)
    .collect();

    assert_eq!(accepting, vec![LauncherState::Idle, LauncherState::Error]);
}

#[test]
fn given_state_changed_event_when_serialized_then_tagged_snake_case() {
    // Given
    let status = build_launcher_status(
        LauncherState::ProbingReadiness,
        None,
        None,
        Some(99),
        LaunchMode::Dev,
    );
    let event = LauncherEvent::StateChanged { status };

    // When
    let value = serde_json::to_value(&event).unwrap();

    // Then
    assert_eq!(value["type"], json!("state_changed"));
    assert_eq!(value["status"]["state"], json!("probing_readiness"));
    assert_eq!(value["status"]["progress"], json!("indeterminate"));
    assert_eq!(value["status"]["mode"], json!("dev"));
    assert_eq!(value["status"]["pid"], json!(99));
}

#[test]
fn given_ready_event_when_serialized_then_carries_url() {
    // Given
    let event = LauncherEvent::Ready {
        url: String::from("http://localhost:3000"),
    };

    // When
    let value = serde_json::to_value(&event).unwrap();

    // Then
    assert_eq!(
        value,
        json!({"type": "ready", "url": "http://localhost:3000"})
    );
}

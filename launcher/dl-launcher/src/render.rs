use crate::{ShellOptions, Variant};

use dl_core::{LauncherEvent, LauncherState};

/// Text for one event, or None when the event is not shown.
///
/// JSON mode prints every event, one object per line.
pub fn render_event(event: &LauncherEvent, options: &ShellOptions) -> Option<String> {
    if options.json {
        return serde_json::to_string(event).ok();
    }

    match event {
        LauncherEvent::StateChanged { status } => {
            let mut line = format!("[{}] {}", status.state, status.status_text);
            if status.state == LauncherState::Error
                && options.variant == Variant::Dashboard
                && let Some(ref hint) = status.recovery_hint
            {
                line.push_str("\n  ");
                line.push_str(hint);
                line.push_str("\n  Type 'l' to launch again or 'q' to quit.");
            }
            Some(line)
        }
        LauncherEvent::Started { pid, mode } => {
            Some(format!("Server process {pid} started ({mode} mode)"))
        }
        LauncherEvent::ProbeAttempt { .. } => None,
        LauncherEvent::Ready { url } => Some(match options.variant {
            Variant::Dashboard => format!("Dashboard available at {url}"),
            Variant::Kiosk if options.fullscreen => format!("Displaying {url} (fullscreen)"),
            Variant::Kiosk => format!("Displaying {url}"),
        }),
        LauncherEvent::Reload { url } => Some(format!("Reloading {url}")),
        LauncherEvent::ProcessExited {
            pid,
            code,
            expected: false,
        } => Some(match code {
            Some(code) => format!("Server process {pid} exited with code {code}"),
            None => format!("Server process {pid} was killed by a signal"),
        }),
        LauncherEvent::ProcessExited { .. } => None,
    }
}

/// Command summary for the given launcher.
pub fn help_lines(variant: Variant) -> Vec<&'static str> {
    match variant {
        Variant::Dashboard => vec![
            "Commands:",
            "  r, refresh   reload the dashboard",
            "  l, launch    launch again after an error",
            "  s, settings  show launcher settings",
            "  h, help      show this help",
            "  q, quit      stop the server and exit",
        ],
        Variant::Kiosk => vec!["Press Esc then Enter, or type q, to exit"],
    }
}

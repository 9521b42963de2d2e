use crate::Variant;

/// Commands typed into the terminal shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Refresh,
    /// Launch again after an error
    Launch,
    Settings,
    Help,
    Quit,
}

const ESCAPE: char = '\u{1b}';

/// Parse one input line. The kiosk only understands quitting.
pub fn parse_command(variant: Variant, line: &str) -> Option<ShellCommand> {
    if line.contains(ESCAPE) && variant == Variant::Kiosk {
        return Some(ShellCommand::Quit);
    }

    let word = line.trim().to_lowercase();
    match (variant, word.as_str()) {
        (_, "q" | "quit") => Some(ShellCommand::Quit),
        (Variant::Dashboard, "exit") => Some(ShellCommand::Quit),
        (Variant::Dashboard, "r" | "refresh" | "reload") => Some(ShellCommand::Refresh),
        (Variant::Dashboard, "l" | "launch" | "retry") => Some(ShellCommand::Launch),
        (Variant::Dashboard, "s" | "settings") => Some(ShellCommand::Settings),
        (Variant::Dashboard, "h" | "help" | "?") => Some(ShellCommand::Help),
        _ => None,
    }
}

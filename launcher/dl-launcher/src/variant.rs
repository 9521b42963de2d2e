use dl_core::OutputMode;

use std::fmt;

/// Which launcher binary is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Interactive launcher with settings and refresh
    Dashboard,
    /// Unattended full-screen display
    Kiosk,
}

impl Variant {
    pub fn binary_name(&self) -> &'static str {
        match self {
            Variant::Dashboard => "dashboard-launcher",
            Variant::Kiosk => "kiosk-launcher",
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        match self {
            Variant::Dashboard => OutputMode::Capture,
            Variant::Kiosk => OutputMode::Discard,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

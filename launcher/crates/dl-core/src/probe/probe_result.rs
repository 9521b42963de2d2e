use serde::Serialize;

/// Outcome of one readiness attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeResult {
    Ready { attempt: u32, latency_ms: u64 },
    NotYetReady { attempt: u32, reason: String },
}

impl ProbeResult {
    pub fn attempt(&self) -> u32 {
        match self {
            ProbeResult::Ready { attempt, .. } | ProbeResult::NotYetReady { attempt, .. } => {
                *attempt
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeResult::Ready { .. })
    }
}

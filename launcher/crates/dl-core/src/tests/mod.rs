mod status;

use crate::ProbeTarget;

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

/// Probe target that starts answering on a given attempt.
pub(crate) struct ReadyOnAttempt {
    ready_on: u32,
    calls: AtomicU32,
}

impl ReadyOnAttempt {
    pub(crate) fn new(ready_on: u32) -> Self {
        Self {
            ready_on,
            calls: AtomicU32::new(0),
        }
    }

    /// Never becomes ready.
    pub(crate) fn never() -> Self {
        Self::new(u32::MAX)
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeTarget for ReadyOnAttempt {
    async fn attempt(&self) -> Result<(), String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.ready_on {
            Ok(())
        } else {
            Err(format!("attempt {call} refused"))
        }
    }

    fn describe(&self) -> String {
        String::from("fake target")
    }
}

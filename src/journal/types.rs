use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// One logged user action. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: String,
    pub description: String,
    /// Milliseconds since the Unix epoch; doubles as the ranking score.
    pub timestamp: u64,
}

/// Per-process millisecond clock whose readings strictly increase.
///
/// Two entries stamped within the same millisecond still get distinct,
/// ordered scores; a wall clock stepping backwards does not reorder entries.
#[derive(Debug, Default)]
pub struct JournalClock {
    last: AtomicU64,
}

impl JournalClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let now = now_ms();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

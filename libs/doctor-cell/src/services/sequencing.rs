use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

/// Upper bound on sessions tracked at once; the oldest is evicted beyond it.
pub const MAX_TRACKED_SESSIONS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    session: Option<String>,
    seq: u64,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Hands out monotonically increasing tickets per client session so a
/// response for an older search can be recognized and dropped.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    counter: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, session: Option<&str>) -> SearchTicket {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let session = session.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(ref key) = session {
            let mut latest = self.lock();
            if latest.len() >= MAX_TRACKED_SESSIONS && !latest.contains_key(key) {
                let oldest = latest
                    .iter()
                    .min_by_key(|(_, seq)| **seq)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    latest.remove(&oldest);
                }
            }
            latest.insert(key.clone(), seq);
            debug!("Search {} started for session {}", seq, key);
        }

        SearchTicket { session, seq }
    }

    /// Anonymous tickets are always current.
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        match ticket.session {
            Some(ref key) => self.lock().get(key).map_or(true, |latest| *latest == ticket.seq),
            None => true,
        }
    }

    pub fn tracked_sessions(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
        self.latest.lock().unwrap_or_else(|poisoned| {
            warn!("Search sequencer lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

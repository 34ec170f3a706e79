//! Per-session result slots.
//!
//! Each browser session owns exactly one `Option<ResultSet>`. A new
//! evaluation empties the slot when it starts and replaces it wholesale when
//! it succeeds; results are never merged across runs. Sessions nobody has
//! touched for the configured idle period are swept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::screening::models::ResultSet;

pub const SESSION_HEADER: &str = "x-session-id";

struct Slot {
    results: Option<ResultSet>,
    last_seen: Instant,
}

impl Slot {
    fn empty() -> Self {
        Self {
            results: None,
            last_seen: Instant::now(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a session with an empty slot.
    pub fn start(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.slots().insert(id, Slot::empty());
        id
    }

    /// Returns `requested` when it names a live session.
    pub fn resume(&self, requested: Option<Uuid>) -> Option<Uuid> {
        requested.filter(|id| self.slots().contains_key(id))
    }

    pub fn clear(&self, id: Uuid) {
        if let Some(slot) = self.slots().get_mut(&id) {
            slot.results = None;
            slot.last_seen = Instant::now();
        }
    }

    pub fn store(&self, id: Uuid, results: ResultSet) {
        self.slots().insert(
            id,
            Slot {
                results: Some(results),
                last_seen: Instant::now(),
            },
        );
    }

    pub fn current(&self, id: Uuid) -> Option<ResultSet> {
        let mut slots = self.slots();
        let slot = slots.get_mut(&id)?;
        slot.last_seen = Instant::now();
        slot.results.clone()
    }

    /// Returns whether the session existed.
    pub fn end(&self, id: Uuid) -> bool {
        self.slots().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    /// Drops every session untouched for longer than `idle`.
    pub fn sweep_idle(&self, idle: Duration) -> usize {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|_, slot| slot.last_seen.elapsed() <= idle);
        before - slots.len()
    }

    /// Sweeps idle sessions in the background for the life of the process.
    pub fn spawn_sweeper(&self, idle: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let period = (idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let dropped = store.sweep_idle(idle);
                if dropped > 0 {
                    debug!("Dropped {dropped} idle session(s)");
                }
            }
        })
    }
}

/// Reads the session id header. Missing or malformed values are `None`.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

//! Widget State Store
//!
//! Per-session widget state, keyed by session id. Each session gets its own
//! slot with its own lock: writes to one session serialize (last write
//! wins), while different sessions never block each other. Locks are held
//! only inside store operations, never across a handler await, so a timed
//! out invocation cannot strand a session.
//!
//! A session's lifecycle is `Absent → Active → Evicted`; eviction is
//! terminal, and a later write for the same id starts a fresh logical
//! session. When to evict is the caller's policy (e.g. a conversation-end
//! signal); the store only provides the mechanism.

use {
    crate::error::{GatewayError, GatewayResult},
    dashmap::DashMap,
    serde_json::Value,
    std::sync::Arc,
    tokio::sync::Mutex,
    tracing::debug,
};

#[derive(Default)]
struct SessionSlot {
    state: Mutex<Value>,
}

/// Store of per-session widget state.
pub struct WidgetStateStore {
    slots: DashMap<String, Arc<SessionSlot>>,
    max_sessions: Option<usize>,
}

impl WidgetStateStore {
    pub fn new(max_sessions: Option<usize>) -> Self {
        Self {
            slots: DashMap::new(),
            max_sessions,
        }
    }

    /// Read a session's state. Unset sessions read as `Value::Null`.
    pub async fn get(&self, session_id: &str) -> Value {
        let slot = match self.slots.get(session_id) {
            Some(slot) => slot.value().clone(),
            None => return Value::Null,
        };
        let value = slot.state.lock().await.clone();
        value
    }

    /// Replace a session's state. Writes for the same session serialize;
    /// the last write wins.
    pub async fn set(&self, session_id: &str, state: Value) -> GatewayResult<()> {
        let slot = self.slot(session_id)?;
        *slot.state.lock().await = state;
        Ok(())
    }

    /// Atomically read-modify-write a session's state under its lock,
    /// returning the new state. For handlers that must not lose concurrent
    /// updates.
    pub async fn update<F>(&self, session_id: &str, f: F) -> GatewayResult<Value>
    where
        F: FnOnce(&mut Value),
    {
        let slot = self.slot(session_id)?;
        let mut state = slot.state.lock().await;
        f(&mut state);
        Ok(state.clone())
    }

    /// Remove a session's state. Terminal for that logical session; returns
    /// whether state existed. An eviction racing a concurrent write may drop
    /// that write.
    pub fn evict(&self, session_id: &str) -> bool {
        let evicted = self.slots.remove(session_id).is_some();
        if evicted {
            debug!(session_id = %session_id, "🗑️ Session state evicted");
        }
        evicted
    }

    /// Number of sessions currently holding state
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no session holds state
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, session_id: &str) -> GatewayResult<Arc<SessionSlot>> {
        if let Some(slot) = self.slots.get(session_id) {
            return Ok(slot.value().clone());
        }
        if let Some(max) = self.max_sessions {
            if self.slots.len() >= max {
                return Err(GatewayError::TooManySessions(max));
            }
        }
        // Clone the Arc out of the entry guard so no shard lock is held
        // across the caller's await on the slot mutex.
        Ok(self
            .slots
            .entry(session_id.to_string())
            .or_default()
            .value()
            .clone())
    }
}

impl Default for WidgetStateStore {
    fn default() -> Self {
        Self::new(None)
    }
}

//! The shared ledger: all registry state under one transaction boundary.

use crate::errors::Result;
use crate::events::{EventObserver, RegistryEvent, SequencedEvent};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use verity_types::{
    ContentId, ContentRecord, FingerprintSet, Identity, PermissionRequest, PrincipalId,
};

/// Mutable registry state. Keyed by principal and content id; the
/// remaining maps are secondary indexes kept in sync by the stores.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    /// Principal -> identity record.
    pub identities: HashMap<PrincipalId, Identity>,
    /// Handle string -> owning principal (uniqueness index).
    pub handle_owners: HashMap<String, PrincipalId>,
    /// Content id -> content record.
    pub contents: HashMap<ContentId, ContentRecord>,
    /// Uploader -> content ids in insertion order.
    pub uploads: HashMap<PrincipalId, Vec<ContentId>>,
    /// Fingerprint set -> first genuine original carrying it.
    pub genuine_fingerprints: HashMap<FingerprintSet, ContentId>,
    /// (content, requester) -> latest permission request for the pair.
    pub requests: HashMap<(ContentId, PrincipalId), PermissionRequest>,
    /// Ordered event feed; one entry per committed mutation.
    pub events: Vec<SequencedEvent>,
    /// High-water mark for monotonic timestamps.
    pub last_timestamp_us: u64,
}

impl LedgerState {
    /// Next insertion timestamp: wall-clock micros, bumped past the last
    /// issued value so record order is strictly monotonic.
    pub fn next_timestamp_us(&mut self) -> u64 {
        let now_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        let ts = now_us.max(self.last_timestamp_us + 1);
        self.last_timestamp_us = ts;
        ts
    }
}

struct LedgerInner {
    state: RwLock<LedgerState>,
    observers: RwLock<Vec<Arc<dyn EventObserver>>>,
}

/// Cloneable handle to the single shared ledger.
///
/// Every mutating operation runs through [`Ledger::commit`]: one write-lock
/// critical section that either applies the full mutation and appends
/// exactly one event, or fails with a typed error and no visible change.
#[derive(Clone)]
pub struct Ledger {
    inner: Arc<LedgerInner>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                state: RwLock::new(LedgerState::default()),
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register an observer for future commits.
    pub fn subscribe(&self, observer: Arc<dyn EventObserver>) {
        self.inner.observers.write().push(observer);
    }

    /// Run `op` as one serializable transaction. On success the returned
    /// event is appended to the feed and observers are notified before the
    /// write lock is released, preserving commit order.
    pub(crate) fn commit<T>(
        &self,
        op: impl FnOnce(&mut LedgerState) -> Result<(T, RegistryEvent)>,
    ) -> Result<T> {
        let mut state = self.inner.state.write();
        let (value, event) = op(&mut state)?;

        let sequenced = SequencedEvent {
            seq: state.events.len() as u64 + 1,
            event,
        };
        state.events.push(sequenced.clone());

        let observers = self.inner.observers.read();
        for observer in observers.iter() {
            observer.on_event(&sequenced);
        }

        Ok(value)
    }

    /// Read-only access to a consistent snapshot.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> T {
        let state = self.inner.state.read();
        f(&state)
    }

    /// Events with `seq > since`, in commit order.
    pub fn events_since(&self, since: u64) -> Vec<SequencedEvent> {
        let state = self.inner.state.read();
        state
            .events
            .iter()
            .filter(|e| e.seq > since)
            .cloned()
            .collect()
    }

    /// Total number of committed mutations.
    pub fn event_count(&self) -> u64 {
        self.inner.state.read().events.len() as u64
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

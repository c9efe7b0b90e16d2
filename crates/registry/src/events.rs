//! Domain events emitted on every committed mutation.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use verity_types::{ContentId, Handle, PrincipalId};

/// One event per committed mutation, in commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    IdentityRegistered {
        principal_id: PrincipalId,
        handle: Handle,
    },
    ProfileUpdated {
        principal_id: PrincipalId,
    },
    GenuineContentRecorded {
        content_id: ContentId,
        uploader_id: PrincipalId,
    },
    DeepfakeRecorded {
        content_id: ContentId,
        reporter_id: PrincipalId,
    },
    ReuseRequested {
        content_id: ContentId,
        requester_id: PrincipalId,
    },
    ReuseGranted {
        content_id: ContentId,
        requester_id: PrincipalId,
        new_content_id: ContentId,
    },
    ReuseRejected {
        content_id: ContentId,
        requester_id: PrincipalId,
    },
}

/// An event tagged with its position in the feed. Sequence numbers start
/// at 1 and increase by exactly one per committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: RegistryEvent,
}

/// Capability interface for external observers (UI state, notification
/// systems). Observers are notified synchronously inside the commit
/// section and must not call back into the registry.
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &SequencedEvent);
}

/// Collecting observer, handy for tests and notification fan-in.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<SequencedEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything observed so far.
    pub fn snapshot(&self) -> Vec<SequencedEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything observed so far.
    pub fn drain(&self) -> Vec<SequencedEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventObserver for EventLog {
    fn on_event(&self, event: &SequencedEvent) {
        self.events.lock().push(event.clone());
    }
}

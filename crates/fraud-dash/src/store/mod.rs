//! In-memory owner of the current metrics snapshot.
//!
//! The store holds exactly two snapshots: current and the immediately
//! prior value. The scheduler is the only writer; the view and any other
//! subscriber only read. Replacement is atomic from a reader's
//! perspective and notifies subscribers synchronously, in subscription
//! order.

use std::sync::Mutex;

use crate::snapshot::MetricsSnapshot;

/// Handle returned by [`SnapshotStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&MetricsSnapshot) + Send>;

#[derive(Default)]
struct State {
    current: MetricsSnapshot,
    previous: Option<MetricsSnapshot>,
}

#[derive(Default)]
struct Listeners {
    entries: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

/// Owner of the current and previous [`MetricsSnapshot`].
#[derive(Default)]
pub struct SnapshotStore {
    // Listeners live behind their own lock so a notification callback can
    // read the store without re-entering the state lock.
    state: Mutex<State>,
    listeners: Mutex<Listeners>,
}

impl SnapshotStore {
    /// Create a store holding the empty initial snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub fn current(&self) -> MetricsSnapshot {
        self.state.lock().expect("snapshot state lock").current.clone()
    }

    /// The snapshot that `current` replaced, if any replacement happened.
    pub fn previous(&self) -> Option<MetricsSnapshot> {
        self.state.lock().expect("snapshot state lock").previous.clone()
    }

    /// Replace the current snapshot wholesale.
    ///
    /// A value structurally equal to the current snapshot is a no-op: no
    /// previous-slot update, no notification. Returns whether the store
    /// changed. Subscribers are invoked synchronously after the swap, in
    /// subscription order.
    pub fn replace(&self, snapshot: MetricsSnapshot) -> bool {
        {
            let mut state = self.state.lock().expect("snapshot state lock");
            if state.current == snapshot {
                return false;
            }
            state.previous = Some(std::mem::replace(&mut state.current, snapshot.clone()));
        }

        let listeners = self.listeners.lock().expect("snapshot listeners lock");
        for (_, listener) in &listeners.entries {
            listener(&snapshot);
        }
        true
    }

    /// Register a listener called after every effective replacement.
    pub fn subscribe(&self, listener: impl Fn(&MetricsSnapshot) + Send + 'static) -> SubscriptionId {
        let mut listeners = self.listeners.lock().expect("snapshot listeners lock");
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut listeners = self.listeners.lock().expect("snapshot listeners lock");
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

use crate::prelude::Arc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Handle returned by [`ListenerRegistry::subscribe`], used to unsubscribe again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Publish/subscribe registry for change listeners.
///
/// Listeners are notified from a snapshot, so a listener may subscribe or
/// unsubscribe from within its own callback.
pub struct ListenerRegistry<L: ?Sized> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Arc<L>)>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Arc<L>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(subscription, _)| *subscription != id);
        listeners.len() != before
    }

    /// Current listeners in subscription order
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn for_each(&self, mut f: impl FnMut(&L)) {
        for listener in self.snapshot() {
            f(listener.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

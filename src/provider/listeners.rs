//! Event listener bookkeeping shared by provider implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::provider::{ProviderEvent, ProviderEventKind};

/// Handle returned when registering a listener.
pub type ListenerId = u64;

/// Callback invoked for a provider event.
pub type Listener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

/// Registered listeners, keyed by id.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, ProviderEventKind, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, kind, listener));
        }
        id
    }

    pub fn remove(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(existing, _, _)| *existing != id);
        }
    }

    /// Invoke every listener registered for the event's kind.
    ///
    /// Listeners run outside the lock so they may register or remove others.
    pub fn dispatch(&self, event: &ProviderEvent) -> usize {
        let matching: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .filter(|(_, kind, _)| *kind == event.kind())
                .map(|(_, _, listener)| listener.clone())
                .collect(),
            Err(_) => return 0,
        };

        for listener in &matching {
            listener(event);
        }
        matching.len()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::types::{Event, EventCategory};

/// Host callback for one event category
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Delivers events to host callbacks.
///
/// One callback per category; registering again replaces the previous one.
/// Delivery is synchronous and unqueued: `emit` returns after the callback
/// does, and events without a callback are dropped. The registry lock is
/// released before the callback runs, so callbacks may register handlers.
#[derive(Clone, Default)]
pub struct EventEmitter {
    handlers: Arc<RwLock<HashMap<EventCategory, EventCallback>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, category: EventCategory, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers.write().insert(category, Arc::new(callback));
    }

    pub fn off(&self, category: EventCategory) {
        self.handlers.write().remove(&category);
    }

    pub fn has_handler(&self, category: EventCategory) -> bool {
        self.handlers.read().contains_key(&category)
    }

    pub fn emit(&self, event: Event) {
        let category = event.category();
        let callback = self.handlers.read().get(&category).cloned();
        match callback {
            Some(callback) => callback(&event),
            None => trace!(?category, "no handler registered, dropping event"),
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("categories", &self.handlers.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

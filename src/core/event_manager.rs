//! Idempotent per-object event subscriptions.
//!
//! Each element owns one manager for the native object it wraps. The manager
//! remembers which listener is attached for each event key, so re-registering the
//! same listener is free and replacing it never stacks duplicates.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::native::Emitter;
use crate::core::props::Listener;

#[derive(Default)]
pub struct EventManager {
    attached: HashMap<String, Listener>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `handler` the only listener attached for `event` on `emitter`.
    ///
    /// - Same listener as the attached one: no-op.
    /// - Otherwise the attached listener (if any) is removed first, then `handler`
    ///   (if any) is attached.
    pub fn register<E: Emitter + ?Sized>(
        &mut self,
        emitter: &E,
        event: &str,
        handler: Option<&Listener>,
    ) {
        let existing = self.attached.get(event);
        let unchanged = match (existing, handler) {
            (Some(existing), Some(handler)) => Rc::ptr_eq(existing, handler),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        if let Some(existing) = self.attached.remove(event) {
            tracing::debug!(event, "detaching listener");
            emitter.remove_listener(event, &existing);
        }

        if let Some(handler) = handler {
            tracing::debug!(event, "attaching listener");
            emitter.on(event, Rc::clone(handler));
            self.attached.insert(event.to_string(), Rc::clone(handler));
        }
    }

    /// Detaches every listener this manager attached.
    pub fn clear<E: Emitter + ?Sized>(&mut self, emitter: &E) {
        for (event, listener) in self.attached.drain() {
            emitter.remove_listener(&event, &listener);
        }
    }

    pub fn is_attached(&self, event: &str) -> bool {
        self.attached.contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

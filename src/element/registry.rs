//! Element arena and identifiers.

use std::collections::HashMap;
use std::convert::Infallible;

use crate::element::Element;

/// Stable identifier for an element owned by a single `HostRenderer`.
///
/// Semantics:
/// - IDs are unique within a renderer.
/// - IDs are never reused, so a stale ID never aliases a newer element.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementId(u64);

impl ElementId {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Text instances cannot exist, so this conversion is never called.
impl From<Infallible> for ElementId {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Live elements keyed by id. Removed entries are dropped, not tombstoned.
#[derive(Default)]
pub struct ElementRegistry {
    entries: HashMap<ElementId, Element>,
    next_id: u64,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

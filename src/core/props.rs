//! Declarative prop snapshots.
//!
//! Props are an insertion-ordered list of named values. Data values are plain JSON;
//! callbacks are reference-counted listeners compared by identity, never by content.

use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Callback shape shared by user handler props and native event listeners.
pub type Listener = Rc<dyn Fn(&[Value])>;

/// Wraps a closure into a [`Listener`].
pub fn listener(f: impl Fn(&[Value]) + 'static) -> Listener {
    Rc::new(f)
}

/// A single prop value.
#[derive(Clone)]
pub enum PropValue {
    Data(Value),
    Handler(Listener),
}

impl PropValue {
    /// JavaScript-style truthiness: `null`, `false`, `0`, and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Handler(_) => true,
            Self::Data(value) => match value {
                Value::Null => false,
                Value::Bool(flag) => *flag,
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Listener> {
        match self {
            Self::Handler(handler) => Some(handler),
            Self::Data(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(value) => write!(f, "{value}"),
            Self::Handler(handler) => write!(f, "<handler {:p}>", Rc::as_ptr(handler)),
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<Listener> for PropValue {
    fn from(handler: Listener) -> Self {
        Self::Handler(handler)
    }
}

/// Immutable prop snapshot for one element at one commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets `key`, replacing an existing value in place.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder: sets a handler prop.
    #[must_use]
    pub fn on(self, key: impl Into<String>, handler: Listener) -> Self {
        self.with(key, PropValue::Handler(handler))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Data value for `key`; `null` counts as absent.
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.get(key)
            .and_then(PropValue::as_data)
            .filter(|value| !value.is_null())
    }

    pub fn handler(&self, key: &str) -> Option<&Listener> {
        self.get(key).and_then(PropValue::as_handler)
    }

    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(PropValue::is_truthy)
    }

    /// Deserializes the data value for `key`.
    ///
    /// Returns `None` when the prop is absent. A present but malformed value is
    /// logged and treated as absent.
    pub fn parse<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(prop = key, %value, error = %err, "ignoring malformed prop");
                None
            }
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Changed props for one element, as `(prop name, new value)` pairs.
///
/// A `None` value means the prop was removed in the new snapshot.
pub type UpdatePayload = Vec<(String, Option<PropValue>)>;

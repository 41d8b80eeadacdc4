//! Native object capability surface.
//!
//! The core never talks to a windowing system directly. Everything it needs from the
//! process singleton, windows, and menus goes through these traits, and a single
//! [`NativeHost`] handle is threaded through element constructors.
//!
//! Native objects behave like shared platform handles: every method takes `&self`, so
//! implementations use interior mutability.

use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::props::Listener;
use crate::error::NativeError;

/// Subscription surface shared by every native object.
pub trait Emitter {
    fn on(&self, event: &str, listener: Listener);

    /// Detaches `listener` if it is attached to `event`. Matching is by identity.
    fn remove_listener(&self, event: &str, listener: &Listener);
}

/// Dock/taskbar attention requests.
pub trait Dock {
    /// Starts a bounce and returns its id.
    fn bounce(&self, kind: Option<&Value>) -> i64;

    fn cancel_bounce(&self, id: i64);
}

/// The process-level application singleton.
pub trait NativeApp: Emitter {
    /// Registers a listener that fires at most once.
    fn once(&self, event: &str, listener: Listener);

    /// Dock integration, absent on platforms without one.
    fn dock(&self) -> Option<Rc<dyn Dock>>;

    fn argv(&self) -> Vec<String> {
        std::env::args().collect()
    }

    fn cwd(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_default()
    }
}

/// Width and height, serialized as a `[width, height]` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size(pub u32, pub u32);

/// Screen coordinates, serialized as an `[x, y]` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub i32, pub i32);

/// Construction options for a native window.
#[derive(Clone, Default)]
pub struct WindowOptions {
    pub show: bool,
    /// Parent handle; must already exist when the child is constructed.
    pub parent: Option<Rc<dyn NativeWindow>>,
}

impl std::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("show", &self.show)
            .field("parent", &self.parent.as_ref().map(|parent| parent.id()))
            .finish()
    }
}

pub trait NativeWindow: Emitter {
    /// Platform id, used for diagnostics only.
    fn id(&self) -> u64;

    fn set_size(&self, size: Size);
    fn size(&self) -> Size;

    fn set_resizable(&self, resizable: bool);
    fn is_resizable(&self) -> bool;

    fn set_position(&self, position: Position);
    fn position(&self) -> Position;

    fn set_movable(&self, movable: bool);
    fn is_movable(&self) -> bool;

    fn load_url(&self, url: &str);

    fn destroy(&self);
}

pub trait NativeMenu: Emitter {}

/// Entry point to the platform: the app singleton plus object constructors.
pub trait NativeHost {
    fn app(&self) -> Rc<dyn NativeApp>;

    fn create_window(&self, options: WindowOptions) -> Result<Rc<dyn NativeWindow>, NativeError>;

    fn create_menu(&self) -> Result<Rc<dyn NativeMenu>, NativeError>;
}

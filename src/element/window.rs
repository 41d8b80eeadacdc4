//! Native window element.
//!
//! A window moves through three states:
//!
//! - `Pending`: constructed inside another window whose handle does not exist yet.
//!   The native constructor needs the parent handle, so creation waits until the
//!   parent binds this node (see `HostRenderer::bind_window`).
//! - `Live`: the native handle exists.
//! - `Closed`: terminal. Set by the native `closed` event or by destruction; every
//!   later commit is dropped.
//!
//! Size and position follow the same rule set, each with its own prop names:
//!
//! | props present           | resizable / movable | native value set from |
//! |-------------------------|---------------------|-----------------------|
//! | neither                 | true                | unchanged             |
//! | `defaultSize` only      | true                | `defaultSize`         |
//! | `size`, no `onResize`   | false               | `size`                |
//! | `size` + `onResize`     | true                | `size`                |
//!
//! `defaultSize` is re-applied on every commit where it is present, not only at mount.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::core::event_manager::EventManager;
use crate::core::native::{NativeHost, NativeWindow, Position, Size, WindowOptions};
use crate::core::props::{Listener, PropValue, Props, UpdatePayload};
use crate::element::base::{self, HostElement, PropHandler, PropTable};
use crate::element::{ElementId, ElementType};
use crate::error::HostError;

const URL_SCHEMES: &[&str] = &["file://", "http://", "https://"];

/// Prop registered outside the table; it gates every later commit.
const ON_CLOSED: &str = "onClosed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowProp {
    Size,
    Position,
    Path,
}

const WINDOW_PROPS: &[(&str, PropHandler<WindowProp>)] = &[
    ("defaultSize", PropHandler::Single(WindowProp::Size)),
    ("size", PropHandler::Single(WindowProp::Size)),
    ("onResize", PropHandler::Single(WindowProp::Size)),
    ("defaultPosition", PropHandler::Single(WindowProp::Position)),
    ("position", PropHandler::Single(WindowProp::Position)),
    ("onMove", PropHandler::Single(WindowProp::Position)),
    ("path", PropHandler::Single(WindowProp::Path)),
];

static WINDOW_TABLE: Lazy<PropTable<WindowProp>> =
    Lazy::new(|| PropTable::build(WINDOW_PROPS, &[]));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    Pending,
    Live,
    Closed,
}

/// Either axis of window geometry.
#[derive(Clone, Copy, Debug)]
enum Axis {
    Size,
    Position,
}

impl Axis {
    fn fixed_key(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Position => "position",
        }
    }

    fn default_key(self) -> &'static str {
        match self {
            Self::Size => "defaultSize",
            Self::Position => "defaultPosition",
        }
    }

    fn handler_key(self) -> &'static str {
        match self {
            Self::Size => "onResize",
            Self::Position => "onMove",
        }
    }

    /// Whether `name` is one of the props that drive this axis.
    fn owns(self, name: &str) -> bool {
        name == self.fixed_key() || name == self.default_key() || name == self.handler_key()
    }

    fn event(self) -> &'static str {
        match self {
            Self::Size => "resize",
            Self::Position => "move",
        }
    }

    fn read(self, window: &dyn NativeWindow) -> Value {
        match self {
            Self::Size => json!(window.size()),
            Self::Position => json!(window.position()),
        }
    }
}

/// Native listener that reads live geometry and forwards it to a user handler.
struct Forwarder {
    handler: Listener,
    listener: Listener,
}

pub struct WindowElement {
    props: Props,
    host: Rc<dyn NativeHost>,
    show: bool,
    handle: Option<Rc<dyn NativeWindow>>,
    closed: Rc<Cell<bool>>,
    on_closed: Rc<RefCell<Option<Listener>>>,
    mount_deferred: bool,
    events: EventManager,
    resize: Option<Forwarder>,
    movement: Option<Forwarder>,
    child_windows: Vec<ElementId>,
}

impl WindowElement {
    /// Creates the element. Unless `nested` (tree-parent is a window), the native
    /// handle is created immediately.
    pub fn new(
        host: Rc<dyn NativeHost>,
        props: Props,
        nested: bool,
        force_show: bool,
    ) -> Result<Self, HostError> {
        let show = force_show || props.is_truthy("show");
        let mut window = Self {
            props,
            host,
            show,
            handle: None,
            closed: Rc::new(Cell::new(false)),
            on_closed: Rc::new(RefCell::new(None)),
            mount_deferred: false,
            events: EventManager::new(),
            resize: None,
            movement: None,
            child_windows: Vec::new(),
        };
        if !nested {
            window.bind(None)?;
        }
        Ok(window)
    }

    pub fn state(&self) -> WindowState {
        if self.closed.get() {
            WindowState::Closed
        } else if self.handle.is_some() {
            WindowState::Live
        } else {
            WindowState::Pending
        }
    }

    /// Native handle while the window is live.
    pub fn live_handle(&self) -> Option<Rc<dyn NativeWindow>> {
        match self.state() {
            WindowState::Live => self.handle.clone(),
            WindowState::Pending | WindowState::Closed => None,
        }
    }

    pub fn handle(&self) -> Option<&Rc<dyn NativeWindow>> {
        self.handle.as_ref()
    }

    pub fn child_windows(&self) -> &[ElementId] {
        &self.child_windows
    }

    /// Creates the native handle under `parent` and replays a mount that arrived
    /// while pending. No-op unless pending.
    pub fn bind(&mut self, parent: Option<Rc<dyn NativeWindow>>) -> Result<(), HostError> {
        if self.state() != WindowState::Pending {
            return Ok(());
        }

        let handle = self.host.create_window(WindowOptions {
            show: self.show,
            parent,
        })?;
        tracing::debug!(window = handle.id(), show = self.show, "window bound");

        let closed = Rc::clone(&self.closed);
        let on_closed = Rc::clone(&self.on_closed);
        let closed_listener: Listener = Rc::new(move |args: &[Value]| {
            closed.set(true);
            let handler = on_closed.borrow().clone();
            if let Some(handler) = handler {
                handler(args);
            }
        });
        self.events.register(handle.as_ref(), "closed", Some(&closed_listener));
        self.handle = Some(handle);

        if self.mount_deferred {
            self.mount_deferred = false;
            let props = self.props.clone();
            self.commit_mount(&props)?;
        }
        Ok(())
    }

    pub(crate) fn append_child(&mut self, child: ElementId, child_type: ElementType) {
        if child_type == ElementType::Window && !self.child_windows.contains(&child) {
            self.child_windows.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: ElementId) {
        self.child_windows.retain(|id| *id != child);
    }

    /// Releases the native handle and every subscription; the window ends closed.
    pub(crate) fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.events.clear(handle.as_ref());
            if !self.closed.get() {
                tracing::debug!(window = handle.id(), "window destroyed");
                handle.destroy();
            }
        }
        self.resize = None;
        self.movement = None;
        self.closed.set(true);
    }

    fn sync_on_closed(&self, props: &Props) {
        *self.on_closed.borrow_mut() = props.handler(ON_CLOSED).cloned();
    }

    fn apply_geometry(&mut self, axis: Axis, props: &Props) {
        let Some(handle) = self.live_handle() else {
            return;
        };
        let handler = props.handler(axis.handler_key());

        match axis {
            Axis::Size => match props.parse::<Size>(axis.fixed_key()) {
                Some(size) => {
                    handle.set_resizable(handler.is_some());
                    handle.set_size(size);
                }
                None => {
                    handle.set_resizable(true);
                    if let Some(size) = props.parse::<Size>(axis.default_key()) {
                        handle.set_size(size);
                    }
                }
            },
            Axis::Position => match props.parse::<Position>(axis.fixed_key()) {
                Some(position) => {
                    handle.set_movable(handler.is_some());
                    handle.set_position(position);
                }
                None => {
                    handle.set_movable(true);
                    if let Some(position) = props.parse::<Position>(axis.default_key()) {
                        handle.set_position(position);
                    }
                }
            },
        }

        self.sync_forwarder(axis, &handle, handler);
    }

    /// Keeps the geometry listener in step with the user handler. The forwarding
    /// listener is only rebuilt when the handler itself changes.
    fn sync_forwarder(
        &mut self,
        axis: Axis,
        handle: &Rc<dyn NativeWindow>,
        handler: Option<&Listener>,
    ) {
        let slot = match axis {
            Axis::Size => &mut self.resize,
            Axis::Position => &mut self.movement,
        };

        match handler {
            None => *slot = None,
            Some(handler) => {
                let current = slot
                    .as_ref()
                    .is_some_and(|forwarder| Rc::ptr_eq(&forwarder.handler, handler));
                if !current {
                    *slot = Some(Forwarder {
                        handler: Rc::clone(handler),
                        listener: forward_geometry(axis, handle, handler),
                    });
                }
            }
        }

        let listener = slot.as_ref().map(|forwarder| &forwarder.listener);
        self.events.register(handle.as_ref(), axis.event(), listener);
    }

    fn apply_path(&self, value: Option<&PropValue>) {
        let Some(handle) = self.live_handle() else {
            return;
        };
        let Some(path) = value.and_then(PropValue::as_data).and_then(Value::as_str) else {
            return;
        };
        handle.load_url(&resolve_url(path));
    }
}

fn forward_geometry(axis: Axis, handle: &Rc<dyn NativeWindow>, handler: &Listener) -> Listener {
    let window = Rc::downgrade(handle);
    let handler = Rc::clone(handler);
    Rc::new(move |_args: &[Value]| {
        if let Some(window) = window.upgrade() {
            handler(&[axis.read(window.as_ref())]);
        }
    })
}

/// Prefixes `file://` unless `path` already carries a recognized scheme.
pub fn resolve_url(path: &str) -> Cow<'_, str> {
    if URL_SCHEMES.iter().any(|scheme| path.starts_with(scheme)) {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("file://{path}"))
    }
}

impl HostElement for WindowElement {
    type Handler = WindowProp;

    fn element_type(&self) -> ElementType {
        ElementType::Window
    }

    fn props(&self) -> &Props {
        &self.props
    }

    fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    fn handled_props(&self) -> &'static [(&'static str, PropHandler<WindowProp>)] {
        WINDOW_PROPS
    }

    fn combined_handlers(&self) -> &'static PropTable<WindowProp> {
        &WINDOW_TABLE
    }

    fn apply_prop(
        &mut self,
        handler: WindowProp,
        value: Option<&PropValue>,
        new_props: &Props,
        _old_props: &Props,
    ) -> Result<(), HostError> {
        match handler {
            WindowProp::Size => self.apply_geometry(Axis::Size, new_props),
            WindowProp::Position => self.apply_geometry(Axis::Position, new_props),
            WindowProp::Path => self.apply_path(value),
        }
        Ok(())
    }

    fn finalize_initial_children(&self, props: &Props) -> bool {
        props.contains(ON_CLOSED) || base::finalize_initial_children(self, props)
    }

    fn commit_mount(&mut self, props: &Props) -> Result<(), HostError> {
        match self.state() {
            WindowState::Closed => {
                tracing::trace!("dropping mount for closed window");
                Ok(())
            }
            WindowState::Pending => {
                self.mount_deferred = true;
                self.set_props(props.clone());
                Ok(())
            }
            WindowState::Live => {
                self.sync_on_closed(props);
                base::commit_mount(self, props)
            }
        }
    }

    fn prepare_update(&self, old_props: &Props, new_props: &Props) -> Option<UpdatePayload> {
        let mut payload = base::prepare_update(self, old_props, new_props).unwrap_or_default();
        let new_value = new_props.get(ON_CLOSED);
        if old_props.get(ON_CLOSED) != new_value {
            payload.push((ON_CLOSED.to_string(), new_value.cloned()));
        }
        (!payload.is_empty()).then_some(payload)
    }

    fn commit_update(
        &mut self,
        payload: &UpdatePayload,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), HostError> {
        match self.state() {
            WindowState::Closed => {
                tracing::trace!("dropping update for closed window");
                Ok(())
            }
            WindowState::Pending => {
                self.set_props(new_props.clone());
                Ok(())
            }
            WindowState::Live => {
                self.sync_on_closed(new_props);
                base::commit_update(self, payload, old_props, new_props)?;
                for axis in [Axis::Size, Axis::Position] {
                    let applied = payload.iter().any(|(name, _)| axis.owns(name));
                    if !applied
                        && new_props.contains(axis.default_key())
                        && !new_props.contains(axis.fixed_key())
                    {
                        self.apply_geometry(axis, new_props);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_paths_become_file_urls() {
        assert_eq!(resolve_url("a/b.html"), "file://a/b.html");
        assert_eq!(resolve_url("/abs/index.html"), "file:///abs/index.html");
        assert_eq!(resolve_url(""), "file://");
    }

    #[test]
    fn known_schemes_load_verbatim() {
        for url in ["https://x", "http://localhost:3000", "file:///tmp/a.html"] {
            assert!(matches!(resolve_url(url), Cow::Borrowed(_)));
            assert_eq!(resolve_url(url), url);
        }
    }

    #[test]
    fn geometry_axes_use_their_own_names() {
        assert_eq!(Axis::Size.event(), "resize");
        assert_eq!(Axis::Position.event(), "move");
        assert_eq!(Axis::Position.handler_key(), "onMove");
        assert_eq!(Axis::Size.default_key(), "defaultSize");
        assert!(Axis::Size.owns("onResize"));
        assert!(!Axis::Size.owns("defaultPosition"));
    }
}

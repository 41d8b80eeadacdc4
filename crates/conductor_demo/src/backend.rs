//! Native backend that only logs. Stands in for a real windowing system.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use conductor::{
    Dock, Emitter, Listener, NativeApp, NativeError, NativeHost, NativeMenu, NativeWindow,
    Position, Size, WindowOptions,
};
use serde_json::Value;

#[derive(Default)]
struct Listeners {
    entries: RefCell<Vec<(String, Listener, bool)>>,
}

impl Listeners {
    fn add(&self, event: &str, listener: Listener, once: bool) {
        self.entries
            .borrow_mut()
            .push((event.to_string(), listener, once));
    }

    fn remove(&self, event: &str, listener: &Listener) {
        self.entries
            .borrow_mut()
            .retain(|(name, existing, _)| !(name == event && Rc::ptr_eq(existing, listener)));
    }

    fn emit(&self, event: &str, args: &[Value]) {
        let fired: Vec<Listener> = {
            let mut entries = self.entries.borrow_mut();
            let fired = entries
                .iter()
                .filter(|(name, _, _)| name == event)
                .map(|(_, listener, _)| Rc::clone(listener))
                .collect();
            entries.retain(|(name, _, once)| !(name == event && *once));
            fired
        };
        for listener in fired {
            listener(args);
        }
    }
}

#[derive(Default)]
pub struct LogDock {
    next_id: Cell<i64>,
}

impl Dock for LogDock {
    fn bounce(&self, kind: Option<&Value>) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        tracing::info!(id, ?kind, "dock.bounce");
        id
    }

    fn cancel_bounce(&self, id: i64) {
        tracing::info!(id, "dock.cancelBounce");
    }
}

#[derive(Default)]
pub struct LogApp {
    listeners: Listeners,
    dock: Rc<LogDock>,
}

impl LogApp {
    pub fn emit(&self, event: &str, args: &[Value]) {
        tracing::info!(event, "app emit");
        self.listeners.emit(event, args);
    }
}

impl Emitter for LogApp {
    fn on(&self, event: &str, listener: Listener) {
        tracing::info!(event, "app.on");
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        tracing::info!(event, "app.removeListener");
        self.listeners.remove(event, listener);
    }
}

impl NativeApp for LogApp {
    fn once(&self, event: &str, listener: Listener) {
        tracing::info!(event, "app.once");
        self.listeners.add(event, listener, true);
    }

    fn dock(&self) -> Option<Rc<dyn Dock>> {
        Some(Rc::clone(&self.dock) as Rc<dyn Dock>)
    }
}

pub struct LogWindow {
    id: u64,
    listeners: Listeners,
    size: Cell<Size>,
    resizable: Cell<bool>,
    position: Cell<Position>,
    movable: Cell<bool>,
}

impl LogWindow {
    pub fn emit(&self, event: &str, args: &[Value]) {
        tracing::info!(window = self.id, event, "window emit");
        self.listeners.emit(event, args);
    }
}

impl Emitter for LogWindow {
    fn on(&self, event: &str, listener: Listener) {
        tracing::info!(window = self.id, event, "window.on");
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        tracing::info!(window = self.id, event, "window.removeListener");
        self.listeners.remove(event, listener);
    }
}

impl NativeWindow for LogWindow {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_size(&self, size: Size) {
        tracing::info!(window = self.id, ?size, "window.setSize");
        self.size.set(size);
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn set_resizable(&self, resizable: bool) {
        tracing::info!(window = self.id, resizable, "window.setResizable");
        self.resizable.set(resizable);
    }

    fn is_resizable(&self) -> bool {
        self.resizable.get()
    }

    fn set_position(&self, position: Position) {
        tracing::info!(window = self.id, ?position, "window.setPosition");
        self.position.set(position);
    }

    fn position(&self) -> Position {
        self.position.get()
    }

    fn set_movable(&self, movable: bool) {
        tracing::info!(window = self.id, movable, "window.setMovable");
        self.movable.set(movable);
    }

    fn is_movable(&self) -> bool {
        self.movable.get()
    }

    fn load_url(&self, url: &str) {
        tracing::info!(window = self.id, url, "window.loadURL");
    }

    fn destroy(&self) {
        tracing::info!(window = self.id, "window.destroy");
    }
}

pub struct LogMenu {
    id: u64,
    listeners: Listeners,
}

impl Emitter for LogMenu {
    fn on(&self, event: &str, listener: Listener) {
        tracing::info!(menu = self.id, event, "menu.on");
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        tracing::info!(menu = self.id, event, "menu.removeListener");
        self.listeners.remove(event, listener);
    }
}

impl NativeMenu for LogMenu {}

#[derive(Default)]
pub struct LogHost {
    app: Rc<LogApp>,
    windows: RefCell<Vec<Rc<LogWindow>>>,
    next_id: Cell<u64>,
}

impl LogHost {
    pub fn native_app(&self) -> &Rc<LogApp> {
        &self.app
    }

    pub fn windows(&self) -> Vec<Rc<LogWindow>> {
        self.windows.borrow().clone()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl NativeHost for LogHost {
    fn app(&self) -> Rc<dyn NativeApp> {
        Rc::clone(&self.app) as Rc<dyn NativeApp>
    }

    fn create_window(&self, options: WindowOptions) -> Result<Rc<dyn NativeWindow>, NativeError> {
        let id = self.next_id();
        tracing::info!(window = id, ?options, "new BrowserWindow");
        let window = Rc::new(LogWindow {
            id,
            listeners: Listeners::default(),
            size: Cell::new(Size(800, 600)),
            resizable: Cell::new(true),
            position: Cell::new(Position(0, 0)),
            movable: Cell::new(true),
        });
        self.windows.borrow_mut().push(Rc::clone(&window));
        Ok(window)
    }

    fn create_menu(&self) -> Result<Rc<dyn NativeMenu>, NativeError> {
        let id = self.next_id();
        tracing::info!(menu = id, "new Menu");
        Ok(Rc::new(LogMenu {
            id,
            listeners: Listeners::default(),
        }))
    }
}

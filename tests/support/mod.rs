#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use conductor::{
    create_container, listener, Container, Dock, Emitter, EnvConfig, Listener, NativeApp, NativeError,
    NativeHost, NativeMenu, NativeWindow, Position, Size, WindowOptions,
};
use serde_json::Value;

/// Which native object a call was made on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    App,
    Window(u64),
    Menu(u64),
}

/// One native call, in the order the core made it.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateWindow {
        window: u64,
        show: bool,
        parent: Option<u64>,
    },
    CreateMenu {
        menu: u64,
    },
    On {
        target: Target,
        event: String,
    },
    Once {
        event: String,
    },
    RemoveListener {
        target: Target,
        event: String,
    },
    SetSize {
        window: u64,
        size: Size,
    },
    SetResizable {
        window: u64,
        resizable: bool,
    },
    SetPosition {
        window: u64,
        position: Position,
    },
    SetMovable {
        window: u64,
        movable: bool,
    },
    LoadUrl {
        window: u64,
        url: String,
    },
    Destroy {
        window: u64,
    },
    Bounce {
        kind: Option<Value>,
        id: i64,
    },
    CancelBounce {
        id: i64,
    },
}

type Trace = Rc<RefCell<Vec<Call>>>;

struct Subscription {
    event: String,
    listener: Listener,
    once: bool,
}

/// Listener table shared by every recording object.
#[derive(Default)]
struct Listeners {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl Listeners {
    fn add(&self, event: &str, listener: Listener, once: bool) {
        self.subscriptions.borrow_mut().push(Subscription {
            event: event.to_string(),
            listener,
            once,
        });
    }

    fn remove(&self, event: &str, listener: &Listener) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        if let Some(index) = subscriptions
            .iter()
            .position(|sub| sub.event == event && Rc::ptr_eq(&sub.listener, listener))
        {
            subscriptions.remove(index);
        }
    }

    fn count(&self, event: &str) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|sub| sub.event == event)
            .count()
    }

    /// Calls every listener for `event`, dropping `once` subscriptions first.
    fn emit(&self, event: &str, args: &[Value]) -> usize {
        let fired: Vec<Listener> = {
            let mut subscriptions = self.subscriptions.borrow_mut();
            let fired = subscriptions
                .iter()
                .filter(|sub| sub.event == event)
                .map(|sub| Rc::clone(&sub.listener))
                .collect();
            subscriptions.retain(|sub| !(sub.event == event && sub.once));
            fired
        };
        for listener in &fired {
            listener(args);
        }
        fired.len()
    }
}

pub struct RecordingDock {
    trace: Trace,
    next_id: Cell<i64>,
}

impl Dock for RecordingDock {
    fn bounce(&self, kind: Option<&Value>) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.trace.borrow_mut().push(Call::Bounce {
            kind: kind.cloned(),
            id,
        });
        id
    }

    fn cancel_bounce(&self, id: i64) {
        self.trace.borrow_mut().push(Call::CancelBounce { id });
    }
}

pub struct RecordingApp {
    trace: Trace,
    listeners: Listeners,
    dock: Option<Rc<RecordingDock>>,
}

impl RecordingApp {
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        self.listeners.emit(event, args)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    /// Drops every subscription without firing it.
    pub fn clear_listeners(&self) {
        self.listeners.subscriptions.borrow_mut().clear();
    }
}

impl Emitter for RecordingApp {
    fn on(&self, event: &str, listener: Listener) {
        self.trace.borrow_mut().push(Call::On {
            target: Target::App,
            event: event.to_string(),
        });
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        self.trace.borrow_mut().push(Call::RemoveListener {
            target: Target::App,
            event: event.to_string(),
        });
        self.listeners.remove(event, listener);
    }
}

impl NativeApp for RecordingApp {
    fn once(&self, event: &str, listener: Listener) {
        self.trace.borrow_mut().push(Call::Once {
            event: event.to_string(),
        });
        self.listeners.add(event, listener, true);
    }

    fn dock(&self) -> Option<Rc<dyn Dock>> {
        self.dock.clone().map(|dock| dock as Rc<dyn Dock>)
    }

    fn argv(&self) -> Vec<String> {
        vec!["conductor-test".to_string(), "--flag".to_string()]
    }

    fn cwd(&self) -> PathBuf {
        PathBuf::from("/work")
    }
}

pub struct RecordingWindow {
    id: u64,
    trace: Trace,
    listeners: Listeners,
    size: Cell<Size>,
    resizable: Cell<bool>,
    position: Cell<Position>,
    movable: Cell<bool>,
    destroyed: Cell<bool>,
}

impl RecordingWindow {
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        self.listeners.emit(event, args)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    /// Simulates the user dragging the window edge.
    pub fn user_resize(&self, size: Size) {
        self.size.set(size);
        self.emit("resize", &[]);
    }

    /// Simulates the user dragging the window.
    pub fn user_move(&self, position: Position) {
        self.position.set(position);
        self.emit("move", &[]);
    }

    /// Simulates the user closing the window.
    pub fn user_close(&self) {
        self.emit("closed", &[]);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    fn record(&self, call: Call) {
        self.trace.borrow_mut().push(call);
    }
}

impl Emitter for RecordingWindow {
    fn on(&self, event: &str, listener: Listener) {
        self.record(Call::On {
            target: Target::Window(self.id),
            event: event.to_string(),
        });
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        self.record(Call::RemoveListener {
            target: Target::Window(self.id),
            event: event.to_string(),
        });
        self.listeners.remove(event, listener);
    }
}

impl NativeWindow for RecordingWindow {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_size(&self, size: Size) {
        self.size.set(size);
        self.record(Call::SetSize {
            window: self.id,
            size,
        });
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn set_resizable(&self, resizable: bool) {
        self.resizable.set(resizable);
        self.record(Call::SetResizable {
            window: self.id,
            resizable,
        });
    }

    fn is_resizable(&self) -> bool {
        self.resizable.get()
    }

    fn set_position(&self, position: Position) {
        self.position.set(position);
        self.record(Call::SetPosition {
            window: self.id,
            position,
        });
    }

    fn position(&self) -> Position {
        self.position.get()
    }

    fn set_movable(&self, movable: bool) {
        self.movable.set(movable);
        self.record(Call::SetMovable {
            window: self.id,
            movable,
        });
    }

    fn is_movable(&self) -> bool {
        self.movable.get()
    }

    fn load_url(&self, url: &str) {
        self.record(Call::LoadUrl {
            window: self.id,
            url: url.to_string(),
        });
    }

    fn destroy(&self) {
        self.destroyed.set(true);
        self.record(Call::Destroy { window: self.id });
    }
}

pub struct RecordingMenu {
    id: u64,
    trace: Trace,
    listeners: Listeners,
}

impl Emitter for RecordingMenu {
    fn on(&self, event: &str, listener: Listener) {
        self.trace.borrow_mut().push(Call::On {
            target: Target::Menu(self.id),
            event: event.to_string(),
        });
        self.listeners.add(event, listener, false);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        self.trace.borrow_mut().push(Call::RemoveListener {
            target: Target::Menu(self.id),
            event: event.to_string(),
        });
        self.listeners.remove(event, listener);
    }
}

impl NativeMenu for RecordingMenu {}

/// Native host that records every call into one shared trace.
pub struct RecordingHost {
    trace: Trace,
    app: Rc<RecordingApp>,
    windows: RefCell<Vec<Rc<RecordingWindow>>>,
    menus: RefCell<Vec<Rc<RecordingMenu>>>,
    next_id: Cell<u64>,
    fail_windows: Cell<bool>,
}

impl RecordingHost {
    pub fn new() -> Rc<Self> {
        Self::build(true)
    }

    /// A host whose app has no dock.
    pub fn without_dock() -> Rc<Self> {
        Self::build(false)
    }

    fn build(with_dock: bool) -> Rc<Self> {
        let trace: Trace = Rc::default();
        let dock = with_dock.then(|| {
            Rc::new(RecordingDock {
                trace: Rc::clone(&trace),
                next_id: Cell::new(0),
            })
        });
        Rc::new(Self {
            app: Rc::new(RecordingApp {
                trace: Rc::clone(&trace),
                listeners: Listeners::default(),
                dock,
            }),
            trace,
            windows: RefCell::default(),
            menus: RefCell::default(),
            next_id: Cell::new(0),
            fail_windows: Cell::new(false),
        })
    }

    pub fn recording_app(&self) -> &Rc<RecordingApp> {
        &self.app
    }

    /// Windows in creation order.
    pub fn windows(&self) -> Vec<Rc<RecordingWindow>> {
        self.windows.borrow().clone()
    }

    pub fn window(&self, index: usize) -> Rc<RecordingWindow> {
        self.windows
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no window #{index}"))
    }

    pub fn menu_count(&self) -> usize {
        self.menus.borrow().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.trace.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.trace.borrow_mut())
    }

    pub fn fail_window_creation(&self) {
        self.fail_windows.set(true);
    }

    /// Fires the process-level ready event.
    pub fn fire_ready(&self, launch_info: Value) -> usize {
        self.app.emit("ready", &[launch_info])
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl NativeHost for RecordingHost {
    fn app(&self) -> Rc<dyn NativeApp> {
        Rc::clone(&self.app) as Rc<dyn NativeApp>
    }

    fn create_window(&self, options: WindowOptions) -> Result<Rc<dyn NativeWindow>, NativeError> {
        if self.fail_windows.get() {
            return Err(NativeError::construction("window", "creation disabled"));
        }
        let id = self.next_id();
        self.trace.borrow_mut().push(Call::CreateWindow {
            window: id,
            show: options.show,
            parent: options.parent.as_ref().map(|parent| parent.id()),
        });
        let window = Rc::new(RecordingWindow {
            id,
            trace: Rc::clone(&self.trace),
            listeners: Listeners::default(),
            size: Cell::new(Size(800, 600)),
            resizable: Cell::new(true),
            position: Cell::new(Position(0, 0)),
            movable: Cell::new(true),
            destroyed: Cell::new(false),
        });
        self.windows.borrow_mut().push(Rc::clone(&window));
        Ok(window)
    }

    fn create_menu(&self) -> Result<Rc<dyn NativeMenu>, NativeError> {
        let id = self.next_id();
        self.trace.borrow_mut().push(Call::CreateMenu { menu: id });
        let menu = Rc::new(RecordingMenu {
            id,
            trace: Rc::clone(&self.trace),
            listeners: Listeners::default(),
        });
        self.menus.borrow_mut().push(Rc::clone(&menu));
        Ok(menu)
    }
}

/// Handler that records the arguments of every call.
pub fn recorder() -> (Listener, Rc<RefCell<Vec<Vec<Value>>>>) {
    let seen: Rc<RefCell<Vec<Vec<Value>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let handler = listener(move |args: &[Value]| sink.borrow_mut().push(args.to_vec()));
    (handler, seen)
}

/// A recording host plus a container rendering into it.
pub fn setup() -> (Rc<RecordingHost>, Container) {
    setup_with(RecordingHost::new(), EnvConfig::default())
}

pub fn setup_with(host: Rc<RecordingHost>, config: EnvConfig) -> (Rc<RecordingHost>, Container) {
    let container = create_container(Rc::clone(&host) as Rc<dyn NativeHost>, config);
    (host, container)
}

/// Calls that touched windows, ignoring listener bookkeeping.
pub fn window_calls(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .filter(|call| {
            matches!(
                call,
                Call::CreateWindow { .. }
                    | Call::SetSize { .. }
                    | Call::SetResizable { .. }
                    | Call::SetPosition { .. }
                    | Call::SetMovable { .. }
                    | Call::LoadUrl { .. }
                    | Call::Destroy { .. }
            )
        })
        .cloned()
        .collect()
}

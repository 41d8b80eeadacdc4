//! Process singleton element.

use std::rc::Rc;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::core::event_manager::EventManager;
use crate::core::native::NativeApp;
use crate::core::props::{Listener, PropValue, Props};
use crate::element::base::{HostElement, PropHandler, PropTable};
use crate::element::root::LaunchInfo;
use crate::element::{ElementId, ElementType};
use crate::error::HostError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppProp {
    DockBounce,
    Init,
    Ready,
}

const APP_PROPS: &[(&str, PropHandler<AppProp>)] = &[
    ("dockBounce", PropHandler::Single(AppProp::DockBounce)),
    (
        "onInit",
        PropHandler::Phased {
            mount: AppProp::Init,
            update: None,
        },
    ),
    // The ready event has already fired by the time anything renders, so the
    // handler is called once at mount with the captured launch info instead.
    (
        "onReady",
        PropHandler::Phased {
            mount: AppProp::Ready,
            update: None,
        },
    ),
];

const APP_EVENTS: &[(&str, &str)] = &[
    ("onWillFinishLaunching", "will-finish-launching"),
    ("onReady", "ready"),
    ("onWindowAllClosed", "window-all-closed"),
    ("onBeforeQuit", "before-quit"),
    ("onWillQuit", "will-quit"),
    ("onQuit", "quit"),
    ("onOpenFile", "open-file"),
    ("onOpenUrl", "open-url"),
    ("onActivate", "activate"),
    ("onContinueActivity", "continue-activity"),
    ("onNewWindowForTab", "new-window-for-tab"),
    ("onBrowserWindowBlur", "browser-window-blur"),
    ("onBrowserWindowFocus", "browser-window-focus"),
    ("onBrowserWindowCreated", "browser-window-created"),
    ("onWebContentsCreated", "web-contents-created"),
    ("onCertificateError", "certificate-error"),
    ("onSelectClientCertificate", "select-client-certificate"),
    ("onLogin", "login"),
    ("onGpuProcessCrashed", "gpu-process-crashed"),
    ("onAccessibilitySupportChanged", "accessibility-support-changed"),
];

static APP_TABLE: Lazy<PropTable<AppProp>> = Lazy::new(|| PropTable::build(APP_PROPS, APP_EVENTS));

pub struct AppElement {
    props: Props,
    app: Rc<dyn NativeApp>,
    launch_info: LaunchInfo,
    events: EventManager,
    bounce_id: Option<i64>,
    child_windows: Vec<ElementId>,
    child_menus: Vec<ElementId>,
}

impl AppElement {
    pub fn new(app: Rc<dyn NativeApp>, launch_info: LaunchInfo, props: Props) -> Self {
        Self {
            props,
            app,
            launch_info,
            events: EventManager::new(),
            bounce_id: None,
            child_windows: Vec::new(),
            child_menus: Vec::new(),
        }
    }

    pub fn native(&self) -> &Rc<dyn NativeApp> {
        &self.app
    }

    pub fn child_windows(&self) -> &[ElementId] {
        &self.child_windows
    }

    pub fn child_menus(&self) -> &[ElementId] {
        &self.child_menus
    }

    pub(crate) fn append_child(&mut self, child: ElementId, child_type: ElementType) {
        let set = match child_type {
            ElementType::Window => &mut self.child_windows,
            ElementType::Menu => &mut self.child_menus,
            ElementType::Root | ElementType::App => return,
        };
        if !set.contains(&child) {
            set.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: ElementId) {
        self.child_windows.retain(|id| *id != child);
        self.child_menus.retain(|id| *id != child);
    }

    pub(crate) fn children(&self) -> Vec<ElementId> {
        self.child_windows
            .iter()
            .chain(&self.child_menus)
            .copied()
            .collect()
    }

    /// Detaches every app listener and cancels an outstanding bounce.
    pub(crate) fn destroy(&mut self) {
        self.events.clear(self.app.as_ref());
        self.cancel_bounce();
    }

    fn handle_dock_bounce(&mut self, value: Option<&PropValue>) {
        match value.filter(|value| value.is_truthy()) {
            Some(value) => {
                let Some(dock) = self.app.dock() else {
                    return;
                };
                let kind = match value.as_data() {
                    Some(Value::Bool(true)) | None => None,
                    Some(kind) => Some(kind),
                };
                let id = dock.bounce(kind);
                tracing::debug!(id, "dock bounce requested");
                self.bounce_id = Some(id);
            }
            None => self.cancel_bounce(),
        }
    }

    fn cancel_bounce(&mut self) {
        let Some(id) = self.bounce_id.take() else {
            return;
        };
        if let Some(dock) = self.app.dock() {
            tracing::debug!(id, "dock bounce cancelled");
            dock.cancel_bounce(id);
        }
    }

    fn handle_init(&self, value: Option<&PropValue>) {
        let Some(handler) = value.and_then(PropValue::as_handler) else {
            return;
        };
        let argv = self.app.argv();
        let cwd = self.app.cwd();
        handler(&[json!(argv), json!(cwd.to_string_lossy())]);
    }

    fn handle_ready(&self, value: Option<&PropValue>) {
        if let Some(handler) = value.and_then(PropValue::as_handler) {
            handler(&[self.launch_info.get()]);
        }
    }
}

impl HostElement for AppElement {
    type Handler = AppProp;

    fn element_type(&self) -> ElementType {
        ElementType::App
    }

    fn props(&self) -> &Props {
        &self.props
    }

    fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    fn handled_props(&self) -> &'static [(&'static str, PropHandler<AppProp>)] {
        APP_PROPS
    }

    fn handled_events(&self) -> &'static [(&'static str, &'static str)] {
        APP_EVENTS
    }

    fn combined_handlers(&self) -> &'static PropTable<AppProp> {
        &APP_TABLE
    }

    fn apply_prop(
        &mut self,
        handler: AppProp,
        value: Option<&PropValue>,
        _new_props: &Props,
        _old_props: &Props,
    ) -> Result<(), HostError> {
        match handler {
            AppProp::DockBounce => self.handle_dock_bounce(value),
            AppProp::Init => self.handle_init(value),
            AppProp::Ready => self.handle_ready(value),
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        event: &'static str,
        handler: Option<&Listener>,
    ) -> Result<(), HostError> {
        self.events.register(self.app.as_ref(), event, handler);
        Ok(())
    }
}

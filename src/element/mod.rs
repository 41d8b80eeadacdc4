//! Element variants and the factory that builds them from a type tag.

pub mod app;
pub mod base;
pub mod menu;
pub mod registry;
pub mod root;
pub mod window;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::core::native::{NativeHost, NativeMenu, NativeWindow};
use crate::core::props::{Props, UpdatePayload};
use crate::error::HostError;

pub use app::AppElement;
pub use base::{HostElement, PropHandler, PropTable};
pub use menu::MenuElement;
pub use registry::{ElementId, ElementRegistry};
pub use root::{LaunchInfo, RootElement};
pub use window::{WindowElement, WindowState};

/// Type tags accepted by `create_instance`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementType {
    Root,
    App,
    Window,
    Menu,
}

impl ElementType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::App => "APP",
            Self::Window => "WINDOW",
            Self::Menu => "MENU",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = HostError;

    fn from_str(ty: &str) -> Result<Self, Self::Err> {
        match ty {
            "ROOT" => Ok(Self::Root),
            "APP" => Ok(Self::App),
            "WINDOW" => Ok(Self::Window),
            "MENU" => Ok(Self::Menu),
            _ => Err(HostError::UnknownElementType { ty: ty.to_string() }),
        }
    }
}

/// What a ref on an element resolves to.
#[derive(Clone)]
pub enum PublicInstance {
    Element(ElementId),
    Window(Rc<dyn NativeWindow>),
    Menu(Rc<dyn NativeMenu>),
}

impl fmt::Debug for PublicInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(id) => f.debug_tuple("Element").field(id).finish(),
            Self::Window(window) => f.debug_tuple("Window").field(&window.id()).finish(),
            Self::Menu(_) => f.write_str("Menu"),
        }
    }
}

/// Everything a constructor may need besides the props.
pub struct ElementContext<'a> {
    pub host: &'a Rc<dyn NativeHost>,
    pub launch_info: &'a LaunchInfo,
    /// Element type of the tree-parent, when known.
    pub parent_type: Option<ElementType>,
    pub force_show_windows: bool,
}

/// One node of the lifecycle tree.
pub enum Element {
    Root(RootElement),
    App(AppElement),
    Window(WindowElement),
    Menu(MenuElement),
}

/// Builds the element variant for `ty`.
pub fn create_element(
    ty: &str,
    props: &Props,
    context: &ElementContext<'_>,
) -> Result<Element, HostError> {
    let props = props.clone();
    let element = match ty.parse::<ElementType>()? {
        ElementType::Root => Element::Root(RootElement::new(props)),
        ElementType::App => Element::App(AppElement::new(
            context.host.app(),
            context.launch_info.clone(),
            props,
        )),
        ElementType::Window => Element::Window(WindowElement::new(
            Rc::clone(context.host),
            props,
            context.parent_type == Some(ElementType::Window),
            context.force_show_windows,
        )?),
        ElementType::Menu => Element::Menu(MenuElement::new(context.host.as_ref(), props)?),
    };
    Ok(element)
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Root(_) => ElementType::Root,
            Self::App(_) => ElementType::App,
            Self::Window(_) => ElementType::Window,
            Self::Menu(_) => ElementType::Menu,
        }
    }

    pub fn props(&self) -> &Props {
        match self {
            Self::Root(root) => root.props(),
            Self::App(app) => app.props(),
            Self::Window(window) => window.props(),
            Self::Menu(menu) => menu.props(),
        }
    }

    pub fn as_root(&self) -> Option<&RootElement> {
        match self {
            Self::Root(root) => Some(root),
            _ => None,
        }
    }

    pub fn as_app(&self) -> Option<&AppElement> {
        match self {
            Self::App(app) => Some(app),
            _ => None,
        }
    }

    pub fn as_window(&self) -> Option<&WindowElement> {
        match self {
            Self::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn as_menu(&self) -> Option<&MenuElement> {
        match self {
            Self::Menu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn finalize_initial_children(&self, props: &Props) -> bool {
        match self {
            Self::Root(root) => root.finalize_initial_children(props),
            Self::App(app) => app.finalize_initial_children(props),
            Self::Window(window) => window.finalize_initial_children(props),
            Self::Menu(menu) => menu.finalize_initial_children(props),
        }
    }

    pub fn commit_mount(&mut self, props: &Props) -> Result<(), HostError> {
        match self {
            Self::Root(root) => root.commit_mount(props),
            Self::App(app) => app.commit_mount(props),
            Self::Window(window) => window.commit_mount(props),
            Self::Menu(menu) => menu.commit_mount(props),
        }
    }

    pub fn prepare_update(&self, old_props: &Props, new_props: &Props) -> Option<UpdatePayload> {
        match self {
            Self::Root(root) => root.prepare_update(old_props, new_props),
            Self::App(app) => app.prepare_update(old_props, new_props),
            Self::Window(window) => window.prepare_update(old_props, new_props),
            Self::Menu(menu) => menu.prepare_update(old_props, new_props),
        }
    }

    pub fn commit_update(
        &mut self,
        payload: &UpdatePayload,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), HostError> {
        match self {
            Self::Root(root) => root.commit_update(payload, old_props, new_props),
            Self::App(app) => app.commit_update(payload, old_props, new_props),
            Self::Window(window) => window.commit_update(payload, old_props, new_props),
            Self::Menu(menu) => menu.commit_update(payload, old_props, new_props),
        }
    }

    /// Native handle for windows and menus, the element itself otherwise.
    pub fn public_instance(&self, id: ElementId) -> PublicInstance {
        match self {
            Self::Window(window) => window
                .handle()
                .map(|handle| PublicInstance::Window(Rc::clone(handle)))
                .unwrap_or(PublicInstance::Element(id)),
            Self::Menu(menu) => PublicInstance::Menu(Rc::clone(menu.native())),
            Self::Root(_) | Self::App(_) => PublicInstance::Element(id),
        }
    }

    pub(crate) fn append_child(
        &mut self,
        child: ElementId,
        child_type: ElementType,
    ) -> Result<(), HostError> {
        match self {
            Self::Root(root) => root.append_child(child, child_type)?,
            Self::App(app) => app.append_child(child, child_type),
            Self::Window(window) => window.append_child(child, child_type),
            Self::Menu(_) => {}
        }
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, child: ElementId) {
        match self {
            Self::Root(root) => root.remove_child(child),
            Self::App(app) => app.remove_child(child),
            Self::Window(window) => window.remove_child(child),
            Self::Menu(_) => {}
        }
    }

    /// Registered children, in append order.
    pub fn children(&self) -> Vec<ElementId> {
        match self {
            Self::Root(root) => root.app().into_iter().collect(),
            Self::App(app) => app.children(),
            Self::Window(window) => window.child_windows().to_vec(),
            Self::Menu(_) => Vec::new(),
        }
    }

    pub(crate) fn destroy(&mut self) {
        match self {
            Self::Root(_) => {}
            Self::App(app) => app.destroy(),
            Self::Window(window) => window.destroy(),
            Self::Menu(menu) => menu.destroy(),
        }
    }
}

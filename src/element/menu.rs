//! Native menu element.
//!
//! Menus do nothing until they are installed as the application menu or popped up
//! as a context menu, so for now this only owns the native object and exposes it.

use std::convert::Infallible;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::core::event_manager::EventManager;
use crate::core::native::{NativeHost, NativeMenu};
use crate::core::props::{Listener, PropValue, Props};
use crate::element::base::{HostElement, PropTable};
use crate::element::ElementType;
use crate::error::HostError;

static MENU_TABLE: Lazy<PropTable<Infallible>> = Lazy::new(|| PropTable::build(&[], &[]));

pub struct MenuElement {
    props: Props,
    menu: Rc<dyn NativeMenu>,
    events: EventManager,
}

impl MenuElement {
    pub fn new(host: &dyn NativeHost, props: Props) -> Result<Self, HostError> {
        let menu = host.create_menu()?;
        Ok(Self {
            props,
            menu,
            events: EventManager::new(),
        })
    }

    pub fn native(&self) -> &Rc<dyn NativeMenu> {
        &self.menu
    }

    pub(crate) fn destroy(&mut self) {
        self.events.clear(self.menu.as_ref());
    }
}

impl HostElement for MenuElement {
    type Handler = Infallible;

    fn element_type(&self) -> ElementType {
        ElementType::Menu
    }

    fn props(&self) -> &Props {
        &self.props
    }

    fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    fn combined_handlers(&self) -> &'static PropTable<Infallible> {
        &MENU_TABLE
    }

    fn apply_prop(
        &mut self,
        handler: Infallible,
        _value: Option<&PropValue>,
        _new_props: &Props,
        _old_props: &Props,
    ) -> Result<(), HostError> {
        match handler {}
    }

    fn handle_event(
        &mut self,
        event: &'static str,
        handler: Option<&Listener>,
    ) -> Result<(), HostError> {
        self.events.register(self.menu.as_ref(), event, handler);
        Ok(())
    }
}

//! Container element at the top of every tree.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::core::props::{PropValue, Props};
use crate::element::base::{HostElement, PropTable};
use crate::element::{ElementId, ElementType};
use crate::error::HostError;

/// Launch payload captured when the process reports ready.
///
/// Shared between the root and the app element that reads it at mount.
#[derive(Clone, Debug, Default)]
pub struct LaunchInfo(Rc<RefCell<Option<Value>>>);

impl LaunchInfo {
    pub fn set(&self, info: Value) {
        *self.0.borrow_mut() = Some(info);
    }

    /// The captured payload, `null` before the ready signal.
    pub fn get(&self) -> Value {
        self.0.borrow().clone().unwrap_or(Value::Null)
    }
}

static ROOT_TABLE: Lazy<PropTable<Infallible>> = Lazy::new(|| PropTable::build(&[], &[]));

#[derive(Debug, Default)]
pub struct RootElement {
    props: Props,
    app: Option<ElementId>,
    launch_info: LaunchInfo,
}

impl RootElement {
    pub fn new(props: Props) -> Self {
        Self {
            props,
            ..Self::default()
        }
    }

    pub fn launch_info(&self) -> &LaunchInfo {
        &self.launch_info
    }

    pub fn app(&self) -> Option<ElementId> {
        self.app
    }

    pub(crate) fn append_child(
        &mut self,
        child: ElementId,
        child_type: ElementType,
    ) -> Result<(), HostError> {
        if child_type != ElementType::App {
            return Err(HostError::InvalidRootChild { found: child_type });
        }
        if let Some(existing) = self.app.filter(|existing| *existing != child) {
            return Err(HostError::RootOccupied { existing });
        }
        self.app = Some(child);
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, child: ElementId) {
        if self.app == Some(child) {
            self.app = None;
        }
    }
}

impl HostElement for RootElement {
    type Handler = Infallible;

    fn element_type(&self) -> ElementType {
        ElementType::Root
    }

    fn props(&self) -> &Props {
        &self.props
    }

    fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    fn combined_handlers(&self) -> &'static PropTable<Infallible> {
        &ROOT_TABLE
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
}

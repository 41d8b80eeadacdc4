//! Host config: the adapter a description engine calls into.
//!
//! [`HostConfig`] is the fixed contract; [`HostRenderer`] implements it over an
//! element arena. Instances are [`ElementId`]s, and the container is the root
//! element's id.

use std::convert::Infallible;
use std::rc::Rc;

use serde_json::Value;

use crate::config::EnvConfig;
use crate::core::native::{NativeApp, NativeHost, NativeWindow};
use crate::core::props::{Props, UpdatePayload};
use crate::element::{
    create_element, Element, ElementContext, ElementId, ElementRegistry, ElementType, LaunchInfo,
    PublicInstance, RootElement, WindowState,
};
use crate::error::HostError;

/// Operations a description engine performs on host objects.
pub trait HostConfig {
    type Instance: Copy + Eq;
    type TextInstance;
    type Container: Copy;
    type HostContext: Clone;
    type UpdatePayload;
    type PublicInstance;
    type Error;

    /// The container handed to `create_instance` and the `*_container` operations.
    fn root_container(&self) -> Self::Container;

    fn get_root_host_context(&self, container: Self::Container) -> Self::HostContext;

    /// Context for the children of a node of type `ty`.
    fn get_child_host_context(&self, parent: &Self::HostContext, ty: &str) -> Self::HostContext;

    fn create_instance(
        &mut self,
        ty: &str,
        props: &Props,
        container: Self::Container,
        host_context: &Self::HostContext,
    ) -> Result<Self::Instance, Self::Error>;

    fn create_text_instance(
        &mut self,
        text: &str,
        container: Self::Container,
        host_context: &Self::HostContext,
    ) -> Result<Self::TextInstance, Self::Error>;

    fn should_set_text_content(&self, ty: &str, props: &Props) -> bool;

    fn append_initial_child(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
    ) -> Result<(), Self::Error>;

    /// Whether `commit_mount` must run for this instance.
    fn finalize_initial_children(
        &mut self,
        instance: Self::Instance,
        ty: &str,
        props: &Props,
    ) -> bool;

    fn prepare_update(
        &self,
        instance: Self::Instance,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Self::UpdatePayload>;

    fn prepare_for_commit(&mut self) {}

    fn reset_after_commit(&mut self) {}

    fn commit_mount(
        &mut self,
        instance: Self::Instance,
        ty: &str,
        props: &Props,
    ) -> Result<(), Self::Error>;

    fn commit_update(
        &mut self,
        instance: Self::Instance,
        payload: &Self::UpdatePayload,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), Self::Error>;

    fn append_child(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn append_child_to_container(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn insert_before(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
        before: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn insert_in_container_before(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
        before: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn remove_child(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn remove_child_from_container(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
    ) -> Result<(), Self::Error>;

    fn get_public_instance(&self, instance: Self::Instance) -> Self::PublicInstance;

    /// Called for an instance that was created but will never be committed.
    fn detach_deleted_instance(&mut self, _instance: Self::Instance) {}
}

/// Host context threaded top-down: the element type of the tree-parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostContext {
    pub parent_type: Option<ElementType>,
}

pub struct HostRenderer {
    host: Rc<dyn NativeHost>,
    config: EnvConfig,
    registry: ElementRegistry,
    root: ElementId,
    launch_info: LaunchInfo,
}

impl HostRenderer {
    pub fn new(host: Rc<dyn NativeHost>) -> Self {
        Self::with_config(host, EnvConfig::default())
    }

    pub fn with_config(host: Rc<dyn NativeHost>, config: EnvConfig) -> Self {
        let root = RootElement::new(Props::new());
        let launch_info = root.launch_info().clone();
        let mut registry = ElementRegistry::new();
        let root = registry.insert(Element::Root(root));
        Self {
            host,
            config,
            registry,
            root,
            launch_info,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn app(&self) -> Rc<dyn NativeApp> {
        self.host.app()
    }

    /// Stores the payload the app element hands to `onReady`.
    pub fn set_launch_info(&self, info: Value) {
        self.launch_info.set(info);
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.registry.get(id)
    }

    /// The app element currently mounted under the root.
    pub fn app_element(&self) -> Option<ElementId> {
        self.registry
            .get(self.root)
            .and_then(Element::as_root)
            .and_then(RootElement::app)
    }

    pub fn live_elements(&self) -> usize {
        self.registry.len()
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, HostError> {
        self.registry
            .get_mut(id)
            .ok_or(HostError::UnknownInstance { id })
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        let child_type = self
            .registry
            .get(child)
            .map(Element::element_type)
            .ok_or(HostError::UnknownInstance { id: child })?;
        let parent_element = self.element_mut(parent)?;
        parent_element.append_child(child, child_type)?;

        let parent_handle = match parent_element {
            Element::Window(window) => window.live_handle(),
            _ => None,
        };
        match parent_handle {
            Some(handle) if child_type == ElementType::Window => self.bind_window(child, handle),
            _ => Ok(()),
        }
    }

    /// Second construction pass for nested windows: creates the pending window's
    /// handle under `parent`, then does the same for its own pending children.
    fn bind_window(
        &mut self,
        id: ElementId,
        parent: Rc<dyn NativeWindow>,
    ) -> Result<(), HostError> {
        let Some(Element::Window(window)) = self.registry.get_mut(id) else {
            return Ok(());
        };
        if window.state() != WindowState::Pending {
            return Ok(());
        }
        window.bind(Some(parent))?;

        let Some(handle) = window.live_handle() else {
            return Ok(());
        };
        for child in window.child_windows().to_vec() {
            self.bind_window(child, Rc::clone(&handle))?;
        }
        Ok(())
    }

    fn detach(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        self.element_mut(parent)?.remove_child(child);
        self.destroy_subtree(child);
        Ok(())
    }

    /// Destroys `id` before its descendants.
    fn destroy_subtree(&mut self, id: ElementId) {
        let Some(mut element) = self.registry.remove(id) else {
            return;
        };
        tracing::debug!(?id, ty = %element.element_type(), "destroying element");
        let children = element.children();
        element.destroy();
        for child in children {
            self.destroy_subtree(child);
        }
    }
}

impl HostConfig for HostRenderer {
    type Instance = ElementId;
    type TextInstance = Infallible;
    type Container = ElementId;
    type HostContext = HostContext;
    type UpdatePayload = UpdatePayload;
    type PublicInstance = PublicInstance;
    type Error = HostError;

    fn root_container(&self) -> ElementId {
        self.root
    }

    fn get_root_host_context(&self, _container: ElementId) -> HostContext {
        HostContext::default()
    }

    fn get_child_host_context(&self, _parent: &HostContext, ty: &str) -> HostContext {
        HostContext {
            parent_type: ty.parse().ok(),
        }
    }

    fn create_instance(
        &mut self,
        ty: &str,
        props: &Props,
        container: ElementId,
        host_context: &HostContext,
    ) -> Result<ElementId, HostError> {
        let launch_info = self
            .registry
            .get(container)
            .and_then(Element::as_root)
            .map(|root| root.launch_info().clone())
            .unwrap_or_else(|| self.launch_info.clone());
        let context = ElementContext {
            host: &self.host,
            launch_info: &launch_info,
            parent_type: host_context.parent_type,
            force_show_windows: self.config.force_show_windows,
        };
        let element = create_element(ty, props, &context)?;
        let id = self.registry.insert(element);
        tracing::debug!(?id, ty, "created instance");
        Ok(id)
    }

    fn create_text_instance(
        &mut self,
        text: &str,
        _container: ElementId,
        _host_context: &HostContext,
    ) -> Result<Infallible, HostError> {
        Err(HostError::TextUnsupported {
            text: text.to_string(),
        })
    }

    fn should_set_text_content(&self, _ty: &str, _props: &Props) -> bool {
        false
    }

    fn append_initial_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        self.attach(parent, child)
    }

    fn finalize_initial_children(&mut self, instance: ElementId, _ty: &str, props: &Props) -> bool {
        self.registry
            .get(instance)
            .is_some_and(|element| element.finalize_initial_children(props))
    }

    fn prepare_update(
        &self,
        instance: ElementId,
        _ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<UpdatePayload> {
        self.registry
            .get(instance)?
            .prepare_update(old_props, new_props)
    }

    fn commit_mount(&mut self, instance: ElementId, ty: &str, props: &Props) -> Result<(), HostError> {
        tracing::debug!(?instance, ty, "commit mount");
        self.element_mut(instance)?.commit_mount(props)
    }

    fn commit_update(
        &mut self,
        instance: ElementId,
        payload: &UpdatePayload,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), HostError> {
        tracing::debug!(?instance, ty, changed = payload.len(), "commit update");
        self.element_mut(instance)?
            .commit_update(payload, old_props, new_props)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        self.attach(parent, child)
    }

    fn append_child_to_container(
        &mut self,
        container: ElementId,
        child: ElementId,
    ) -> Result<(), HostError> {
        self.attach(container, child)
    }

    // Native objects have no sibling order, so insertion is an append.
    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        _before: ElementId,
    ) -> Result<(), HostError> {
        self.attach(parent, child)
    }

    fn insert_in_container_before(
        &mut self,
        container: ElementId,
        child: ElementId,
        _before: ElementId,
    ) -> Result<(), HostError> {
        self.attach(container, child)
    }

    fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        self.detach(parent, child)
    }

    fn remove_child_from_container(
        &mut self,
        container: ElementId,
        child: ElementId,
    ) -> Result<(), HostError> {
        self.detach(container, child)
    }

    fn get_public_instance(&self, instance: ElementId) -> PublicInstance {
        self.registry
            .get(instance)
            .map(|element| element.public_instance(instance))
            .unwrap_or(PublicInstance::Element(instance))
    }

    fn detach_deleted_instance(&mut self, instance: ElementId) {
        self.destroy_subtree(instance);
    }
}

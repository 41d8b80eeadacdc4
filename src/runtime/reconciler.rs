//! A minimal keyed description-tree engine.
//!
//! [`TreeReconciler`] diffs successive [`Node`] trees against what it last
//! rendered and drives any [`HostConfig`] through three passes:
//!
//! 1. render: new subtrees are created bottom-up (`create_instance`,
//!    `append_initial_child`, `finalize_initial_children`); kept nodes get
//!    `prepare_update`.
//! 2. mutation: removals, then placements, then `commit_update`.
//! 3. layout: `commit_mount` for every finalized instance, children first.
//!
//! Children match on `(type, key)` when keyed and `(type, index)` otherwise.
//! A node whose identity changes is removed and recreated.

use std::mem;

use crate::core::props::Props;
use crate::runtime::host_config::HostConfig;

const TEXT_TYPE: &str = "#text";

/// One node of a description tree.
#[derive(Clone, Debug)]
pub enum Node {
    Host {
        ty: String,
        key: Option<String>,
        props: Props,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    pub fn new(ty: impl Into<String>, props: Props) -> Self {
        Self::Host {
            ty: ty.into(),
            key: None,
            props,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Sets the reconciliation key. Text nodes are unkeyed.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        if let Self::Host { key: slot, .. } = &mut self {
            *slot = Some(key.into());
        }
        self
    }

    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        if let Self::Host { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Self::Host { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    fn ty(&self) -> &str {
        match self {
            Self::Host { ty, .. } => ty,
            Self::Text(_) => TEXT_TYPE,
        }
    }

    fn key_ref(&self) -> Option<&str> {
        match self {
            Self::Host { key, .. } => key.as_deref(),
            Self::Text(_) => None,
        }
    }
}

/// Drives a host with successive description trees.
pub trait Reconciler {
    type Element;
    type Host: HostConfig;

    fn host(&self) -> &Self::Host;

    fn host_mut(&mut self) -> &mut Self::Host;

    /// Renders `element` into the container, replacing what was there.
    /// `None` unmounts everything.
    fn update_container(
        &mut self,
        element: Option<Self::Element>,
    ) -> Result<(), <Self::Host as HostConfig>::Error>;

    /// Public instance of the top-level node, if one is mounted.
    fn public_root_instance(&self) -> Option<<Self::Host as HostConfig>::PublicInstance>;
}

#[derive(Clone)]
struct Fiber<I> {
    ty: String,
    key: Option<String>,
    text: Option<String>,
    props: Props,
    instance: I,
    children: Vec<Fiber<I>>,
}

impl<I> Fiber<I> {
    fn matches(&self, node: &Node, index: usize, old_index: usize) -> bool {
        if self.ty != node.ty() || self.key.as_deref() != node.key_ref() {
            return false;
        }
        match node {
            Node::Text(text) => self.text.as_deref() == Some(text.as_str()) && index == old_index,
            Node::Host { key: Some(_), .. } => true,
            Node::Host { key: None, .. } => index == old_index,
        }
    }
}

#[derive(Clone, Copy)]
enum Parent<I, C> {
    Container(C),
    Instance(I),
}

struct Placement<I, C> {
    parent: Parent<I, C>,
    child: I,
    before: Option<I>,
}

struct Update<I, P> {
    instance: I,
    ty: String,
    payload: P,
    old_props: Props,
    new_props: Props,
}

struct Mount<I> {
    instance: I,
    ty: String,
    props: Props,
}

struct Commit<H: HostConfig> {
    /// Every instance created by the render pass, in creation order.
    created: Vec<H::Instance>,
    removals: Vec<(Parent<H::Instance, H::Container>, H::Instance)>,
    placements: Vec<Placement<H::Instance, H::Container>>,
    updates: Vec<Update<H::Instance, H::UpdatePayload>>,
    mounts: Vec<Mount<H::Instance>>,
}

impl<H: HostConfig> Default for Commit<H> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            removals: Vec::new(),
            placements: Vec::new(),
            updates: Vec::new(),
            mounts: Vec::new(),
        }
    }
}

/// Keyed reconciler over any host config whose text instances can stand in
/// for instances.
pub struct TreeReconciler<H: HostConfig> {
    host: H,
    current: Option<Fiber<H::Instance>>,
}

impl<H> TreeReconciler<H>
where
    H: HostConfig,
    H::Instance: From<H::TextInstance>,
{
    pub fn new(host: H) -> Self {
        Self {
            host,
            current: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    fn reconcile_children(
        &mut self,
        parent: Parent<H::Instance, H::Container>,
        old: Vec<Fiber<H::Instance>>,
        new: Vec<Node>,
        context: &H::HostContext,
        commit: &mut Commit<H>,
    ) -> Result<Vec<Fiber<H::Instance>>, H::Error> {
        let mut old: Vec<Option<Fiber<H::Instance>>> = old.into_iter().map(Some).collect();
        let mut next: Vec<(Fiber<H::Instance>, bool)> = Vec::with_capacity(new.len());
        let mut last_placed = 0;

        for (index, node) in new.into_iter().enumerate() {
            let matched = old.iter().enumerate().find_map(|(position, slot)| {
                slot.as_ref()
                    .filter(|fiber| fiber.matches(&node, index, position))
                    .map(|_| position)
            });
            match matched.and_then(|position| old[position].take().map(|fiber| (position, fiber))) {
                Some((position, fiber)) => {
                    let moved = position < last_placed;
                    last_placed = last_placed.max(position);
                    let fiber = self.update_fiber(fiber, node, context, commit)?;
                    next.push((fiber, moved));
                }
                None => {
                    let fiber = self.create_fiber(node, context, commit)?;
                    next.push((fiber, true));
                }
            }
        }

        for fiber in old.into_iter().flatten() {
            commit.removals.push((parent, fiber.instance));
        }

        for (index, (fiber, placed)) in next.iter().enumerate() {
            if !placed {
                continue;
            }
            let before = next[index + 1..]
                .iter()
                .find(|(_, placed)| !placed)
                .map(|(sibling, _)| sibling.instance);
            commit.placements.push(Placement {
                parent,
                child: fiber.instance,
                before,
            });
        }

        Ok(next.into_iter().map(|(fiber, _)| fiber).collect())
    }

    fn create_fiber(
        &mut self,
        node: Node,
        context: &H::HostContext,
        commit: &mut Commit<H>,
    ) -> Result<Fiber<H::Instance>, H::Error> {
        let container = self.host.root_container();
        match node {
            Node::Text(text) => {
                let instance = self.host.create_text_instance(&text, container, context)?;
                Ok(Fiber {
                    ty: TEXT_TYPE.to_string(),
                    key: None,
                    text: Some(text),
                    props: Props::new(),
                    instance: instance.into(),
                    children: Vec::new(),
                })
            }
            Node::Host {
                ty,
                key,
                props,
                children,
            } => {
                let child_context = self.host.get_child_host_context(context, &ty);
                let mut fibers = Vec::new();
                if !self.host.should_set_text_content(&ty, &props) {
                    for child in children {
                        fibers.push(self.create_fiber(child, &child_context, commit)?);
                    }
                }

                let instance = self.host.create_instance(&ty, &props, container, context)?;
                commit.created.push(instance);
                for fiber in &fibers {
                    self.host.append_initial_child(instance, fiber.instance)?;
                }
                if self.host.finalize_initial_children(instance, &ty, &props) {
                    commit.mounts.push(Mount {
                        instance,
                        ty: ty.clone(),
                        props: props.clone(),
                    });
                }

                Ok(Fiber {
                    ty,
                    key,
                    text: None,
                    props,
                    instance,
                    children: fibers,
                })
            }
        }
    }

    fn update_fiber(
        &mut self,
        mut fiber: Fiber<H::Instance>,
        node: Node,
        context: &H::HostContext,
        commit: &mut Commit<H>,
    ) -> Result<Fiber<H::Instance>, H::Error> {
        let Node::Host {
            ty,
            props,
            children,
            ..
        } = node
        else {
            return Ok(fiber);
        };

        let child_context = self.host.get_child_host_context(context, &ty);
        let old_children = mem::take(&mut fiber.children);
        fiber.children = self.reconcile_children(
            Parent::Instance(fiber.instance),
            old_children,
            children,
            &child_context,
            commit,
        )?;

        if let Some(payload) = self
            .host
            .prepare_update(fiber.instance, &ty, &fiber.props, &props)
        {
            commit.updates.push(Update {
                instance: fiber.instance,
                ty,
                payload,
                old_props: fiber.props.clone(),
                new_props: props.clone(),
            });
        }
        fiber.props = props;
        Ok(fiber)
    }

    /// Releases what a failed render pass created. Parents are created after
    /// their children, so reverse order reaches each parent first.
    fn discard(&mut self, created: Vec<H::Instance>) {
        for instance in created.into_iter().rev() {
            self.host.detach_deleted_instance(instance);
        }
    }

    fn apply(&mut self, commit: Commit<H>) -> Result<(), H::Error> {
        self.host.prepare_for_commit();
        let result = self.apply_phases(commit);
        self.host.reset_after_commit();
        result
    }

    fn apply_phases(&mut self, commit: Commit<H>) -> Result<(), H::Error> {
        for (parent, child) in commit.removals {
            match parent {
                Parent::Container(container) => {
                    self.host.remove_child_from_container(container, child)?
                }
                Parent::Instance(parent) => self.host.remove_child(parent, child)?,
            }
        }

        for placement in commit.placements {
            let Placement {
                parent,
                child,
                before,
            } = placement;
            match (parent, before) {
                (Parent::Container(container), Some(before)) => self
                    .host
                    .insert_in_container_before(container, child, before)?,
                (Parent::Container(container), None) => {
                    self.host.append_child_to_container(container, child)?
                }
                (Parent::Instance(parent), Some(before)) => {
                    self.host.insert_before(parent, child, before)?
                }
                (Parent::Instance(parent), None) => self.host.append_child(parent, child)?,
            }
        }

        for update in commit.updates {
            self.host.commit_update(
                update.instance,
                &update.payload,
                &update.ty,
                &update.old_props,
                &update.new_props,
            )?;
        }

        for mount in commit.mounts {
            self.host
                .commit_mount(mount.instance, &mount.ty, &mount.props)?;
        }
        Ok(())
    }
}

impl<H> Reconciler for TreeReconciler<H>
where
    H: HostConfig,
    H::Instance: From<H::TextInstance>,
{
    type Element = Node;
    type Host = H;

    fn host(&self) -> &H {
        &self.host
    }

    fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// If the render pass fails, the instances it created are discarded and the
    /// previously mounted tree stays current. A failure while committing is
    /// returned as is.
    fn update_container(&mut self, element: Option<Node>) -> Result<(), H::Error> {
        let container = self.host.root_container();
        let context = self.host.get_root_host_context(container);
        let mut commit = Commit::default();

        let old = self.current.clone().into_iter().collect();
        let new = element.into_iter().collect();
        let mut next = match self.reconcile_children(
            Parent::Container(container),
            old,
            new,
            &context,
            &mut commit,
        ) {
            Ok(next) => next,
            Err(err) => {
                self.discard(commit.created);
                return Err(err);
            }
        };
        self.current = next.pop();
        self.apply(commit)
    }

    fn public_root_instance(&self) -> Option<H::PublicInstance> {
        self.current
            .as_ref()
            .map(|fiber| self.host.get_public_instance(fiber.instance))
    }
}

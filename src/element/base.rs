//! Shared element lifecycle.
//!
//! Every element variant declares a static table of the props it handles. The table
//! maps a prop name either to a variant-specific handler tag or to a native event
//! name. The generic lifecycle (first-mount gating, diffing, commits) is written once
//! here against that table.

use std::fmt;

use crate::core::props::{Listener, PropValue, Props, UpdatePayload};
use crate::element::ElementType;
use crate::error::HostError;

/// How a handled prop reacts at mount and update time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropHandler<H> {
    /// Same handler for both phases.
    Single(H),
    /// Separate halves. `update: None` makes the prop mount-only.
    Phased { mount: H, update: Option<H> },
}

impl<H: Copy> PropHandler<H> {
    fn mount(self) -> H {
        match self {
            Self::Single(handler) => handler,
            Self::Phased { mount, .. } => mount,
        }
    }

    fn update(self) -> Option<H> {
        match self {
            Self::Single(handler) => Some(handler),
            Self::Phased { update, .. } => update,
        }
    }
}

/// Entry of a combined prop table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler<H> {
    Prop(PropHandler<H>),
    /// Pass-through to the event manager under this native event name.
    Event(&'static str),
}

/// Identity of one handler invocation; aliased props resolve to the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Invocation<H> {
    Prop(H),
    Event(&'static str),
}

/// Handled props and synthesized event handlers merged into one lookup.
///
/// Built once per variant; prop handlers win over events with the same prop name.
#[derive(Debug, PartialEq, Eq)]
pub struct PropTable<H> {
    entries: Vec<(&'static str, Handler<H>)>,
}

impl<H: Copy> PropTable<H> {
    pub fn build(
        props: &[(&'static str, PropHandler<H>)],
        events: &[(&'static str, &'static str)],
    ) -> Self {
        let mut entries: Vec<(&'static str, Handler<H>)> = props
            .iter()
            .map(|(name, handler)| (*name, Handler::Prop(*handler)))
            .collect();
        for (name, event) in events {
            if !entries.iter().any(|(existing, _)| existing == name) {
                entries.push((*name, Handler::Event(*event)));
            }
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<Handler<H>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, handler)| *handler)
    }

    pub fn handles(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// Lifecycle contract implemented by every element variant.
pub trait HostElement {
    /// Variant-specific handler tag.
    type Handler: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    fn element_type(&self) -> ElementType;

    /// Props snapshot from the last commit.
    fn props(&self) -> &Props;

    fn set_props(&mut self, props: Props);

    fn handled_props(&self) -> &'static [(&'static str, PropHandler<Self::Handler>)] {
        &[]
    }

    /// Prop name to native event name.
    fn handled_events(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// [`Self::handled_props`] merged with the synthesized event handlers.
    fn combined_handlers(&self) -> &'static PropTable<Self::Handler>;

    /// Runs one prop handler. `value` is the prop's current value, `None` when the
    /// prop was removed.
    fn apply_prop(
        &mut self,
        handler: Self::Handler,
        value: Option<&PropValue>,
        new_props: &Props,
        old_props: &Props,
    ) -> Result<(), HostError>;

    /// Routes an event prop to the native object. Variants that declare events must
    /// override this.
    fn handle_event(
        &mut self,
        event: &'static str,
        _handler: Option<&Listener>,
    ) -> Result<(), HostError> {
        Err(HostError::EventHandlerUnimplemented {
            element: self.element_type(),
            event,
        })
    }

    fn finalize_initial_children(&self, props: &Props) -> bool {
        finalize_initial_children(self, props)
    }

    fn commit_mount(&mut self, props: &Props) -> Result<(), HostError> {
        commit_mount(self, props)
    }

    fn prepare_update(&self, old_props: &Props, new_props: &Props) -> Option<UpdatePayload> {
        prepare_update(self, old_props, new_props)
    }

    fn commit_update(
        &mut self,
        payload: &UpdatePayload,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), HostError> {
        commit_update(self, payload, old_props, new_props)
    }
}

/// True iff any prop in `props` is handled, i.e. a mount commit is needed.
pub fn finalize_initial_children<E: HostElement + ?Sized>(element: &E, props: &Props) -> bool {
    let table = element.combined_handlers();
    props.keys().any(|key| table.handles(key))
}

/// Runs the mount half of every handled prop, each handler at most once.
pub fn commit_mount<E: HostElement + ?Sized>(
    element: &mut E,
    props: &Props,
) -> Result<(), HostError> {
    let table = element.combined_handlers();
    let mut invoked = Vec::new();

    for (key, value) in props.iter() {
        let Some(handler) = table.get(key) else {
            continue;
        };
        let invocation = match handler {
            Handler::Prop(handler) => Invocation::Prop(handler.mount()),
            Handler::Event(event) => Invocation::Event(event),
        };
        if invoked.contains(&invocation) {
            continue;
        }
        invoked.push(invocation);
        invoke(element, invocation, Some(value), props, props)?;
    }

    element.set_props(props.clone());
    Ok(())
}

/// Lists handled props whose value differs between the two snapshots.
///
/// Returns `None` when nothing handled changed.
pub fn prepare_update<E: HostElement + ?Sized>(
    element: &E,
    old_props: &Props,
    new_props: &Props,
) -> Option<UpdatePayload> {
    let table = element.combined_handlers();
    let mut payload = UpdatePayload::new();
    let mut seen: Vec<&str> = Vec::new();

    for key in old_props.keys().chain(new_props.keys()) {
        if seen.contains(&key) || !table.handles(key) {
            continue;
        }
        seen.push(key);

        let new_value = new_props.get(key);
        if old_props.get(key) != new_value {
            payload.push((key.to_string(), new_value.cloned()));
        }
    }

    (!payload.is_empty()).then_some(payload)
}

/// Runs the update half of each changed prop, each handler at most once.
pub fn commit_update<E: HostElement + ?Sized>(
    element: &mut E,
    payload: &UpdatePayload,
    old_props: &Props,
    new_props: &Props,
) -> Result<(), HostError> {
    let table = element.combined_handlers();
    let mut invoked = Vec::new();

    for (key, value) in payload {
        let invocation = match table.get(key) {
            Some(Handler::Prop(handler)) => match handler.update() {
                Some(handler) => Invocation::Prop(handler),
                None => continue,
            },
            Some(Handler::Event(event)) => Invocation::Event(event),
            None => continue,
        };
        if invoked.contains(&invocation) {
            continue;
        }
        invoked.push(invocation);
        invoke(element, invocation, value.as_ref(), new_props, old_props)?;
    }

    element.set_props(new_props.clone());
    Ok(())
}

fn invoke<E: HostElement + ?Sized>(
    element: &mut E,
    invocation: Invocation<E::Handler>,
    value: Option<&PropValue>,
    new_props: &Props,
    old_props: &Props,
) -> Result<(), HostError> {
    match invocation {
        Invocation::Prop(handler) => element.apply_prop(handler, value, new_props, old_props),
        Invocation::Event(event) => {
            element.handle_event(event, value.and_then(PropValue::as_handler))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::props::listener;
    use once_cell::sync::Lazy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Tag {
        Geometry,
        Title,
        TitleUpdate,
        Once,
    }

    const TEST_PROPS: &[(&str, PropHandler<Tag>)] = &[
        ("width", PropHandler::Single(Tag::Geometry)),
        ("height", PropHandler::Single(Tag::Geometry)),
        (
            "title",
            PropHandler::Phased {
                mount: Tag::Title,
                update: Some(Tag::TitleUpdate),
            },
        ),
        (
            "once",
            PropHandler::Phased {
                mount: Tag::Once,
                update: None,
            },
        ),
        ("onShadowed", PropHandler::Single(Tag::Title)),
    ];

    const TEST_EVENTS: &[(&str, &str)] = &[("onBlur", "blur"), ("onShadowed", "shadowed")];

    static TEST_TABLE: Lazy<PropTable<Tag>> =
        Lazy::new(|| PropTable::build(TEST_PROPS, TEST_EVENTS));

    #[derive(Default)]
    struct TrackingElement {
        props: Props,
        calls: Vec<String>,
    }

    impl HostElement for TrackingElement {
        type Handler = Tag;

        fn element_type(&self) -> ElementType {
            ElementType::Menu
        }

        fn props(&self) -> &Props {
            &self.props
        }

        fn set_props(&mut self, props: Props) {
            self.props = props;
        }

        fn handled_props(&self) -> &'static [(&'static str, PropHandler<Tag>)] {
            TEST_PROPS
        }

        fn handled_events(&self) -> &'static [(&'static str, &'static str)] {
            TEST_EVENTS
        }

        fn combined_handlers(&self) -> &'static PropTable<Tag> {
            &TEST_TABLE
        }

        fn apply_prop(
            &mut self,
            handler: Tag,
            value: Option<&PropValue>,
            _new_props: &Props,
            _old_props: &Props,
        ) -> Result<(), HostError> {
            self.calls.push(format!("{handler:?}={value:?}"));
            Ok(())
        }

        fn handle_event(
            &mut self,
            event: &'static str,
            handler: Option<&Listener>,
        ) -> Result<(), HostError> {
            self.calls.push(format!("event {event} {}", handler.is_some()));
            Ok(())
        }
    }

    fn tracking() -> TrackingElement {
        TrackingElement::default()
    }

    /// Declares events but keeps the default `handle_event`.
    #[derive(Default)]
    struct BareElement {
        props: Props,
    }

    impl HostElement for BareElement {
        type Handler = Tag;

        fn element_type(&self) -> ElementType {
            ElementType::Menu
        }

        fn props(&self) -> &Props {
            &self.props
        }

        fn set_props(&mut self, props: Props) {
            self.props = props;
        }

        fn combined_handlers(&self) -> &'static PropTable<Tag> {
            &TEST_TABLE
        }

        fn apply_prop(
            &mut self,
            _handler: Tag,
            _value: Option<&PropValue>,
            _new_props: &Props,
            _old_props: &Props,
        ) -> Result<(), HostError> {
            Ok(())
        }
    }

    #[test]
    fn prop_handlers_shadow_events_with_the_same_name() {
        assert_eq!(
            TEST_TABLE.get("onShadowed"),
            Some(Handler::Prop(PropHandler::Single(Tag::Title)))
        );
        assert_eq!(TEST_TABLE.get("onBlur"), Some(Handler::Event("blur")));
        assert_eq!(TEST_TABLE.names().count(), 6);
    }

    #[test]
    fn finalize_only_when_a_handled_prop_is_present() {
        let element = tracking();
        assert!(!element.finalize_initial_children(&Props::new().with("other", json!(1))));
        assert!(element.finalize_initial_children(&Props::new().with("width", json!(1))));
        assert!(element.finalize_initial_children(&Props::new().on("onBlur", listener(|_| {}))));
    }

    #[test]
    fn aliased_props_invoke_their_handler_once_per_mount() {
        let mut element = tracking();
        let props = Props::new()
            .with("width", json!(10))
            .with("height", json!(20))
            .with("title", json!("t"));

        element.commit_mount(&props).expect("mount");

        assert_eq!(
            element.calls,
            vec!["Geometry=Some(10)".to_string(), "Title=Some(\"t\")".to_string()]
        );
        assert_eq!(element.props(), &props);
    }

    #[test]
    fn identical_snapshots_need_no_update() {
        let element = tracking();
        let handler = listener(|_| {});
        let props = Props::new()
            .with("width", json!(10))
            .with("ignored", json!(1))
            .on("onBlur", handler);

        assert_eq!(element.prepare_update(&props, &props.clone()), None);
    }

    #[test]
    fn payload_lists_changed_added_and_removed_props() {
        let element = tracking();
        let old = Props::new().with("width", json!(10)).with("title", json!("a"));
        let new = Props::new()
            .with("width", json!(10))
            .with("height", json!(5))
            .with("unhandled", json!(true));

        let payload = element.prepare_update(&old, &new).expect("payload");

        assert_eq!(
            payload,
            vec![
                ("title".to_string(), None),
                ("height".to_string(), Some(PropValue::Data(json!(5)))),
            ]
        );
    }

    #[test]
    fn update_uses_update_half_and_skips_mount_only_props() {
        let mut element = tracking();
        let old = Props::new();
        let new = Props::new()
            .with("title", json!("b"))
            .with("once", json!(1))
            .with("width", json!(1))
            .with("height", json!(2));
        let payload = element.prepare_update(&old, &new).expect("payload");

        element.commit_update(&payload, &old, &new).expect("update");

        assert_eq!(
            element.calls,
            vec![
                "TitleUpdate=Some(\"b\")".to_string(),
                "Geometry=Some(1)".to_string(),
            ]
        );
        assert_eq!(element.props(), &new);
    }

    #[test]
    fn event_props_route_through_handle_event() {
        let mut element = tracking();
        let old = Props::new().on("onBlur", listener(|_| {}));
        element.commit_mount(&old).expect("mount");

        let new = Props::new();
        let payload = element.prepare_update(&old, &new).expect("payload");
        element.commit_update(&payload, &old, &new).expect("update");

        assert_eq!(
            element.calls,
            vec!["event blur true".to_string(), "event blur false".to_string()]
        );
    }

    #[test]
    fn undeclared_event_handling_fails_loudly() {
        let mut element = BareElement::default();
        let props = Props::new().on("onBlur", listener(|_| {}));

        let err = element.commit_mount(&props).expect_err("unimplemented");

        assert!(matches!(
            err,
            HostError::EventHandlerUnimplemented { event: "blur", .. }
        ));
    }
}

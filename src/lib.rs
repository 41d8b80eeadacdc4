//! Reconciliation core that maps declarative element trees onto native desktop
//! objects: the application singleton, windows, and menus.
//!
//! Invariant: native objects are only created, mutated, or destroyed from inside
//! host-config operations driven by a [`Reconciler`].
//!
//! # Public API Overview
//! - Implement [`NativeHost`] (and the object traits it hands out) for a platform.
//! - Build a container with [`create_container`] and call [`render`] with a
//!   [`Node`] tree rooted at an `APP` node.
//! - Re-render by calling [`Reconciler::update_container`] on the container.
//!
//! # Element types
//! `APP`, `WINDOW`, and `MENU` are accepted by `create_instance`; `ROOT` is the
//! container every [`HostRenderer`] starts with.

#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod element;
pub mod runtime;

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Error types surfaced by host-config operations and native constructors.
pub use crate::error::{HostError, LoggingError, NativeError};

/// Props model and listener handles.
pub use crate::core::props::{listener, Listener, PropValue, Props, UpdatePayload};

/// Native capability traits a platform backend implements.
pub use crate::core::native::{
    Dock, Emitter, NativeApp, NativeHost, NativeMenu, NativeWindow, Position, Size, WindowOptions,
};

/// Per-element listener bookkeeping.
pub use crate::core::event_manager::EventManager;

/// Element variants, factory, and arena.
pub use crate::element::{
    create_element, AppElement, Element, ElementContext, ElementId, ElementRegistry, ElementType,
    HostElement, LaunchInfo, MenuElement, PropHandler, PropTable, PublicInstance, RootElement,
    WindowElement, WindowState,
};

/// Host config contract and the render entry point.
pub use crate::runtime::{
    create_container, render, Container, HostConfig, HostContext, HostRenderer, Node, Reconciler,
    RenderFuture, RenderResult, TreeReconciler,
};

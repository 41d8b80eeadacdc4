//! Runtime: host config adapter, description-tree engine, render entry point.

pub mod host_config;
pub mod reconciler;
pub mod render;

pub use host_config::{HostConfig, HostContext, HostRenderer};
pub use reconciler::{Node, Reconciler, TreeReconciler};
pub use render::{create_container, render, Container, RenderFuture, RenderResult};

//! Core interfaces and types shared by every element.

pub mod event_manager;
pub mod native;
pub mod props;

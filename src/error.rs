use std::path::PathBuf;

use thiserror::Error;

use crate::element::{ElementId, ElementType};

/// Failure reported by a native constructor.
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("failed to create native {object}: {reason}")]
    Construction {
        object: &'static str,
        reason: String,
    },
}

impl NativeError {
    #[must_use]
    pub fn construction(object: &'static str, reason: impl Into<String>) -> Self {
        Self::Construction {
            object,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to the description engine from host-config operations.
///
/// None of these are recovered inside the core.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("type '{ty}' is not implemented")]
    UnknownElementType { ty: String },

    #[error("text elements are not supported (found text {text:?})")]
    TextUnsupported { text: String },

    #[error("the root only accepts an APP element, got {found}")]
    InvalidRootChild { found: ElementType },

    #[error("the root already holds app element {existing:?}")]
    RootOccupied { existing: ElementId },

    #[error("no live element with id {id:?}")]
    UnknownInstance { id: ElementId },

    #[error("{element} declares event '{event}' but does not handle events")]
    EventHandlerUnimplemented {
        element: ElementType,
        event: &'static str,
    },

    #[error("the process-ready listener was dropped before it fired")]
    ReadySignalDropped,

    #[error(transparent)]
    Native(#[from] NativeError),
}

/// Failure to install the log subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Error types for rs-treemanager.
//!
//! This module defines the error types returned by tree operations. Every
//! error is surfaced to the immediate caller; nothing is retried and a
//! failing recursive step aborts the whole serialization or walk.

use crate::dispatch::Backend;

/// Error type for tree operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value handed to the engine does not have the expected shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation name is not supported by any backend that was asked.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    /// The operation exists on both backends and neither can be chosen.
    #[error("Method clash on '{0}': no doctype authority and no element view, use call_element or call_document")]
    MethodClash(String),

    /// The backend an operation has to run on is not loaded.
    #[error("Operation '{operation}' requires the {backend} view, which is not loaded")]
    MissingBackend {
        operation: String,
        backend: Backend,
    },

    /// The XML parser rejected the input.
    #[error("XML parsing failed: {0}")]
    ParseError(#[from] roxmltree::Error),

    /// JSON encoding failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A leaf visitor stopped the walk.
    #[error("Walk aborted by visitor: {0}")]
    VisitorAborted(String),
}

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

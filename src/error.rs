//! Error taxonomy for link operations.
//!
//! Every failure surfaced by the core maps onto one of these variants so the
//! CLI can print a single clear message and exit non-zero. Resolution and
//! pre-condition errors are raised before any mutation; `CorruptDocument` is
//! raised before any live-bridge command; a `Transport` failure after the
//! document has been written is reported without rollback, the written
//! document being the authoritative intent.

/// Errors that can occur while resolving endpoints or applying a link operation
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("interface {interface} on device {node} is connected already")]
    AlreadyConnected { node: String, interface: String },

    #[error("interface {interface} on device {node} is not connected")]
    NotConnected { node: String, interface: String },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("corrupt lab document: {0}")]
    CorruptDocument(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("operation interrupted")]
    Interrupted,
}

impl LinkError {
    /// Convenience constructor for `NotFound` with a described subject.
    pub fn not_found(what: impl Into<String>) -> Self {
        LinkError::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

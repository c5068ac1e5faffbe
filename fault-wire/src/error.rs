//! Error types for the fault wire codec

use thiserror::Error;

/// Errors that can occur while reading a fault element off the wire
#[derive(Debug, Error)]
pub enum WireError {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// A structurally required fault element is absent
    #[error("missing required fault element: {0}")]
    MissingElement(&'static str),

    /// A required fault element carries no text value
    #[error("fault element `{0}` has no text value")]
    MissingText(&'static str),
}

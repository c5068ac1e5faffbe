//! Error types for fault translation

use fault_wire::QName;
use thiserror::Error;

/// Errors raised by a [`crate::DetailBridge`] while moving a detail value
/// to or from its XML element form
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Marshaling a detail value to XML failed
    #[error("detail marshaling failed: {0}")]
    Marshal(String),

    /// Unmarshaling a detail element back into a value failed
    #[error("detail unmarshaling failed: {0}")]
    Unmarshal(String),
}

/// Errors raised by an [`crate::ExceptionCodec`] pair
#[derive(Debug, Error)]
pub enum CodecError {
    /// The detail value could not be derived from the source error
    #[error("could not derive a detail value: {0}")]
    Detail(String),

    /// The exception could not be constructed from the detail value
    #[error("could not construct the exception: {0}")]
    Construction(String),
}

/// A detail entry recognized as a diagnostic record could not be read back
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("diagnostic entry is missing its `class` attribute")]
    MissingClass,
}

/// Errors `decode` can raise. These indicate a mismatch between the compiled
/// descriptor model and the runtime error types, never a normal wire
/// condition. `encode` returns values only and never raises.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The first detail entry matched a descriptor but its bridge failed to
    /// unmarshal it
    #[error("failed to unmarshal fault detail `{name}`: {source}")]
    DetailUnmarshal {
        name: QName,
        #[source]
        source: BridgeError,
    },

    /// The descriptor's codec failed to reconstruct the exception
    #[error("failed to reconstruct exception for detail `{name}`: {source}")]
    ExceptionModel {
        name: QName,
        #[source]
        source: CodecError,
    },
}

//! Translation between application error values and SOAP fault envelopes
//!
//! This crate is the runtime fault layer of a SOAP RPC stack. On the server
//! side, [`FaultTranslator::encode`] turns an error raised during request
//! processing into a [`FaultEnvelope`] for the transport; on the client
//! side, [`FaultTranslator::decode`] turns a received envelope back into an
//! exception value for the caller. Declared checked exceptions are mapped
//! through an [`ExceptionDescriptor`] table built offline by the model
//! compiler; everything else degrades to a generic [`ProtocolFault`].
//!
//! Encode never fails: a broken detail bridge produces a degraded envelope,
//! not an error. Decode fails only when a matched descriptor cannot
//! reconstruct its own exception type, which is a model/runtime mismatch.
//!
//! ```rust
//! use std::fmt;
//! use fault_translator::{FaultSource, FaultTranslator, ProtocolVersion, ServiceFault};
//!
//! #[derive(Debug)]
//! struct BackendDown;
//!
//! impl fmt::Display for BackendDown {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "backend connection refused")
//!     }
//! }
//!
//! impl std::error::Error for BackendDown {}
//!
//! impl ServiceFault for BackendDown {
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//!
//! let translator = FaultTranslator::default();
//! let encoded = translator.encode(
//!     ProtocolVersion::V2,
//!     FaultSource::Plain(&BackendDown),
//!     None,
//!     None,
//! );
//! assert_eq!(encoded.envelope.reason, "backend connection refused");
//! ```

pub mod bridge;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod diagnostic;
pub mod error;
pub mod fault;
pub mod translator;

pub use bridge::{DetailBridge, DetailValue, SerdeXmlBridge};
pub use codec::{ExceptionCodec, IdentityCodec, MappedCodec};
pub use config::CaptureConfig;
pub use descriptor::{DescriptorTable, DetailVariant, ExceptionDescriptor};
pub use diagnostic::DiagnosticRecord;
pub use error::{BridgeError, CodecError, DiagnosticError, TranslationError};
pub use fault::{FaultSource, ProtocolFault, RemoteFault, ServiceFault};
pub use translator::{DecodedFault, EncodedFault, FaultTranslator};

// Wire types, re-exported for convenience.
pub use fault_wire::{Element, FaultCode, FaultEnvelope, ProtocolVersion, QName, Subcode};

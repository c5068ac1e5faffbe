//! Wire-level SOAP fault model
//!
//! This crate models the two incompatible fault shapes used by the SOAP
//! protocol versions (1.1 and 1.2): qualified names, fault codes with the
//! version-2 subcode chain, and the complete fault envelope. It also provides
//! the XML codec that turns an envelope into a `<Fault>` element and back,
//! built on `xmltree`.
//!
//! The translation between application error values and envelopes lives in
//! the `soap-fault-translator` crate; this crate is purely about the wire
//! representation.

mod code;
mod envelope;
mod error;
mod qname;
mod version;

pub use code::{FaultCode, Subcode, Subcodes};
pub use envelope::FaultEnvelope;
pub use error::WireError;
pub use qname::QName;
pub use version::{ProtocolVersion, SOAP11_ENVELOPE_NS, SOAP12_ENVELOPE_NS};

// Detail payloads are carried as plain XML elements.
pub use xmltree::Element;

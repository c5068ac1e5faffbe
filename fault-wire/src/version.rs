use xmltree::Element;

use crate::{FaultCode, FaultEnvelope, QName};

/// SOAP 1.1 envelope namespace (protocol version 1).
pub const SOAP11_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.2 envelope namespace (protocol version 2).
pub const SOAP12_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// The two supported fault wire shapes.
///
/// Each variant acts as the version adapter: it owns the well-known fault
/// code constants, the default server-side code, and the field presence
/// rules applied when an envelope is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// SOAP 1.1: single qualified code, reason, optional actor, optional
    /// detail. No subcodes, no role/node.
    V1,
    /// SOAP 1.2: code with optional subcode chain, reason, optional node,
    /// optional role, optional detail.
    V2,
}

impl ProtocolVersion {
    pub fn envelope_namespace(self) -> &'static str {
        match self {
            ProtocolVersion::V1 => SOAP11_ENVELOPE_NS,
            ProtocolVersion::V2 => SOAP12_ENVELOPE_NS,
        }
    }

    /// Fault code for a sender/client-side error.
    pub fn code_client(self) -> QName {
        match self {
            ProtocolVersion::V1 => QName::new(SOAP11_ENVELOPE_NS, "Client"),
            ProtocolVersion::V2 => QName::new(SOAP12_ENVELOPE_NS, "Sender"),
        }
    }

    /// Fault code for a receiver/server-side error.
    pub fn code_server(self) -> QName {
        match self {
            ProtocolVersion::V1 => QName::new(SOAP11_ENVELOPE_NS, "Server"),
            ProtocolVersion::V2 => QName::new(SOAP12_ENVELOPE_NS, "Receiver"),
        }
    }

    pub fn code_must_understand(self) -> QName {
        QName::new(self.envelope_namespace(), "MustUnderstand")
    }

    pub fn code_version_mismatch(self) -> QName {
        QName::new(self.envelope_namespace(), "VersionMismatch")
    }

    /// Version 2 only; version 1 has no equivalent code.
    pub fn code_data_encoding_unknown(self) -> Option<QName> {
        match self {
            ProtocolVersion::V1 => None,
            ProtocolVersion::V2 => Some(QName::new(SOAP12_ENVELOPE_NS, "DataEncodingUnknown")),
        }
    }

    /// The code used whenever no other code can be resolved.
    pub fn default_server_code(self) -> QName {
        self.code_server()
    }

    /// Construct an envelope for this version, enforcing field presence:
    /// fields a version does not define are dropped, never defaulted to a
    /// sentinel. Version 1 additionally strips any subcode chain.
    pub fn build_envelope(
        self,
        code: FaultCode,
        reason: String,
        actor: Option<String>,
        role: Option<String>,
        node: Option<String>,
        detail: Vec<Element>,
    ) -> FaultEnvelope {
        match self {
            ProtocolVersion::V1 => FaultEnvelope {
                version: self,
                code: code.without_subcodes(),
                reason,
                actor,
                role: None,
                node: None,
                detail,
            },
            ProtocolVersion::V2 => FaultEnvelope {
                version: self,
                code,
                reason,
                actor: None,
                role,
                node,
                detail,
            },
        }
    }
}

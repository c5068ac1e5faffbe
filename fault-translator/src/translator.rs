//! The fault translator core: encode and decode

use std::sync::Arc;

use fault_wire::{Element, FaultCode, FaultEnvelope, ProtocolVersion, QName};
use thiserror::Error;
use tracing::warn;

use crate::config::CaptureConfig;
use crate::descriptor::{DescriptorTable, ExceptionDescriptor};
use crate::diagnostic::DiagnosticRecord;
use crate::error::{BridgeError, CodecError, TranslationError};
use crate::fault::{FaultSource, ProtocolFault, RemoteFault, ServiceFault};

/// Reason text used when message capture is disabled.
const SERVER_ERROR_REASON: &str = "Server Error";

/// Result of `encode`: the envelope for the transport, plus the qualified
/// name of its primary detail entry for caller-side pre-routing.
#[derive(Debug)]
pub struct EncodedFault {
    pub envelope: FaultEnvelope,
    pub primary_detail: Option<QName>,
}

/// Result of `decode`: the exception to raise, plus the server-side
/// diagnostic record when the envelope carried a readable one.
#[derive(Debug)]
pub struct DecodedFault {
    pub exception: Box<dyn ServiceFault>,
    pub remote_cause: Option<DiagnosticRecord>,
}

/// Translates between application error values and fault envelopes.
///
/// Stateless apart from the shared capture configuration; concurrent calls
/// on independent inputs need no synchronization.
#[derive(Clone, Default)]
pub struct FaultTranslator {
    config: Arc<CaptureConfig>,
}

#[derive(Debug, Error)]
enum DetailEncodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl FaultTranslator {
    pub fn new(config: Arc<CaptureConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Translate an error into a fault envelope. Never fails: marshal
    /// problems degrade the envelope instead of surfacing.
    ///
    /// `descriptor` is `None` for undeclared or protocol-level faults.
    /// `explicit_code` carries a dispatch-layer-detected code (version
    /// mismatch, must-understand violation); it is ignored on the relay
    /// path, where the received code wins.
    pub fn encode(
        &self,
        version: ProtocolVersion,
        source: FaultSource<'_>,
        descriptor: Option<&ExceptionDescriptor>,
        explicit_code: Option<QName>,
    ) -> EncodedFault {
        match source {
            FaultSource::Relayed(received) => relay(version, received),
            FaultSource::Plain(error) => {
                self.encode_plain(version, error, descriptor, explicit_code)
            }
        }
    }

    fn encode_plain(
        &self,
        version: ProtocolVersion,
        error: &dyn ServiceFault,
        descriptor: Option<&ExceptionDescriptor>,
        explicit_code: Option<QName>,
    ) -> EncodedFault {
        let mut reason = self.resolve_reason(error);
        let mut code = FaultCode::new(explicit_code.unwrap_or_else(|| version.default_server_code()));
        let mut detail: Vec<Element> = Vec::new();
        let mut primary_detail = None;

        if let Some(descriptor) = descriptor {
            match marshal_detail(descriptor, error) {
                Ok(element) => {
                    primary_detail = Some(QName::of_element(&element));
                    detail.push(element);
                }
                Err(e) => {
                    // Degraded encode: drop the detail and fall back to the
                    // default code and the error's own message.
                    warn!(
                        detail = %descriptor.detail_name(),
                        error = %e,
                        "fault detail marshaling failed, sending fault without detail"
                    );
                    code = FaultCode::new(version.default_server_code());
                    reason = error.message().unwrap_or_else(|| error.to_string());
                }
            }
        } else if self.config.capture_diagnostics() {
            detail.push(DiagnosticRecord::capture(error).to_element());
        }

        let envelope = version.build_envelope(code, reason, None, None, None, detail);
        EncodedFault {
            envelope,
            primary_detail,
        }
    }

    fn resolve_reason(&self, error: &dyn ServiceFault) -> String {
        if !self.config.include_exception_message() {
            return SERVER_ERROR_REASON.to_string();
        }
        error.message().unwrap_or_else(|| error.to_string())
    }

    /// Translate a received envelope back into an exception value.
    ///
    /// An empty detail list, an empty table or an unknown detail name are
    /// all ordinary outcomes yielding a [`ProtocolFault`]. The only errors
    /// are model mismatches: a matched descriptor whose bridge or codec
    /// cannot handle the payload it was compiled for.
    pub fn decode(
        &self,
        envelope: &FaultEnvelope,
        table: &DescriptorTable,
    ) -> Result<DecodedFault, TranslationError> {
        let remote_cause = decode_diagnostic(&envelope.detail);

        let first = match envelope.detail.first() {
            Some(first) if !table.is_empty() => first,
            _ => return Ok(generic_fault(envelope, remote_cause)),
        };
        let name = QName::of_element(first);
        let Some(descriptor) = table.lookup(&name) else {
            return Ok(generic_fault(envelope, remote_cause));
        };

        let value = descriptor
            .bridge()
            .unmarshal(first)
            .map_err(|source| TranslationError::DetailUnmarshal {
                name: name.clone(),
                source,
            })?;
        let exception = descriptor
            .codec()
            .from_detail(value, &envelope.reason)
            .map_err(|source| TranslationError::ExceptionModel { name, source })?;

        Ok(DecodedFault {
            exception,
            remote_cause,
        })
    }
}

/// Faithful relay of a previously received fault: code (with subcode chain
/// order preserved), reason, actor/role/node and detail are copied verbatim,
/// filtered only by the target version's field presence rules.
fn relay(version: ProtocolVersion, received: &FaultEnvelope) -> EncodedFault {
    let envelope = version.build_envelope(
        received.code.clone(),
        received.reason.clone(),
        received.actor.clone(),
        received.role.clone(),
        received.node.clone(),
        received.detail.clone(),
    );
    let primary_detail = envelope.first_detail_name();
    EncodedFault {
        envelope,
        primary_detail,
    }
}

fn marshal_detail(
    descriptor: &ExceptionDescriptor,
    error: &dyn ServiceFault,
) -> Result<Element, DetailEncodeError> {
    let value = descriptor.codec().to_detail(error)?;
    let element = descriptor.bridge().marshal(&value)?;
    Ok(element)
}

fn generic_fault(envelope: &FaultEnvelope, remote_cause: Option<DiagnosticRecord>) -> DecodedFault {
    let fault = ProtocolFault::new(envelope.reason.clone(), envelope.code.clone())
        .with_remote(remote_cause.clone().map(RemoteFault::from));
    DecodedFault {
        exception: Box::new(fault),
        remote_cause,
    }
}

/// Find and read the diagnostic record among the detail entries, if any.
/// A malformed record is logged and ignored.
fn decode_diagnostic(detail: &[Element]) -> Option<DiagnosticRecord> {
    let entry = detail.iter().find(|e| DiagnosticRecord::is_diagnostic_entry(e))?;
    match DiagnosticRecord::from_element(entry) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "ignoring malformed diagnostic record in fault detail");
            None
        }
    }
}

//! Error values entering and leaving the translator

use std::any::Any;
use std::error::Error;
use std::fmt;

use fault_wire::{FaultCode, FaultEnvelope};

use crate::diagnostic::DiagnosticRecord;

/// An application-level error value the translator can work with.
///
/// Implementations are ordinary error types; the extra methods feed reason
/// text resolution and diagnostic capture. `as_any` enables the statically
/// generated codecs to recover the concrete type without reflection.
pub trait ServiceFault: Error + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete error type, recorded in diagnostic captures.
    fn class_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Application-supplied message, if any. The default uses the `Display`
    /// text; override to return `None` for message-less errors.
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    /// Typed cause chain, walked by diagnostic capture.
    fn cause(&self) -> Option<&dyn ServiceFault> {
        None
    }
}

/// What the dispatch layer hands to `encode`.
///
/// The relay path sets `Relayed` deliberately when re-throwing a fault that
/// was previously received off the wire; the translator never infers it by
/// inspecting cause chains.
#[derive(Debug, Clone, Copy)]
pub enum FaultSource<'a> {
    /// An ordinary application error to be synthesized into a fault.
    Plain(&'a dyn ServiceFault),
    /// A previously received fault to be relayed verbatim.
    Relayed(&'a FaultEnvelope),
}

/// Generic protocol-level error produced by `decode` when the received
/// fault carries no detail, or a detail no descriptor matches.
#[derive(Debug)]
pub struct ProtocolFault {
    reason: String,
    code: FaultCode,
    remote: Option<RemoteFault>,
}

impl ProtocolFault {
    pub fn new(reason: impl Into<String>, code: FaultCode) -> Self {
        Self {
            reason: reason.into(),
            code,
            remote: None,
        }
    }

    pub(crate) fn with_remote(mut self, remote: Option<RemoteFault>) -> Self {
        self.remote = remote;
        self
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn code(&self) -> &FaultCode {
        &self.code
    }

    /// The server-side error decoded from an embedded diagnostic record,
    /// when one was present and readable.
    pub fn remote(&self) -> Option<&RemoteFault> {
        self.remote.as_ref()
    }
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.code.value)
    }
}

impl Error for ProtocolFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.remote.as_ref().map(|r| r as &(dyn Error + 'static))
    }
}

impl ServiceFault for ProtocolFault {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn message(&self) -> Option<String> {
        Some(self.reason.clone())
    }

    fn cause(&self) -> Option<&dyn ServiceFault> {
        self.remote.as_ref().map(|r| r as &dyn ServiceFault)
    }
}

/// A server-side error materialized from a decoded [`DiagnosticRecord`]:
/// class name, message and chained cause, attached as the cause of the
/// exception returned to the caller.
#[derive(Debug)]
pub struct RemoteFault {
    class_name: String,
    message: Option<String>,
    frames: Vec<String>,
    cause: Option<Box<RemoteFault>>,
}

impl RemoteFault {
    pub fn frames(&self) -> &[String] {
        &self.frames
    }
}

impl From<DiagnosticRecord> for RemoteFault {
    fn from(record: DiagnosticRecord) -> Self {
        Self {
            class_name: record.class_name,
            message: record.message,
            frames: record.frames,
            cause: record.cause.map(|c| Box::new(RemoteFault::from(*c))),
        }
    }
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message),
            None => write!(f, "{}", self.class_name),
        }
    }
}

impl Error for RemoteFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

impl ServiceFault for RemoteFault {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn message(&self) -> Option<String> {
        self.message.clone()
    }

    fn cause(&self) -> Option<&dyn ServiceFault> {
        self.cause.as_deref().map(|c| c as &dyn ServiceFault)
    }
}

//! Best-effort stack-trace capture embedded in fault details
//!
//! When enabled, the server side serializes the failing error as one extra
//! detail entry; the client side recognizes the entry structurally (by its
//! qualified name, never by position) and attaches the decoded record as the
//! cause of whatever exception it returns. Failures on either side are
//! logged and ignored, never propagated.

use std::backtrace::{Backtrace, BacktraceStatus};

use xmltree::{Element, Namespace, XMLNode};

use crate::error::DiagnosticError;
use crate::fault::ServiceFault;

/// Namespace of the diagnostic detail entry.
pub const DIAGNOSTIC_NS: &str = "http://soap-fault.dev/diagnostic";

const RECORD_NAME: &str = "exception";

/// Serialized snapshot of a server-side error: type name, message, stack
/// frames and chained cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub class_name: String,
    pub message: Option<String>,
    pub frames: Vec<String>,
    pub cause: Option<Box<DiagnosticRecord>>,
}

impl DiagnosticRecord {
    /// Capture a record from a live error value. Frames are taken from a
    /// backtrace captured here, best effort; cause records carry no frames.
    pub fn capture(fault: &dyn ServiceFault) -> Self {
        Self::build(fault, capture_frames())
    }

    fn build(fault: &dyn ServiceFault, frames: Vec<String>) -> Self {
        Self {
            class_name: fault.class_name().to_string(),
            message: fault.message(),
            frames,
            cause: ServiceFault::cause(fault).map(|c| Box::new(Self::build(c, Vec::new()))),
        }
    }

    /// Structural marker check: is this detail entry a diagnostic record?
    pub fn is_diagnostic_entry(element: &Element) -> bool {
        element.name == RECORD_NAME && element.namespace.as_deref() == Some(DIAGNOSTIC_NS)
    }

    /// Serialize as the single diagnostic detail entry. Cannot fail.
    pub fn to_element(&self) -> Element {
        let mut root = self.node(RECORD_NAME);
        let mut bindings = Namespace::empty();
        bindings.put("diag", DIAGNOSTIC_NS);
        root.namespaces = Some(bindings);
        root
    }

    fn node(&self, name: &str) -> Element {
        let mut element = diag_element(name);
        element
            .attributes
            .insert("class".to_string(), self.class_name.clone());
        if let Some(message) = &self.message {
            element
                .children
                .push(XMLNode::Element(diag_text_element("message", message)));
        }
        if !self.frames.is_empty() {
            let mut stack = diag_element("stackTrace");
            for frame in &self.frames {
                stack
                    .children
                    .push(XMLNode::Element(diag_text_element("frame", frame)));
            }
            element.children.push(XMLNode::Element(stack));
        }
        if let Some(cause) = &self.cause {
            element.children.push(XMLNode::Element(cause.node("cause")));
        }
        element
    }

    /// Read a record back from its detail entry.
    pub fn from_element(element: &Element) -> Result<Self, DiagnosticError> {
        let class_name = element
            .attributes
            .get("class")
            .cloned()
            .ok_or(DiagnosticError::MissingClass)?;
        let message = element
            .get_child("message")
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned());
        let frames = element
            .get_child("stackTrace")
            .map(|stack| {
                stack
                    .children
                    .iter()
                    .filter_map(XMLNode::as_element)
                    .filter(|e| e.name == "frame")
                    .filter_map(|e| e.get_text())
                    .map(|t| t.into_owned())
                    .collect()
            })
            .unwrap_or_default();
        let cause = element
            .get_child("cause")
            .map(Self::from_element)
            .transpose()?
            .map(Box::new);
        Ok(Self {
            class_name,
            message,
            frames,
            cause,
        })
    }
}

fn diag_element(name: &str) -> Element {
    let mut element = Element::new(name);
    element.prefix = Some("diag".to_string());
    element.namespace = Some(DIAGNOSTIC_NS.to_string());
    element
}

fn diag_text_element(name: &str, text: &str) -> Element {
    let mut element = diag_element(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

fn capture_frames() -> Vec<String> {
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    backtrace
        .to_string()
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

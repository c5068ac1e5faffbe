//! Capture configuration for the translator
//!
//! Two switches, constructed once at startup and shared by reference with
//! every translator. `include_exception_message` may be overridden later
//! through its setter; the write becomes visible to translations started
//! after it, which is all the visibility the protocol requires.

use std::sync::atomic::{AtomicBool, Ordering};

/// Named setting controlling whether reason text is taken from the error's
/// message (`true`, the default) or replaced with a fixed literal.
pub const INCLUDE_EXCEPTION_MESSAGE_SETTING: &str = "SOAP_FAULT_INCLUDE_EXCEPTION_MESSAGE";

/// Named setting enabling diagnostic (stack trace) capture in encoded
/// faults. Off by default.
pub const CAPTURE_DIAGNOSTICS_SETTING: &str = "SOAP_FAULT_CAPTURE_DIAGNOSTICS";

#[derive(Debug)]
pub struct CaptureConfig {
    include_exception_message: AtomicBool,
    capture_diagnostics: bool,
}

impl CaptureConfig {
    pub fn new(include_exception_message: bool, capture_diagnostics: bool) -> Self {
        Self {
            include_exception_message: AtomicBool::new(include_exception_message),
            capture_diagnostics,
        }
    }

    /// Read both switches from the process environment. Absent or
    /// unrecognized values keep the defaults.
    pub fn from_env() -> Self {
        Self::new(
            read_flag(INCLUDE_EXCEPTION_MESSAGE_SETTING, true),
            read_flag(CAPTURE_DIAGNOSTICS_SETTING, false),
        )
    }

    pub fn include_exception_message(&self) -> bool {
        self.include_exception_message.load(Ordering::Relaxed)
    }

    /// The single later-override entry point. Takes effect for translations
    /// started after the write.
    pub fn set_include_exception_message(&self, include: bool) {
        self.include_exception_message.store(include, Ordering::Relaxed);
    }

    pub fn capture_diagnostics(&self) -> bool {
        self.capture_diagnostics
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new(true, false)
    }
}

fn read_flag(name: &str, default: bool) -> bool {
    let Ok(value) = std::env::var(name) else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

//! Recoverable-fault taxonomy
//!
//! Nothing in this core is allowed to dead-end a person mid-crisis, so
//! every fault names the recovery that keeps the flow alive.

use serde::{Deserialize, Serialize};

/// Fault codes for every defined failure in the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum FaultCode {
    /// Malformed or missing fields in a raw assessment payload
    F001_VALIDATION_GAP,
    /// The assessment request failed or timed out
    F002_TRANSPORT_FAILURE,
    /// Step index exceeded the available step count
    F003_STATE_OVERRUN,
    /// Connectivity dropped; a transition, not an error
    F004_CONNECTIVITY_LOSS,
}

impl FaultCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::F001_VALIDATION_GAP => "F001_VALIDATION_GAP",
            Self::F002_TRANSPORT_FAILURE => "F002_TRANSPORT_FAILURE",
            Self::F003_STATE_OVERRUN => "F003_STATE_OVERRUN",
            Self::F004_CONNECTIVITY_LOSS => "F004_CONNECTIVITY_LOSS",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::F001_VALIDATION_GAP => "Payload field missing or malformed",
            Self::F002_TRANSPORT_FAILURE => "Assessment request failed",
            Self::F003_STATE_OVERRUN => "Step index past end of plan",
            Self::F004_CONNECTIVITY_LOSS => "Connectivity lost",
        }
    }

    /// The recovery that keeps the session alive
    pub fn recovery(&self) -> &'static str {
        match self {
            Self::F001_VALIDATION_GAP => "field defaulted, payload accepted",
            Self::F002_TRANSPORT_FAILURE => "fallback message shown, session degraded",
            Self::F003_STATE_OVERRUN => "index clamped to last valid step",
            Self::F004_CONNECTIVITY_LOSS => "offline fallback activated",
        }
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

//! Loose wire shapes, tolerated only at the adapter boundary
//!
//! The backing services never agreed on one schema: ids arrive as numbers
//! or strings, the critical flag travels under two names, and whole
//! sections go missing. These records absorb all of that; nothing past
//! the adapter ever sees them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One action item exactly as a provider sent it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAction {
    /// Number or string, sometimes absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<Value>,
    /// Explicit sort key, rarely present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Older providers put the text here instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<bool>,
    /// Alias for critical used by half the fleet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Canonical duration alias; null and non-numeric both mean no timer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<Value>,
}

/// A full assessment payload before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate_actions: Option<Vec<RawAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_do: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_to_contact: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassurance_message: Option<String>,
}

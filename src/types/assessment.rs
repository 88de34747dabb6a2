//! Canonical assessment produced by the adapter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CrisisKind, Severity, Step};

/// Escalation verdict attached to every assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Outside help is advised now
    pub required: bool,
    /// Who to reach, in calling order
    pub contacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Escalation {
    /// The safe default when the payload carries no signal
    pub fn none() -> Self {
        Self::default()
    }
}

/// Normalized action plan for one user message.
/// Immutable once built; a newer assessment replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub timestamp: DateTime<Utc>,
    pub crisis_type: CrisisKind,
    pub severity: Severity,
    /// Ordered, already sorted by the adapter
    pub steps: Vec<Step>,
    pub do_not_do: Vec<String>,
    pub escalation: Escalation,
    pub reassurance: String,
}

impl Assessment {
    /// Steps that gate on a timer
    pub fn timed_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.has_timer()).count()
    }

    /// Critical steps present in the plan
    pub fn critical_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.critical).count()
    }
}

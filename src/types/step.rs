//! Canonical guidance step model

use serde::{Deserialize, Serialize};

/// One normalized unit of guidance inside a tutorial run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identity; stringified position when the payload gave none
    pub id: String,
    /// Resolved numeric sort key
    pub order: i64,
    /// Optional short heading
    pub title: Option<String>,
    /// The instruction text read to the user
    pub instruction: String,
    /// Critical steps are never auto-skipped
    pub critical: bool,
    /// Pacing timer in seconds; absent means advance is immediately allowed
    pub duration_seconds: Option<u32>,
    /// Set once the user has moved past this step
    pub completed: bool,
}

impl Step {
    /// Build a bare step from position and text (used by playbooks)
    pub fn new(position: usize, instruction: impl Into<String>) -> Self {
        Self {
            id: (position + 1).to_string(),
            order: (position + 1) as i64,
            title: None,
            instruction: instruction.into(),
            critical: false,
            duration_seconds: None,
            completed: false,
        }
    }

    /// Whether this step gates advancement behind a timer
    pub fn has_timer(&self) -> bool {
        self.duration_seconds.is_some()
    }

    /// Heading for list displays: title if present, else the instruction
    pub fn label(&self) -> &str {
        match &self.title {
            Some(title) if !title.is_empty() => title,
            _ => &self.instruction,
        }
    }
}

//! Offline fallback question model

use serde::{Deserialize, Serialize};

/// One prompt with its fixed answer set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineQuestion {
    pub prompt: String,
    /// Fixed options; free-text entry is not part of the degraded flow
    pub options: Vec<String>,
}

impl OfflineQuestion {
    pub fn new(prompt: impl Into<String>, options: &[&str]) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A category of the offline walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineSection {
    pub label: String,
    pub description: String,
    pub questions: Vec<OfflineQuestion>,
}

impl OfflineSection {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<OfflineQuestion>,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            questions,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Highest reachable question index
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

//! Crisis categories the triage engine can land on

use serde::{Deserialize, Serialize};

/// The five crisis categories with dedicated playbooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisKind {
    /// Injury or illness needing first aid
    Medical,
    /// Fire or smoke hazard
    Fire,
    /// Personal safety threat
    Safety,
    /// Money emergency (eviction, debt collectors, lost income)
    Financial,
    /// Anything that fits no dedicated playbook
    Other,
}

impl CrisisKind {
    /// Parse a category string; anything unrecognized is Other
    pub fn parse_str(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "medical" => CrisisKind::Medical,
            "fire" => CrisisKind::Fire,
            "safety" | "threat" => CrisisKind::Safety,
            "financial" | "money" => CrisisKind::Financial,
            _ => CrisisKind::Other,
        }
    }

    /// Lowercase wire form used in provider payloads
    pub fn wire_str(&self) -> &'static str {
        match self {
            CrisisKind::Medical => "medical",
            CrisisKind::Fire => "fire",
            CrisisKind::Safety => "safety",
            CrisisKind::Financial => "financial",
            CrisisKind::Other => "other",
        }
    }

    /// Human-facing label, as shown on the crisis picker
    pub fn label(&self) -> &'static str {
        match self {
            CrisisKind::Medical => "Medical Emergency",
            CrisisKind::Fire => "Fire Emergency",
            CrisisKind::Safety => "Safety Threat",
            CrisisKind::Financial => "Financial Crisis",
            CrisisKind::Other => "General Support",
        }
    }

    /// Get emoji for category
    pub fn emoji(&self) -> &'static str {
        match self {
            CrisisKind::Medical => "🏥",
            CrisisKind::Fire => "🔥",
            CrisisKind::Safety => "🛡️",
            CrisisKind::Financial => "💰",
            CrisisKind::Other => "💬",
        }
    }

    /// All categories, picker order
    pub fn all() -> [CrisisKind; 5] {
        [
            CrisisKind::Medical,
            CrisisKind::Fire,
            CrisisKind::Safety,
            CrisisKind::Financial,
            CrisisKind::Other,
        ]
    }
}

impl std::fmt::Display for CrisisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrisisKind::Medical => "MEDICAL",
            CrisisKind::Fire => "FIRE",
            CrisisKind::Safety => "SAFETY",
            CrisisKind::Financial => "FINANCIAL",
            CrisisKind::Other => "OTHER",
        };
        write!(f, "{}", name)
    }
}

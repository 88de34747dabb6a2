//! Panic level shown by the urgency indicator

use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Three-level urgency classification derived from assessed severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicLevel {
    /// Situation manageable, keep guiding
    Calm,
    /// Elevated urgency, tighten pacing
    Stressed,
    /// Immediate danger, escalation path front and center
    Panic,
}

impl PanicLevel {
    /// Total mapping from severity; anything not critical or high is calm
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => PanicLevel::Panic,
            Severity::High => PanicLevel::Stressed,
            Severity::Moderate | Severity::Low | Severity::Unknown => PanicLevel::Calm,
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            PanicLevel::Calm => "\x1b[32m",     // Green
            PanicLevel::Stressed => "\x1b[33m", // Orange/Yellow
            PanicLevel::Panic => "\x1b[31m",    // Red
        }
    }

    /// Get emoji for level
    pub fn emoji(&self) -> &'static str {
        match self {
            PanicLevel::Calm => "🟢",
            PanicLevel::Stressed => "🟠",
            PanicLevel::Panic => "🔴",
        }
    }
}

impl std::fmt::Display for PanicLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PanicLevel::Calm => "Calm",
            PanicLevel::Stressed => "Stressed",
            PanicLevel::Panic => "Panic",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_maps_to_panic() {
        assert_eq!(PanicLevel::from_severity(Severity::Critical), PanicLevel::Panic);
    }

    #[test]
    fn test_high_maps_to_stressed() {
        assert_eq!(PanicLevel::from_severity(Severity::High), PanicLevel::Stressed);
    }

    #[test]
    fn test_everything_else_maps_to_calm() {
        assert_eq!(PanicLevel::from_severity(Severity::Moderate), PanicLevel::Calm);
        assert_eq!(PanicLevel::from_severity(Severity::Low), PanicLevel::Calm);
        assert_eq!(PanicLevel::from_severity(Severity::Unknown), PanicLevel::Calm);
    }

    #[test]
    fn test_unrecognized_severity_string_stays_calm() {
        let severity = Severity::parse_str("catastrophic");
        assert_eq!(severity, Severity::Unknown);
        assert_eq!(PanicLevel::from_severity(severity), PanicLevel::Calm);
    }
}

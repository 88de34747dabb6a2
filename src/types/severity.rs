//! Assessed severity levels

use serde::{Deserialize, Serialize};

/// Severity attached to an assessment by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Life-threatening, escalate without delay
    Critical,
    /// Serious, act now
    High,
    /// Needs attention, not immediately dangerous
    Moderate,
    /// Manageable with guidance
    Low,
    /// Provider gave no usable signal
    Unknown,
}

impl Severity {
    /// Parse a provider-supplied string; anything unrecognized is Unknown
    pub fn parse_str(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    /// Lowercase wire form used in provider payloads
    pub fn wire_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Severity::Critical => "\x1b[31m", // Red
            Severity::High => "\x1b[33m",     // Orange/Yellow
            Severity::Moderate => "\x1b[93m", // Bright yellow
            Severity::Low => "\x1b[32m",      // Green
            Severity::Unknown => "\x1b[90m",  // Gray
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for severity
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "🚨",
            Severity::High => "⚠️",
            Severity::Moderate => "🟡",
            Severity::Low => "🟢",
            Severity::Unknown => "⚪",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Moderate => "MODERATE",
            Severity::Low => "LOW",
            Severity::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

//! Breathing pattern definitions

use serde::{Deserialize, Serialize};

/// The four slots of a guided breathing lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
    /// Second hold, after the exhale
    Rest,
}

impl BreathPhase {
    /// On-screen label; both holds read the same
    pub fn label(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe In",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Breathe Out",
            BreathPhase::Rest => "Hold",
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "\x1b[36m", // Cyan
            BreathPhase::Hold => "\x1b[35m",   // Magenta
            BreathPhase::Exhale => "\x1b[34m", // Blue
            BreathPhase::Rest => "\x1b[35m",   // Magenta
        }
    }
}

impl std::fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An ordered set of timed phases; zero-duration slots are skipped entirely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub name: String,
    pub description: String,
    /// (phase, seconds) in lap order
    pub phases: Vec<(BreathPhase, u32)>,
}

impl BreathingPattern {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        phases: Vec<(BreathPhase, u32)>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            phases,
        }
    }

    /// Phases that actually take part in the rotation
    pub fn eligible(&self) -> Vec<(BreathPhase, u32)> {
        self.phases
            .iter()
            .copied()
            .filter(|(_, secs)| *secs > 0)
            .collect()
    }

    /// A pattern needs at least one timed phase to run
    pub fn is_runnable(&self) -> bool {
        self.phases.iter().any(|(_, secs)| *secs > 0)
    }

    /// Seconds in one full lap
    pub fn lap_seconds(&self) -> u32 {
        self.phases.iter().map(|(_, secs)| secs).sum()
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Equal four-count box: in, hold, out, hold
    pub fn box_breathing() -> Self {
        Self::new(
            "Box Breathing",
            "Equal counts in, hold, out, hold. Steadies a racing mind.",
            vec![
                (BreathPhase::Inhale, 4),
                (BreathPhase::Hold, 4),
                (BreathPhase::Exhale, 4),
                (BreathPhase::Rest, 4),
            ],
        )
    }

    /// The 4-7-8 relaxing breath; no second hold
    pub fn relaxing_478() -> Self {
        Self::new(
            "4-7-8 Relaxing",
            "Longer exhale than inhale. Good for winding panic down.",
            vec![
                (BreathPhase::Inhale, 4),
                (BreathPhase::Hold, 7),
                (BreathPhase::Exhale, 8),
                (BreathPhase::Rest, 0),
            ],
        )
    }

    /// Short pattern for a fast reset
    pub fn quick_calm() -> Self {
        Self::new(
            "Quick Calm",
            "Three counts in, three held, six out. A fast reset.",
            vec![
                (BreathPhase::Inhale, 3),
                (BreathPhase::Hold, 3),
                (BreathPhase::Exhale, 6),
                (BreathPhase::Rest, 0),
            ],
        )
    }

    /// All built-in patterns, picker order
    pub fn presets() -> Vec<Self> {
        vec![
            Self::box_breathing(),
            Self::relaxing_478(),
            Self::quick_calm(),
        ]
    }

    /// Resolve a user-typed key like "box", "478" or "quick"
    pub fn by_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "box" | "box breathing" => Some(Self::box_breathing()),
            "478" | "4-7-8" | "relaxing" | "4-7-8 relaxing" => Some(Self::relaxing_478()),
            "quick" | "quick calm" => Some(Self::quick_calm()),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Tutorial walk phase definitions

use serde::{Deserialize, Serialize};

/// The phases of a guided step walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TutorialPhase {
    /// Built but not started
    Presenting,
    /// A pacing timer is counting down on the current step
    TimerRunning,
    /// Current step done pacing; waiting for the user to move on
    AwaitingAdvance,
    /// Past the last step; asking whether the situation is under control
    EscalationPrompt,
    /// Terminal: resolved without outside help
    Completed,
    /// Terminal: handed off to outside help
    Escalated,
}

impl TutorialPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            TutorialPhase::Presenting => "\x1b[90m",      // Gray
            TutorialPhase::TimerRunning => "\x1b[33m",    // Orange/Yellow
            TutorialPhase::AwaitingAdvance => "\x1b[32m", // Green
            TutorialPhase::EscalationPrompt => "\x1b[31m", // Red
            TutorialPhase::Completed => "\x1b[32m",       // Green
            TutorialPhase::Escalated => "\x1b[31m",       // Red
        }
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            TutorialPhase::Presenting => "📋",
            TutorialPhase::TimerRunning => "⏱️",
            TutorialPhase::AwaitingAdvance => "✅",
            TutorialPhase::EscalationPrompt => "🚑",
            TutorialPhase::Completed => "🎉",
            TutorialPhase::Escalated => "🚨",
        }
    }

    /// No further transitions leave this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, TutorialPhase::Completed | TutorialPhase::Escalated)
    }
}

impl std::fmt::Display for TutorialPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TutorialPhase::Presenting => "PRESENTING",
            TutorialPhase::TimerRunning => "TIMER_RUNNING",
            TutorialPhase::AwaitingAdvance => "AWAITING_ADVANCE",
            TutorialPhase::EscalationPrompt => "ESCALATION_PROMPT",
            TutorialPhase::Completed => "COMPLETED",
            TutorialPhase::Escalated => "ESCALATED",
        };
        write!(f, "{}", name)
    }
}

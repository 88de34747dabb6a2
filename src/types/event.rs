//! Discrete events the core surfaces to its presentation caller

use serde::{Deserialize, Serialize};

use crate::types::BreathPhase;

/// Everything observable about the flow, one event per state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum FlowEvent {
    /// A step's pacing timer reached zero; advance is now allowed
    StepReady { step_index: usize },
    /// The walk moved to a new step
    StepAdvanced { step_index: usize },
    /// The user (or the plan) asked for outside help
    EscalationRequested { contacts: Vec<String> },
    /// The walk finished with the situation under control
    TutorialCompleted,
    /// The breathing cycler moved to a new phase
    CyclePhaseChanged { phase: BreathPhase, seconds: u32 },
    /// A full lap of eligible phases finished
    CycleCompleted { cycles: u32 },
    /// An offline answer was stored
    AnswerRecorded { key: String, option: String },
}

impl FlowEvent {
    /// Wire code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            FlowEvent::StepReady { .. } => "stepReady",
            FlowEvent::StepAdvanced { .. } => "stepAdvanced",
            FlowEvent::EscalationRequested { .. } => "escalationRequested",
            FlowEvent::TutorialCompleted => "tutorialCompleted",
            FlowEvent::CyclePhaseChanged { .. } => "cyclePhaseChanged",
            FlowEvent::CycleCompleted { .. } => "cycleCompleted",
            FlowEvent::AnswerRecorded { .. } => "answerRecorded",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            FlowEvent::StepReady { .. } => "Step timer finished",
            FlowEvent::StepAdvanced { .. } => "Moved to next step",
            FlowEvent::EscalationRequested { .. } => "Escalation to outside help",
            FlowEvent::TutorialCompleted => "Guidance walk completed",
            FlowEvent::CyclePhaseChanged { .. } => "Breathing phase changed",
            FlowEvent::CycleCompleted { .. } => "Breathing lap completed",
            FlowEvent::AnswerRecorded { .. } => "Offline answer recorded",
        }
    }
}

impl std::fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

//! Core types for CalmPath

mod assessment;
mod breath;
mod crisis;
mod cue;
mod event;
mod fault;
mod link;
mod offline;
mod panic;
mod raw;
mod severity;
mod step;
mod turn;
mod tutorial;

pub use assessment::{Assessment, Escalation};
pub use breath::{BreathPhase, BreathingPattern};
pub use crisis::CrisisKind;
pub use cue::{CueHits, TriageReport};
pub use event::FlowEvent;
pub use fault::FaultCode;
pub use link::LinkState;
pub use offline::{OfflineQuestion, OfflineSection};
pub use panic::PanicLevel;
pub use raw::{RawAction, RawAssessment};
pub use severity::Severity;
pub use step::Step;
pub use turn::{Speaker, Transcript, Turn, MAX_TRANSCRIPT_TURNS};
pub use tutorial::TutorialPhase;

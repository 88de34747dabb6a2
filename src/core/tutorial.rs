//! Tutorial engine: timer-gated walk through an action plan
//!
//! Transitions:
//! - PRESENTING → TIMER_RUNNING when the entered step carries a duration
//! - PRESENTING → AWAITING_ADVANCE when it does not
//! - TIMER_RUNNING → AWAITING_ADVANCE when the countdown hits zero (stepReady)
//! - AWAITING_ADVANCE → next step, or ESCALATION_PROMPT past the last one
//! - ESCALATION_PROMPT → COMPLETED via resolve(), ESCALATED via escalate()
//!
//! Advancement always takes an explicit user action; a finished timer never
//! skips a step on its own, critical or not.

use serde::Serialize;
use tracing::warn;

use crate::types::{Assessment, FaultCode, FlowEvent, Step, TutorialPhase};

/// Serializable view of the walk for presentation callers
#[derive(Debug, Clone, Serialize)]
pub struct TutorialSnapshot {
    pub phase: TutorialPhase,
    pub step_index: usize,
    pub total_steps: usize,
    pub remaining_seconds: u32,
    pub instruction: Option<String>,
    pub completed_steps: usize,
}

/// State machine walking one normalized step list
#[derive(Debug)]
pub struct TutorialEngine {
    /// The plan being walked, already sorted by the adapter
    steps: Vec<Step>,
    /// Current phase
    phase: TutorialPhase,
    /// Index into steps, always within [0, len)
    step_index: usize,
    /// Seconds left on the current step's pacing timer
    remaining_seconds: u32,
    /// Contacts quoted when the walk ends in escalation
    escalation_contacts: Vec<String>,
    /// Number of ticks consumed
    tick_count: u64,
}

impl TutorialEngine {
    /// Create an engine positioned at the first step, not yet started
    pub fn new(steps: Vec<Step>) -> Self {
        Self::with_start_index(steps, 0)
    }

    /// Create an engine resuming at a saved index.
    /// An index past the end clamps to the last valid step.
    pub fn with_start_index(steps: Vec<Step>, start_index: usize) -> Self {
        let mut engine = Self {
            steps,
            phase: TutorialPhase::Presenting,
            step_index: start_index,
            remaining_seconds: 0,
            escalation_contacts: Vec::new(),
            tick_count: 0,
        };
        engine.clamp_index();
        engine
    }

    /// Build a walk from a full assessment, keeping its contact list
    pub fn from_assessment(assessment: &Assessment) -> Self {
        let mut engine = Self::new(assessment.steps.clone());
        engine.escalation_contacts = assessment.escalation.contacts.clone();
        engine
    }

    /// Clamp a stale index back into range; recoverable, never an error
    fn clamp_index(&mut self) {
        if self.steps.is_empty() {
            self.step_index = 0;
            return;
        }
        let last = self.steps.len() - 1;
        if self.step_index > last {
            warn!(
                code = FaultCode::F003_STATE_OVERRUN.code(),
                from = self.step_index,
                to = last,
                "step index past end of plan, clamped"
            );
            self.step_index = last;
        }
    }

    /// Begin the walk. Only meaningful from PRESENTING.
    pub fn start(&mut self) -> Vec<FlowEvent> {
        if self.phase != TutorialPhase::Presenting {
            return Vec::new();
        }
        if self.steps.is_empty() {
            // Nothing to walk; go straight to the under-control question
            self.phase = TutorialPhase::EscalationPrompt;
            return Vec::new();
        }
        self.enter_current()
    }

    /// Run the entry transition for the current step
    fn enter_current(&mut self) -> Vec<FlowEvent> {
        self.clamp_index();
        let mut events = Vec::new();

        match self.steps[self.step_index].duration_seconds {
            Some(seconds) if seconds > 0 => {
                self.phase = TutorialPhase::TimerRunning;
                self.remaining_seconds = seconds;
            }
            Some(_) => {
                // Zero-length timer completes on entry
                self.phase = TutorialPhase::AwaitingAdvance;
                self.remaining_seconds = 0;
                events.push(FlowEvent::StepReady {
                    step_index: self.step_index,
                });
            }
            None => {
                self.phase = TutorialPhase::AwaitingAdvance;
                self.remaining_seconds = 0;
            }
        }

        events
    }

    /// One second of pacing. Ticks outside TIMER_RUNNING change nothing,
    /// so a stale callback cannot corrupt the walk.
    pub fn tick(&mut self) -> Vec<FlowEvent> {
        if self.phase != TutorialPhase::TimerRunning {
            return Vec::new();
        }
        self.tick_count += 1;
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);

        if self.remaining_seconds == 0 {
            self.phase = TutorialPhase::AwaitingAdvance;
            return vec![FlowEvent::StepReady {
                step_index: self.step_index,
            }];
        }
        Vec::new()
    }

    /// Move to the next step, or to the under-control question past the
    /// last one. Gated: does nothing while a timer is still running.
    pub fn advance(&mut self) -> Vec<FlowEvent> {
        if self.phase != TutorialPhase::AwaitingAdvance {
            return Vec::new();
        }

        self.steps[self.step_index].completed = true;

        if self.step_index + 1 >= self.steps.len() {
            self.phase = TutorialPhase::EscalationPrompt;
            return Vec::new();
        }

        self.step_index += 1;
        self.remaining_seconds = 0;
        let mut events = vec![FlowEvent::StepAdvanced {
            step_index: self.step_index,
        }];
        events.extend(self.enter_current());
        events
    }

    /// The situation is under control; finish the walk
    pub fn resolve(&mut self) -> Vec<FlowEvent> {
        if self.phase != TutorialPhase::EscalationPrompt {
            return Vec::new();
        }
        self.phase = TutorialPhase::Completed;
        vec![FlowEvent::TutorialCompleted]
    }

    /// Hand off to outside help. Valid from any live phase; the panic
    /// button does not wait for the walk to finish.
    pub fn escalate(&mut self) -> Vec<FlowEvent> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.phase = TutorialPhase::Escalated;
        vec![FlowEvent::EscalationRequested {
            contacts: self.escalation_contacts.clone(),
        }]
    }

    /// Get current phase
    pub fn phase(&self) -> TutorialPhase {
        self.phase
    }

    /// Get current step index
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// The step being walked, if the plan has any
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.step_index)
    }

    /// Seconds left on the current pacing timer
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Whether a pacing timer needs tick callbacks right now
    pub fn timer_active(&self) -> bool {
        self.phase == TutorialPhase::TimerRunning
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serializable view for the API and CLI
    pub fn snapshot(&self) -> TutorialSnapshot {
        TutorialSnapshot {
            phase: self.phase,
            step_index: self.step_index,
            total_steps: self.steps.len(),
            remaining_seconds: self.remaining_seconds,
            instruction: self.current_step().map(|s| s.instruction.clone()),
            completed_steps: self.steps.iter().filter(|s| s.completed).count(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_step(position: usize, seconds: Option<u32>) -> Step {
        let mut step = Step::new(position, format!("step {}", position + 1));
        step.duration_seconds = seconds;
        step
    }

    fn plan(durations: &[Option<u32>]) -> Vec<Step> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| timed_step(i, *d))
            .collect()
    }

    #[test]
    fn test_initial_phase_is_presenting() {
        let engine = TutorialEngine::new(plan(&[Some(10)]));
        assert_eq!(engine.phase(), TutorialPhase::Presenting);
        assert_eq!(engine.step_index(), 0);
    }

    #[test]
    fn test_timed_step_enters_timer_running() {
        let mut engine = TutorialEngine::new(plan(&[Some(10)]));
        let events = engine.start();
        assert!(events.is_empty());
        assert_eq!(engine.phase(), TutorialPhase::TimerRunning);
        assert_eq!(engine.remaining_seconds(), 10);
    }

    #[test]
    fn test_untimed_step_is_immediately_ready() {
        let mut engine = TutorialEngine::new(plan(&[None]));
        engine.start();
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);
    }

    #[test]
    fn test_zero_duration_fires_step_ready_on_entry() {
        let mut engine = TutorialEngine::new(plan(&[Some(0)]));
        let events = engine.start();
        assert_eq!(
            events,
            vec![FlowEvent::StepReady { step_index: 0 }]
        );
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);
    }

    #[test]
    fn test_timer_counts_down_then_fires_step_ready() {
        let mut engine = TutorialEngine::new(plan(&[Some(3)]));
        engine.start();

        assert!(engine.tick().is_empty());
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_seconds(), 1);

        let events = engine.tick();
        assert_eq!(events, vec![FlowEvent::StepReady { step_index: 0 }]);
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);
    }

    #[test]
    fn test_finished_timer_never_auto_advances() {
        let mut engine = TutorialEngine::new(plan(&[Some(1), None]));
        engine.start();
        engine.tick();

        // Ready, but still on step 0 until the user advances
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);
        assert_eq!(engine.step_index(), 0);
    }

    #[test]
    fn test_advance_gated_while_timer_runs() {
        let mut engine = TutorialEngine::new(plan(&[Some(5), None]));
        engine.start();

        assert!(engine.advance().is_empty());
        assert_eq!(engine.phase(), TutorialPhase::TimerRunning);
        assert_eq!(engine.step_index(), 0);
    }

    #[test]
    fn test_stale_tick_after_ready_changes_nothing() {
        let mut engine = TutorialEngine::new(plan(&[Some(1)]));
        engine.start();
        engine.tick();

        let snapshot_before = engine.snapshot();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.phase(), snapshot_before.phase);
        assert_eq!(engine.remaining_seconds(), snapshot_before.remaining_seconds);
    }

    #[test]
    fn test_full_walk_reaches_escalation_prompt_with_two_ready_events() {
        // Timed, untimed, timed: the untimed middle step fires no stepReady
        let mut engine = TutorialEngine::new(plan(&[Some(10), None, Some(5)]));
        let mut ready_events = 0;

        let count_ready = |events: &[FlowEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, FlowEvent::StepReady { .. }))
                .count()
        };

        ready_events += count_ready(&engine.start());
        for _ in 0..10 {
            ready_events += count_ready(&engine.tick());
        }
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);

        ready_events += count_ready(&engine.advance());
        assert_eq!(engine.step_index(), 1);
        assert_eq!(engine.phase(), TutorialPhase::AwaitingAdvance);

        ready_events += count_ready(&engine.advance());
        assert_eq!(engine.step_index(), 2);
        for _ in 0..5 {
            ready_events += count_ready(&engine.tick());
        }

        ready_events += count_ready(&engine.advance());
        assert_eq!(engine.phase(), TutorialPhase::EscalationPrompt);
        assert_eq!(ready_events, 2);
    }

    #[test]
    fn test_resolve_completes_walk() {
        let mut engine = TutorialEngine::new(plan(&[None]));
        engine.start();
        engine.advance();
        assert_eq!(engine.phase(), TutorialPhase::EscalationPrompt);

        let events = engine.resolve();
        assert_eq!(events, vec![FlowEvent::TutorialCompleted]);
        assert_eq!(engine.phase(), TutorialPhase::Completed);
        assert!(engine.phase().is_terminal());
    }

    #[test]
    fn test_escalate_terminates_and_reports_contacts() {
        let mut engine = TutorialEngine::new(plan(&[None]));
        engine.escalation_contacts = vec!["Ambulance: 102".to_string()];
        engine.start();
        engine.advance();

        let events = engine.escalate();
        assert_eq!(
            events,
            vec![FlowEvent::EscalationRequested {
                contacts: vec!["Ambulance: 102".to_string()]
            }]
        );
        assert_eq!(engine.phase(), TutorialPhase::Escalated);

        // Terminal: nothing moves anymore
        assert!(engine.resolve().is_empty());
        assert!(engine.advance().is_empty());
    }

    #[test]
    fn test_overrun_index_clamps_to_last_step() {
        let engine = TutorialEngine::with_start_index(plan(&[None, None, None]), 5);
        assert_eq!(engine.step_index(), 2);
    }

    #[test]
    fn test_empty_plan_goes_straight_to_prompt() {
        let mut engine = TutorialEngine::new(Vec::new());
        engine.start();
        assert_eq!(engine.phase(), TutorialPhase::EscalationPrompt);
    }

    #[test]
    fn test_advance_marks_steps_completed() {
        let mut engine = TutorialEngine::new(plan(&[None, None]));
        engine.start();
        engine.advance();

        assert_eq!(engine.snapshot().completed_steps, 1);
    }
}

//! Breathing cycler: cyclic pacing over the eligible phases of a pattern
//!
//! Zero-duration phases never enter the rotation, so next-phase lookup is
//! a plain modular increment and wrap detection is one comparison against
//! position zero. The cycle counter counts completed laps; it reads 0
//! between start() and the first wrap.

use serde::Serialize;
use tracing::warn;

use crate::types::{BreathPhase, BreathingPattern, FlowEvent};

/// Serializable view for presentation callers
#[derive(Debug, Clone, Serialize)]
pub struct CycleSnapshot {
    pub pattern: String,
    pub phase: Option<BreathPhase>,
    pub remaining_seconds: u32,
    pub cycles_completed: u32,
    pub current_cycle: u32,
    pub running: bool,
}

/// Cyclic timer state machine over one breathing pattern
#[derive(Debug)]
pub struct PhaseCycler {
    pattern: BreathingPattern,
    /// Phases with duration > 0, in lap order
    eligible: Vec<(BreathPhase, u32)>,
    /// Index into eligible
    position: usize,
    remaining_seconds: u32,
    /// Completed laps; increments only on wrap back to position zero
    cycles_completed: u32,
    running: bool,
    started: bool,
}

impl PhaseCycler {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self {
            pattern,
            eligible: Vec::new(),
            position: 0,
            remaining_seconds: 0,
            cycles_completed: 0,
            running: false,
            started: false,
        }
    }

    /// Begin at the first eligible phase. A pattern with no eligible
    /// phase refuses to run rather than raising.
    pub fn start(&mut self) -> Vec<FlowEvent> {
        self.eligible = self.pattern.eligible();
        if self.eligible.is_empty() {
            warn!(pattern = %self.pattern.name, "pattern has no timed phase, not starting");
            self.running = false;
            self.started = false;
            return Vec::new();
        }

        self.position = 0;
        self.remaining_seconds = self.eligible[0].1;
        self.cycles_completed = 0;
        self.running = true;
        self.started = true;

        vec![FlowEvent::CyclePhaseChanged {
            phase: self.eligible[0].0,
            seconds: self.eligible[0].1,
        }]
    }

    /// One second of pacing; ignored while paused or stopped
    pub fn tick(&mut self) -> Vec<FlowEvent> {
        if !self.running {
            return Vec::new();
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Vec::new();
        }

        // Phase exhausted: advance in cyclic order
        let mut events = Vec::new();
        self.position = (self.position + 1) % self.eligible.len();
        if self.position == 0 {
            self.cycles_completed += 1;
            events.push(FlowEvent::CycleCompleted {
                cycles: self.cycles_completed,
            });
        }

        let (phase, seconds) = self.eligible[self.position];
        self.remaining_seconds = seconds;
        events.push(FlowEvent::CyclePhaseChanged { phase, seconds });
        events
    }

    /// Freeze pacing in place; a second pause changes nothing
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue from where pause left off; a second resume changes nothing
    pub fn resume(&mut self) {
        if self.started {
            self.running = true;
        }
    }

    /// Drop in-flight state and start over on a new pattern
    pub fn switch_pattern(&mut self, pattern: BreathingPattern) -> Vec<FlowEvent> {
        self.pattern = pattern;
        self.start()
    }

    /// Current phase identity, None before a successful start
    pub fn phase(&self) -> Option<BreathPhase> {
        if self.started {
            self.eligible.get(self.position).map(|(phase, _)| *phase)
        } else {
            None
        }
    }

    /// Seconds left in the current phase
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Completed laps since start
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Lap ordinal the user is breathing through right now (1-based)
    pub fn current_cycle(&self) -> u32 {
        if self.started {
            self.cycles_completed + 1
        } else {
            0
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    /// Serializable view for the API and CLI
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            pattern: self.pattern.name.clone(),
            phase: self.phase(),
            remaining_seconds: self.remaining_seconds,
            cycles_completed: self.cycles_completed,
            current_cycle: self.current_cycle(),
            running: self.running,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(cycler: &mut PhaseCycler, ticks: u32) -> Vec<FlowEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(cycler.tick());
        }
        events
    }

    #[test]
    fn test_start_lands_on_first_eligible_phase() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        let events = cycler.start();

        assert_eq!(cycler.phase(), Some(BreathPhase::Inhale));
        assert_eq!(cycler.remaining_seconds(), 4);
        assert_eq!(cycler.cycles_completed(), 0);
        assert!(cycler.is_running());
        assert_eq!(
            events,
            vec![FlowEvent::CyclePhaseChanged {
                phase: BreathPhase::Inhale,
                seconds: 4
            }]
        );
    }

    #[test]
    fn test_one_full_lap_counts_one_cycle() {
        // Holds for any runnable pattern: sum of durations ticks = one lap
        for pattern in BreathingPattern::presets() {
            let lap = pattern.lap_seconds();
            let first = pattern.eligible()[0].0;
            let mut cycler = PhaseCycler::new(pattern);
            cycler.start();

            run_ticks(&mut cycler, lap);
            assert_eq!(cycler.cycles_completed(), 1);
            assert_eq!(cycler.phase(), Some(first));
        }
    }

    #[test]
    fn test_box_pattern_sixteen_ticks_back_on_inhale() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.start();

        let events = run_ticks(&mut cycler, 16);
        assert_eq!(cycler.phase(), Some(BreathPhase::Inhale));
        assert_eq!(cycler.cycles_completed(), 1);
        // The user is breathing through their second lap now
        assert_eq!(cycler.current_cycle(), 2);
        assert!(events.contains(&FlowEvent::CycleCompleted { cycles: 1 }));

        run_ticks(&mut cycler, 16);
        assert_eq!(cycler.cycles_completed(), 2);
    }

    #[test]
    fn test_zero_duration_phase_never_selected() {
        // 4-7-8 has a zero-length rest slot
        let mut cycler = PhaseCycler::new(BreathingPattern::relaxing_478());
        cycler.start();

        let mut seen = vec![cycler.phase().unwrap()];
        for _ in 0..(19 * 2) {
            cycler.tick();
            seen.push(cycler.phase().unwrap());
        }
        assert!(seen.iter().all(|p| *p != BreathPhase::Rest));
        assert_eq!(cycler.cycles_completed(), 2);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.start();
        run_ticks(&mut cycler, 5);

        cycler.pause();
        let phase = cycler.phase();
        let remaining = cycler.remaining_seconds();
        let cycles = cycler.cycles_completed();

        cycler.pause();
        assert_eq!(cycler.phase(), phase);
        assert_eq!(cycler.remaining_seconds(), remaining);
        assert_eq!(cycler.cycles_completed(), cycles);
        assert!(!cycler.is_running());
    }

    #[test]
    fn test_ticks_while_paused_change_nothing() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.start();
        run_ticks(&mut cycler, 3);
        cycler.pause();

        let remaining = cycler.remaining_seconds();
        assert!(run_ticks(&mut cycler, 10).is_empty());
        assert_eq!(cycler.remaining_seconds(), remaining);
    }

    #[test]
    fn test_resume_continues_in_place() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.start();
        run_ticks(&mut cycler, 4); // now on Hold
        assert_eq!(cycler.phase(), Some(BreathPhase::Hold));

        cycler.pause();
        cycler.resume();
        cycler.resume(); // second resume is a no-op

        assert!(cycler.is_running());
        assert_eq!(cycler.phase(), Some(BreathPhase::Hold));
        assert_eq!(cycler.remaining_seconds(), 4);
    }

    #[test]
    fn test_resume_before_start_does_not_run() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.resume();
        assert!(!cycler.is_running());
        assert!(cycler.tick().is_empty());
    }

    #[test]
    fn test_switch_pattern_discards_progress() {
        let mut cycler = PhaseCycler::new(BreathingPattern::box_breathing());
        cycler.start();
        run_ticks(&mut cycler, 20);
        assert_eq!(cycler.cycles_completed(), 1);

        cycler.switch_pattern(BreathingPattern::quick_calm());
        assert_eq!(cycler.phase(), Some(BreathPhase::Inhale));
        assert_eq!(cycler.remaining_seconds(), 3);
        assert_eq!(cycler.cycles_completed(), 0);
        assert!(cycler.is_running());
    }

    #[test]
    fn test_unrunnable_pattern_refuses_to_start() {
        let flat = BreathingPattern::new(
            "Flat",
            "",
            vec![(BreathPhase::Inhale, 0), (BreathPhase::Exhale, 0)],
        );
        let mut cycler = PhaseCycler::new(flat);

        assert!(cycler.start().is_empty());
        assert!(!cycler.is_running());
        assert_eq!(cycler.phase(), None);
        assert_eq!(cycler.current_cycle(), 0);
    }
}

//! CalmPath: crisis companion core
//!
//! Built in slices: CLI → triage → TutorialEngine → terminal output,
//! then breathing pacing, offline fallback, persistence, HTTP API.

pub mod core;
pub mod types;

// =============================================================================
// TIMERS
// =============================================================================

/// Tick interval for all pacing timers (seconds)
pub const TICK_INTERVAL_SECS: u64 = 1;

// =============================================================================
// TRIAGE CUE WEIGHTS - tuned against the playbook corpus
// =============================================================================

/// Cue weights for severity scoring
pub const CUE_WEIGHT_LIFE_THREAT: f64 = 3.2;
pub const CUE_WEIGHT_ACTIVE_DANGER: f64 = 2.4;
pub const CUE_WEIGHT_INJURY: f64 = 1.6;
pub const CUE_WEIGHT_DISTRESS: f64 = 0.8;
pub const CUE_WEIGHT_URGENCY: f64 = 0.6;

/// Severity ladder thresholds over the summed cue score
pub const SEVERITY_CRITICAL_THRESHOLD: f64 = 3.0;
pub const SEVERITY_HIGH_THRESHOLD: f64 = 1.8;
pub const SEVERITY_MODERATE_THRESHOLD: f64 = 0.8;

// =============================================================================
// STEP PACING
// =============================================================================

/// Bounds for estimated step durations when a playbook gives none
pub const STEP_DURATION_MIN_SECS: u32 = 15;
pub const STEP_DURATION_MAX_SECS: u32 = 60;

/// Reading-pace divisor for duration estimation (chars per second)
pub const STEP_DURATION_CHARS_PER_SEC: u32 = 8;

// =============================================================================
// ESCALATION
// =============================================================================

/// Number quoted when the assessment service is unreachable
pub const UNIVERSAL_EMERGENCY_NUMBER: &str = "112";

/// Degraded-mode reply when the assessment request fails
pub const TRANSPORT_FALLBACK_MESSAGE: &str = "I'm having trouble connecting right now. Please try again in a moment. If anyone is in immediate danger, call 112 immediately.";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

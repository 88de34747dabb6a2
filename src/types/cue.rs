//! Cue structures for the triage engine

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::types::{CrisisKind, Severity};

/// Raw cue hits extracted from text (5 cue classes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueHits {
    /// not breathing/unconscious/overdose (weight: 3.2 - HIGHEST)
    pub life_threat: f64,
    /// fire/weapon/trapped/spreading (weight: 2.4)
    pub active_danger: f64,
    /// bleeding/burn/fracture/wound (weight: 1.6)
    pub injury: f64,
    /// panicking/terrified/overwhelmed (weight: 0.8)
    pub distress: f64,
    /// now/immediately/hurry (weight: 0.6)
    pub urgency: f64,
}

impl CueHits {
    /// Create zero hits
    pub fn zero() -> Self {
        Self {
            life_threat: 0.0,
            active_danger: 0.0,
            injury: 0.0,
            distress: 0.0,
            urgency: 0.0,
        }
    }

    /// Weighted sum of all cue classes
    pub fn weighted_sum(&self) -> f64 {
        self.life_threat * crate::CUE_WEIGHT_LIFE_THREAT
            + self.active_danger * crate::CUE_WEIGHT_ACTIVE_DANGER
            + self.injury * crate::CUE_WEIGHT_INJURY
            + self.distress * crate::CUE_WEIGHT_DISTRESS
            + self.urgency * crate::CUE_WEIGHT_URGENCY
    }
}

/// Computed triage outcome with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageReport {
    /// Detected crisis category
    pub kind: CrisisKind,
    /// Severity derived from the cue score
    pub severity: Severity,
    /// Weighted cue score the severity was read from
    pub score: f64,
    /// Raw cue hits behind the score
    pub cues: CueHits,
    /// When this was computed
    pub timestamp: DateTime<Utc>,
    /// Word count of input
    pub word_count: usize,
}

impl TriageReport {
    /// Create a new TriageReport
    pub fn new(kind: CrisisKind, severity: Severity, score: f64, cues: CueHits, word_count: usize) -> Self {
        Self {
            kind,
            severity,
            score,
            cues,
            timestamp: Utc::now(),
            word_count,
        }
    }
}

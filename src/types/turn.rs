//! Session transcript model
//!
//! A turn is one utterance from either side of the conversation. The
//! transcript keeps the most recent turns only; crisis sessions are short
//! and nothing downstream needs unbounded history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum turns retained per session
pub const MAX_TRANSCRIPT_TURNS: usize = 200;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Companion,
}

/// A single utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn stamped now
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered transcript with oldest-first pruning
#[derive(Debug, Default)]
pub struct Transcript {
    turns: VecDeque<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what the user said
    pub fn add_user(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Speaker::User, text));
    }

    /// Record the companion's reply
    pub fn add_companion(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Speaker::Companion, text));
    }

    /// Add a turn and prune beyond the retention cap
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > MAX_TRANSCRIPT_TURNS {
            self.turns.pop_front();
        }
    }

    /// All turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    /// Snapshot for serialization
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

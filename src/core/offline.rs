//! Offline fallback: guided question walk that needs no network
//!
//! Answer keys follow the durable schema `<category>-<questionIndex>`;
//! entries are only ever added or overwritten, never implicitly removed.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::types::{FlowEvent, OfflineQuestion, OfflineSection};

/// The fixed catalog of degraded-mode sections
pub fn question_catalog() -> Vec<OfflineSection> {
    vec![
        OfflineSection::new(
            "Medical",
            "Immediate safety and urgent care.",
            vec![
                OfflineQuestion::new(
                    "Is anyone having trouble breathing, bleeding heavily, or unconscious?",
                    &["Yes", "No", "Not sure"],
                ),
                OfflineQuestion::new(
                    "Do you need emergency services right now?",
                    &["Yes", "No", "Not sure"],
                ),
                OfflineQuestion::new(
                    "What symptoms started first?",
                    &["Pain", "Breathing", "Bleeding", "Other"],
                ),
                OfflineQuestion::new(
                    "Is there a safe place to sit or lie down?",
                    &["Yes", "No", "Looking"],
                ),
                OfflineQuestion::new(
                    "Is someone nearby who can help you right now?",
                    &["Yes", "No", "Maybe"],
                ),
            ],
        ),
        OfflineSection::new(
            "Financial",
            "Stabilize money stress and next actions.",
            vec![
                OfflineQuestion::new(
                    "What is the most urgent money issue today?",
                    &["Bill", "Rent", "Debt", "Other"],
                ),
                OfflineQuestion::new(
                    "Is there a deadline in the next 24 hours?",
                    &["Yes", "No", "Not sure"],
                ),
                OfflineQuestion::new(
                    "What amount must be covered immediately?",
                    &["Small", "Medium", "Large", "Not sure"],
                ),
                OfflineQuestion::new(
                    "Can you contact someone for support?",
                    &["Yes", "No", "Maybe"],
                ),
                OfflineQuestion::new(
                    "What is one small action that reduces pressure?",
                    &["Call", "Plan", "Pause", "Other"],
                ),
            ],
        ),
        OfflineSection::new(
            "Family",
            "Communication, safety, and support.",
            vec![
                OfflineQuestion::new(
                    "Is anyone unsafe or in immediate danger?",
                    &["Yes", "No", "Not sure"],
                ),
                OfflineQuestion::new(
                    "What is the main issue right now?",
                    &["Argument", "Safety", "Support", "Other"],
                ),
                OfflineQuestion::new(
                    "Who is the calmest person to contact first?",
                    &["Parent", "Sibling", "Friend", "Other"],
                ),
                OfflineQuestion::new(
                    "What boundary or request helps in the next hour?",
                    &["Space", "Time", "Help", "Other"],
                ),
                OfflineQuestion::new(
                    "Where can you step away to breathe for 2 minutes?",
                    &["Room", "Outside", "Bathroom", "Other"],
                ),
            ],
        ),
        OfflineSection::new(
            "Personal",
            "Self-care and grounding in a crisis.",
            vec![
                OfflineQuestion::new(
                    "Are you safe where you are right now?",
                    &["Yes", "No", "Not sure"],
                ),
                OfflineQuestion::new(
                    "What feels strongest right now?",
                    &["Fear", "Anger", "Sadness", "Other"],
                ),
                OfflineQuestion::new(
                    "What do you need most right now?",
                    &["Water", "Rest", "Space", "Support"],
                ),
                OfflineQuestion::new(
                    "Would a grounding exercise help?",
                    &["Yes", "No", "Maybe"],
                ),
                OfflineQuestion::new(
                    "Who could you reach out to when back online?",
                    &["Friend", "Family", "Counselor", "Other"],
                ),
            ],
        ),
    ]
}

/// Serializable view for presentation callers
#[derive(Debug, Clone, Serialize)]
pub struct OfflineSnapshot {
    pub category: Option<String>,
    pub question_index: usize,
    pub total_questions: usize,
    pub prompt: Option<String>,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub answered_total: usize,
}

/// Category → question → answer walk over the fixed catalog
#[derive(Debug)]
pub struct OfflineNavigator {
    sections: Vec<OfflineSection>,
    /// Index of the active section, None before a category is chosen
    active: Option<usize>,
    question_index: usize,
    /// `<category>-<questionIndex>` → chosen option
    answers: BTreeMap<String, String>,
}

impl Default for OfflineNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineNavigator {
    pub fn new() -> Self {
        Self::with_answers(BTreeMap::new())
    }

    /// Restore a navigator around previously persisted answers
    pub fn with_answers(answers: BTreeMap<String, String>) -> Self {
        Self {
            sections: question_catalog(),
            active: None,
            question_index: 0,
            answers,
        }
    }

    pub fn sections(&self) -> &[OfflineSection] {
        &self.sections
    }

    /// The section being walked, if one is selected
    pub fn active_section(&self) -> Option<&OfflineSection> {
        self.active.map(|i| &self.sections[i])
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// The question currently on screen
    pub fn current_question(&self) -> Option<&OfflineQuestion> {
        self.active_section()
            .and_then(|s| s.questions.get(self.question_index))
    }

    /// Pick a category and restart at its first question.
    /// Unknown labels are ignored; the catalog is fixed.
    pub fn select_category(&mut self, label: &str) {
        match self
            .sections
            .iter()
            .position(|s| s.label.eq_ignore_ascii_case(label))
        {
            Some(index) => {
                self.active = Some(index);
                self.question_index = 0;
            }
            None => {
                warn!(label, "unknown offline category, keeping current selection");
            }
        }
    }

    /// Durable key for the question at the current position
    fn current_key(&self) -> Option<String> {
        self.active_section()
            .map(|s| format!("{}-{}", s.label, self.question_index))
    }

    /// Record an answer for the current question; never auto-advances
    pub fn answer(&mut self, option: impl Into<String>) -> Vec<FlowEvent> {
        let Some(key) = self.current_key() else {
            return Vec::new();
        };
        let option = option.into();
        self.answers.insert(key.clone(), option.clone());
        vec![FlowEvent::AnswerRecorded { key, option }]
    }

    /// Forward one question, stopping at the last index
    pub fn next(&mut self) {
        let Some(last) = self.active_section().map(|s| s.last_index()) else {
            return;
        };
        self.question_index = (self.question_index + 1).min(last);
    }

    /// Back one question, stopping at zero
    pub fn back(&mut self) {
        self.question_index = self.question_index.saturating_sub(1);
    }

    /// Answer stored for the question on screen
    pub fn selected_answer(&self) -> Option<&String> {
        let key = self.current_key()?;
        self.answers.get(&key)
    }

    /// All recorded answers, durable-schema keyed
    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Serializable view for the API and CLI
    pub fn snapshot(&self) -> OfflineSnapshot {
        OfflineSnapshot {
            category: self.active_section().map(|s| s.label.clone()),
            question_index: self.question_index,
            total_questions: self.active_section().map(|s| s.len()).unwrap_or(0),
            prompt: self.current_question().map(|q| q.prompt.clone()),
            options: self
                .current_question()
                .map(|q| q.options.clone())
                .unwrap_or_default(),
            selected: self.selected_answer().cloned(),
            answered_total: self.answers.len(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

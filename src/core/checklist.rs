//! Preparedness checklist over a fixed item catalog
//!
//! Ticks are keyed by item text so the persisted map stays readable and
//! survives catalog reordering. Keys that no longer match any catalog
//! item are preserved on save and ignored by progress.

use std::collections::BTreeMap;
use tracing::warn;

/// One checklist grouping
#[derive(Debug, Clone, Copy)]
pub struct ChecklistSection {
    pub emoji: &'static str,
    pub label: &'static str,
    pub items: &'static [&'static str],
}

/// The fixed preparedness catalog
pub fn checklist_catalog() -> Vec<ChecklistSection> {
    vec![
        ChecklistSection {
            emoji: "🏠",
            label: "Home Safety",
            items: &[
                "Smoke detectors installed and tested",
                "Fire extinguisher accessible",
                "Emergency exits identified",
                "First aid kit stocked and accessible",
                "Emergency numbers posted visibly",
            ],
        },
        ChecklistSection {
            emoji: "📱",
            label: "Digital Preparedness",
            items: &[
                "Emergency contacts saved in phone",
                "Location sharing enabled with trusted person",
                "Medical info on phone lock screen",
                "Offline maps downloaded for your area",
            ],
        },
        ChecklistSection {
            emoji: "🎒",
            label: "Go-Bag Essentials",
            items: &[
                "Water (3-day supply per person)",
                "Non-perishable food & can opener",
                "Flashlight & extra batteries",
                "Important documents in waterproof bag",
                "Cash in small denominations",
                "Basic medications & prescriptions",
            ],
        },
    ]
}

/// Tick state over the fixed catalog
#[derive(Debug, Clone)]
pub struct SafetyChecklist {
    sections: Vec<ChecklistSection>,
    checked: BTreeMap<String, bool>,
}

impl Default for SafetyChecklist {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyChecklist {
    /// Fresh checklist, nothing ticked
    pub fn new() -> Self {
        Self {
            sections: checklist_catalog(),
            checked: BTreeMap::new(),
        }
    }

    /// Restore from a persisted tick map
    pub fn with_checked(checked: BTreeMap<String, bool>) -> Self {
        Self {
            sections: checklist_catalog(),
            checked,
        }
    }

    /// All sections, display order
    pub fn sections(&self) -> &[ChecklistSection] {
        &self.sections
    }

    /// Current tick for one item
    pub fn is_checked(&self, item: &str) -> bool {
        self.checked.get(item).copied().unwrap_or(false)
    }

    /// Flip one item and return its new state; unknown items are refused
    pub fn toggle(&mut self, item: &str) -> bool {
        if !self.contains(item) {
            warn!(item, "toggle for unknown checklist item ignored");
            return false;
        }
        let next = !self.is_checked(item);
        self.checked.insert(item.to_string(), next);
        next
    }

    /// (ticked, total) over the catalog only
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sections.iter().map(|s| s.items.len()).sum();
        let done = self
            .sections
            .iter()
            .flat_map(|s| s.items.iter())
            .filter(|item| self.is_checked(item))
            .count();
        (done, total)
    }

    /// The persistable tick map, foreign keys included
    pub fn checked_map(&self) -> &BTreeMap<String, bool> {
        &self.checked
    }

    fn contains(&self, item: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.items.iter().any(|i| *i == item))
    }
}

// =============================================================================
// TESTS
// =============================================================================

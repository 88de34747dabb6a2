//! Triage: keyword-cue scoring over free text, then playbook selection
//!
//! Severity comes from absolute cue hits, not per-word density: one
//! "not breathing" outranks a paragraph of calm filler.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use crate::{
    SEVERITY_CRITICAL_THRESHOLD, SEVERITY_HIGH_THRESHOLD, SEVERITY_MODERATE_THRESHOLD,
    STEP_DURATION_MIN_SECS, STEP_DURATION_MAX_SECS, STEP_DURATION_CHARS_PER_SEC,
    UNIVERSAL_EMERGENCY_NUMBER,
};
use crate::types::{CrisisKind, CueHits, RawAction, RawAssessment, Severity, TriageReport};

lazy_static! {
    // =========================================================================
    // Category: medical (injury, illness, first-aid territory)
    // =========================================================================
    static ref RE_MEDICAL: Regex = Regex::new(
        r"(?i)\b(breathing|breathe|bleeding|blood|unconscious|unresponsive|pulse|chest pain|heart attack|stroke|seizure|choking|overdose|poison\w*|burn|burned|burnt|broken|fracture|sprain|injur\w*|hurt|wound\w*|cut|dizzy|faint\w*|allerg\w*|collapsed|cpr|ambulance)\b"
    ).unwrap();

    // =========================================================================
    // Category: fire (flames, smoke, gas)
    // =========================================================================
    static ref RE_FIRE: Regex = Regex::new(
        r"(?i)\b(fire|flames?|smoke|burning|gas leak|explosion|explod\w*|sparks?|short circuit)\b"
    ).unwrap();

    // =========================================================================
    // Category: safety (threats against the person)
    // =========================================================================
    static ref RE_SAFETY: Regex = Regex::new(
        r"(?i)\b(following me|followed|stalk\w*|threat\w*|attack\w*|weapon|gun|knife|unsafe|scared of|afraid of|violen\w*|abus\w*|intruder|break\w* in|harass\w*)\b"
    ).unwrap();

    // =========================================================================
    // Category: financial (money emergencies)
    // =========================================================================
    static ref RE_FINANCIAL: Regex = Regex::new(
        r"(?i)\b(rent|evict\w*|debt|bills?|loan|money|paycheck|salary|collector\w*|overdraft|afford|bank account|savings)\b"
    ).unwrap();

    // =========================================================================
    // Cue 1: Life threat (weight: 3.2 - HIGHEST, one hit is already critical)
    // =========================================================================
    static ref RE_LIFE_THREAT: Regex = Regex::new(
        r"(?i)\b(not breathing|can't breathe|cannot breathe|difficulty breathing|trouble breathing|stopped breathing|unconscious|unresponsive|no pulse|heart attack|stroke|choking|heavy bleeding|bleeding (heavily|a lot|badly)|severe bleeding|overdose|suicid\w*|seizure|turning blue)\b"
    ).unwrap();

    // =========================================================================
    // Cue 2: Active danger (weight: 2.4)
    // =========================================================================
    static ref RE_ACTIVE_DANGER: Regex = Regex::new(
        r"(?i)\b(fire|flames?|smoke|weapon|gun|knife|attack\w*|spreading|trapped|explosion|intruder|chest pain|severe|following me|stalk\w*)\b"
    ).unwrap();

    // =========================================================================
    // Cue 3: Injury (weight: 1.6)
    // =========================================================================
    static ref RE_INJURY: Regex = Regex::new(
        r"(?i)\b(bleeding|blood|burn|burned|burnt|broken|fracture|cut|wound\w*|injur\w*|hurt|sprain|swollen|bruis\w*)\b"
    ).unwrap();

    // =========================================================================
    // Cue 4: Distress (weight: 0.8)
    // =========================================================================
    static ref RE_DISTRESS: Regex = Regex::new(
        r"(?i)\b(panic\w*|scared|terrified|afraid|crying|shaking|anxious|anxiety|overwhelm\w*|can't cope|cannot cope|hopeless|desperate|evict\w*)\b"
    ).unwrap();

    // =========================================================================
    // Cue 5: Urgency (weight: 0.6)
    // =========================================================================
    static ref RE_URGENCY: Regex = Regex::new(
        r"(?i)\b(now|immediately|right now|hurry|quick\w*|emergency|help|urgent\w*|asap|fast)\b"
    ).unwrap();
}

/// Quick-send phrases offered before the user types anything
pub const QUICK_PRESETS: [&str; 8] = [
    "Someone unconscious",
    "Fire nearby",
    "Heavy bleeding",
    "Chest pain",
    "Difficulty breathing",
    "Severe burn",
    "Broken bone",
    "Choking",
];

/// Keyword triage over free text
#[derive(Debug, Default)]
pub struct TriageEngine;

impl TriageEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self
    }

    /// Classify text into a category and severity with full cue breakdown
    pub fn classify(&self, text: &str) -> TriageReport {
        let text = text.trim();

        // Handle empty input
        if text.is_empty() {
            return TriageReport::new(CrisisKind::Other, Severity::Unknown, 0.0, CueHits::zero(), 0);
        }

        let word_count = text.split_whitespace().count().max(1);

        let cues = CueHits {
            life_threat: count_matches(&RE_LIFE_THREAT, text),
            active_danger: count_matches(&RE_ACTIVE_DANGER, text),
            injury: count_matches(&RE_INJURY, text),
            distress: count_matches(&RE_DISTRESS, text),
            urgency: count_matches(&RE_URGENCY, text),
        };

        let score = cues.weighted_sum();
        let severity = severity_for(score);
        let kind = detect_kind(text);

        TriageReport::new(kind, severity, score, cues, word_count)
    }

    /// Classify and wrap the matching playbook into a provider-shaped payload
    pub fn assess(&self, text: &str) -> RawAssessment {
        let report = self.classify(text);
        playbook_for(report.kind, report.severity)
    }
}

/// Count regex matches in text
fn count_matches(regex: &Regex, text: &str) -> f64 {
    regex.find_iter(text).count() as f64
}

/// Read severity off the weighted cue score
fn severity_for(score: f64) -> Severity {
    if score >= SEVERITY_CRITICAL_THRESHOLD {
        Severity::Critical
    } else if score >= SEVERITY_HIGH_THRESHOLD {
        Severity::High
    } else if score >= SEVERITY_MODERATE_THRESHOLD {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

/// Pick the category with the most keyword hits; ties go to the
/// earlier (more urgent) category, no hits at all means Other
fn detect_kind(text: &str) -> CrisisKind {
    let counts = [
        (CrisisKind::Medical, count_matches(&RE_MEDICAL, text)),
        (CrisisKind::Fire, count_matches(&RE_FIRE, text)),
        (CrisisKind::Safety, count_matches(&RE_SAFETY, text)),
        (CrisisKind::Financial, count_matches(&RE_FINANCIAL, text)),
    ];

    let mut best = CrisisKind::Other;
    let mut best_count = 0.0;
    for (kind, count) in counts {
        if count > best_count {
            best = kind;
            best_count = count;
        }
    }
    best
}

/// Reading-pace duration for a step the playbook left unpaced
pub fn estimate_duration(instruction: &str) -> u32 {
    let secs = instruction.len() as u32 / STEP_DURATION_CHARS_PER_SEC;
    secs.clamp(STEP_DURATION_MIN_SECS, STEP_DURATION_MAX_SECS)
}

// =============================================================================
// PLAYBOOKS - each category answers in its own historical payload dialect
// =============================================================================

/// Build the raw assessment payload for one category at one severity
pub fn playbook_for(kind: CrisisKind, severity: Severity) -> RawAssessment {
    let (actions, do_not_do, reassurance) = match kind {
        CrisisKind::Medical => medical_plan(),
        CrisisKind::Fire => fire_plan(),
        CrisisKind::Safety => safety_plan(),
        CrisisKind::Financial => financial_plan(),
        CrisisKind::Other => general_plan(),
    };

    let contacts = contact_set(kind, severity);
    let critical = severity == Severity::Critical;
    let urgent = matches!(severity, Severity::Critical | Severity::High);

    // Fire escalates from High up; everything else only flags at Critical.
    // Non-critical payloads omit the flag and let contacts carry the signal.
    let escalation_required = if critical || (kind == CrisisKind::Fire && urgent) {
        Some(true)
    } else {
        None
    };

    let escalation_reason = critical.then(|| {
        match kind {
            CrisisKind::Medical => "Life-threatening symptoms reported",
            CrisisKind::Fire => "Active fire reported",
            CrisisKind::Safety => "Immediate personal danger reported",
            CrisisKind::Financial | CrisisKind::Other => "Severe distress reported",
        }
        .to_string()
    });

    RawAssessment {
        crisis_type: Some(kind.wire_str().to_string()),
        severity_level: Some(severity.wire_str().to_string()),
        immediate_actions: Some(actions),
        do_not_do: Some(do_not_do),
        escalation_required,
        who_to_contact: if contacts.is_empty() { None } else { Some(contacts) },
        escalation_reason,
        reassurance_message: Some(reassurance.to_string()),
    }
}

/// Service numbers offered per category once things look urgent
fn contact_set(kind: CrisisKind, severity: Severity) -> Vec<String> {
    let urgent = matches!(severity, Severity::Critical | Severity::High);
    let mut contacts = Vec::new();

    match kind {
        CrisisKind::Medical if urgent => contacts.push("Ambulance: 102".to_string()),
        CrisisKind::Fire if urgent => contacts.push("Fire Department: 101".to_string()),
        CrisisKind::Safety if urgent => contacts.push("Police: 100".to_string()),
        _ => {}
    }

    if severity == Severity::Critical {
        contacts.push(format!("Emergency (Universal): {}", UNIVERSAL_EMERGENCY_NUMBER));
    }
    contacts
}

/// Medical dialect: numeric step_id, instruction, critical, duration_seconds
fn curated(id: u32, instruction: &str, critical: bool, secs: u32) -> RawAction {
    RawAction {
        step_id: Some(json!(id)),
        instruction: Some(instruction.to_string()),
        critical: Some(critical),
        duration_seconds: Some(json!(secs)),
        ..RawAction::default()
    }
}

/// Fire dialect: string step_id, order carries the sort key, action text,
/// is_critical alias
fn legacy(tag: &str, order: u32, action: &str, is_critical: bool, secs: u32) -> RawAction {
    RawAction {
        step_id: Some(json!(tag)),
        order: Some(json!(order)),
        action: Some(action.to_string()),
        is_critical: Some(is_critical),
        duration_seconds: Some(json!(secs)),
        ..RawAction::default()
    }
}

/// Safety dialect: no ids at all, title plus instruction
fn titled(title: &str, instruction: &str, critical: bool, secs: u32) -> RawAction {
    RawAction {
        title: Some(title.to_string()),
        instruction: Some(instruction.to_string()),
        critical: Some(critical),
        duration_seconds: Some(json!(secs)),
        ..RawAction::default()
    }
}

/// Minimal dialect: instruction and maybe a timer, nothing else
fn plain(instruction: &str, secs: Option<u32>) -> RawAction {
    RawAction {
        instruction: Some(instruction.to_string()),
        duration_seconds: secs.map(|s| json!(s)),
        ..RawAction::default()
    }
}

fn medical_plan() -> (Vec<RawAction>, Vec<String>, &'static str) {
    let actions = vec![
        curated(1, "Check if the person is responsive. Gently tap their shoulder and ask loudly: 'Are you okay?'", false, 10),
        curated(2, "If unresponsive, call emergency services immediately. Tilt the head back gently to open the airway.", true, 15),
        curated(3, "Check for breathing for 10 seconds. Look at the chest, listen, and feel for breaths.", false, 10),
        curated(4, "If not breathing, begin chest compressions. Push hard and fast in the center of the chest, 30 compressions.", true, 30),
        curated(5, "Give 2 rescue breaths if trained. Then continue 30 compressions and 2 breaths.", false, 60),
    ];
    let avoid = vec![
        "Do not give an unconscious person food or water.".to_string(),
        "Do not move them if a neck or back injury is possible.".to_string(),
        "Do not leave them alone unless you must go to call for help.".to_string(),
    ];
    (actions, avoid, "Help is on the way. Stay with them, you are doing everything right.")
}

fn fire_plan() -> (Vec<RawAction>, Vec<String>, &'static str) {
    let actions = vec![
        legacy("fire-1", 1, "Alert everyone in the area. Shout 'FIRE!' and activate fire alarms if available.", true, 10),
        legacy("fire-2", 2, "Get low to the ground. Smoke rises, so crawl to avoid inhaling toxic fumes.", false, 15),
        legacy("fire-3", 3, "Feel doors before opening. If hot, do NOT open. Find another exit route.", false, 10),
        legacy("fire-4", 4, "Exit the building using stairs only. Never use elevators during a fire.", false, 30),
        legacy("fire-5", 5, "Once outside, move to a safe distance and call emergency services. Do not re-enter.", true, 15),
    ];
    let avoid = vec![
        "Do not use elevators.".to_string(),
        "Do not open doors that feel hot.".to_string(),
        "Do not go back inside for belongings.".to_string(),
    ];
    (actions, avoid, "You are doing the right thing. Keep moving and stay low.")
}

fn safety_plan() -> (Vec<RawAction>, Vec<String>, &'static str) {
    let actions = vec![
        titled("Look around", "Assess your surroundings. Identify exits and any nearby people who could help.", false, 15),
        titled("Step away", "If possible, remove yourself from the threatening situation quietly and calmly.", false, 20),
        titled("Find people", "Move to a public, well-lit area with other people around.", false, 30),
        titled("Call someone", "Call someone you trust: a friend, family member, or emergency services.", true, 15),
        titled("Stay put", "Stay in a safe location until help arrives. Do not return to the dangerous area.", false, 30),
    ];
    let avoid = vec![
        "Do not confront the person threatening you.".to_string(),
        "Do not go home if you are being followed.".to_string(),
        "Do not share your live location publicly.".to_string(),
    ];
    (actions, avoid, "You are not alone. Keep yourself visible and keep talking to me.")
}

fn financial_plan() -> (Vec<RawAction>, Vec<String>, &'static str) {
    let urgent_payment = "Write down the single most urgent payment and its exact deadline.";
    let support_list = "List the people and services you could contact for support today.";
    let actions = vec![
        plain(urgent_payment, Some(estimate_duration(urgent_payment))),
        plain("Call the creditor or landlord and ask for an extension in writing.", None),
        plain(support_list, Some(estimate_duration(support_list))),
        plain("Cover essentials first: food, medicine, and transport.", None),
        plain("Write down one step you will take tomorrow morning.", None),
    ];
    let avoid = vec![
        "Do not take a payday loan tonight.".to_string(),
        "Do not ignore deadline letters.".to_string(),
        "Do not make permanent decisions in a panic.".to_string(),
    ];
    (actions, avoid, "Money stress is heavy, and you are facing it. One step at a time is enough.")
}

fn general_plan() -> (Vec<RawAction>, Vec<String>, &'static str) {
    let actions = vec![
        plain("Take a deep breath. Breathe in for 4 seconds, hold for 4, breathe out for 4.", Some(12)),
        plain("Assess the situation calmly. What is the immediate risk?", Some(15)),
        plain("If anyone is in danger, call emergency services immediately.", Some(10)),
        plain("Follow any safety instructions from authorities or trained personnel.", Some(20)),
        plain("Stay in a safe location and wait for the situation to resolve.", Some(30)),
    ];
    let avoid = vec![
        "Do not stay somewhere that feels unsafe.".to_string(),
        "Do not face this alone if you can reach someone.".to_string(),
    ];
    (actions, avoid, "Whatever is happening, we will take it one step at a time. I am right here.")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapter;

    #[test]
    fn test_empty_input() {
        let engine = TriageEngine::new();
        let report = engine.classify("");
        assert_eq!(report.kind, CrisisKind::Other);
        assert_eq!(report.severity, Severity::Unknown);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.word_count, 0);
    }

    #[test]
    fn test_unconscious_is_critical_medical() {
        let engine = TriageEngine::new();
        let report = engine.classify("My father is unconscious and not breathing");
        assert_eq!(report.kind, CrisisKind::Medical);
        assert_eq!(report.severity, Severity::Critical);
        assert!(report.cues.life_threat >= 2.0, "expected two life-threat hits, got {:?}", report.cues);
    }

    #[test]
    fn test_kitchen_fire_is_high() {
        let engine = TriageEngine::new();
        let report = engine.classify("There is a fire in my kitchen");
        assert_eq!(report.kind, CrisisKind::Fire);
        assert_eq!(report.severity, Severity::High);
    }

    #[test]
    fn test_spreading_fire_is_critical() {
        let engine = TriageEngine::new();
        let report = engine.classify("The fire is spreading and we are trapped");
        assert_eq!(report.kind, CrisisKind::Fire);
        assert_eq!(report.severity, Severity::Critical);
    }

    #[test]
    fn test_being_followed_is_safety_threat() {
        let engine = TriageEngine::new();
        let report = engine.classify("Someone is following me");
        assert_eq!(report.kind, CrisisKind::Safety);
        assert_eq!(report.severity, Severity::High);
    }

    #[test]
    fn test_eviction_is_financial_moderate() {
        let engine = TriageEngine::new();
        let report = engine.classify("My rent is overdue and I just got an eviction notice");
        assert_eq!(report.kind, CrisisKind::Financial);
        assert_eq!(report.severity, Severity::Moderate);
    }

    #[test]
    fn test_distress_alone_stays_moderate() {
        let engine = TriageEngine::new();
        let report = engine.classify("I feel overwhelmed and scared");
        assert_eq!(report.kind, CrisisKind::Other);
        assert_eq!(report.severity, Severity::Moderate);
    }

    #[test]
    fn test_plain_help_is_low() {
        let engine = TriageEngine::new();
        let report = engine.classify("help");
        assert_eq!(report.kind, CrisisKind::Other);
        assert_eq!(report.severity, Severity::Low);
    }

    #[test]
    fn test_every_quick_preset_reaches_moderate() {
        let engine = TriageEngine::new();
        for preset in QUICK_PRESETS {
            let report = engine.classify(preset);
            assert!(
                report.severity != Severity::Low && report.severity != Severity::Unknown,
                "preset '{}' only scored {:?}",
                preset,
                report.severity
            );
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let engine = TriageEngine::new();
        let a = engine.classify("heavy bleeding from a deep cut, please hurry");
        let b = engine.classify("heavy bleeding from a deep cut, please hurry");
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.severity, b.severity);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_duration_estimate_clamps() {
        assert_eq!(estimate_duration("short"), STEP_DURATION_MIN_SECS);
        let long = "x".repeat(2000);
        assert_eq!(estimate_duration(&long), STEP_DURATION_MAX_SECS);
        // 240 chars at 8 chars/sec lands mid-range
        let mid = "x".repeat(240);
        assert_eq!(estimate_duration(&mid), 30);
    }

    #[test]
    fn test_medical_playbook_normalizes_clean() {
        let engine = TriageEngine::new();
        let raw = engine.assess("My father is unconscious and not breathing");
        let assessment = adapter::normalize_assessment(&raw);

        assert_eq!(assessment.crisis_type, CrisisKind::Medical);
        assert_eq!(assessment.severity, Severity::Critical);
        assert_eq!(assessment.steps.len(), 5);
        assert!(assessment.escalation.required);
        assert!(assessment
            .escalation
            .contacts
            .iter()
            .any(|c| c.contains("Ambulance")));
        // Curated payload carries every timer through
        assert!(assessment.steps.iter().all(|s| s.duration_seconds.is_some()));
    }

    #[test]
    fn test_fire_playbook_survives_legacy_dialect() {
        let raw = playbook_for(CrisisKind::Fire, Severity::High);
        let assessment = adapter::normalize_assessment(&raw);

        // String step_ids force the sort onto the order field
        assert_eq!(assessment.steps.len(), 5);
        assert!(assessment.steps[0].instruction.starts_with("Alert everyone"));
        assert!(assessment.steps[0].critical);
        assert!(assessment.steps[4].instruction.starts_with("Once outside"));
        // High fire escalates even without the critical severity
        assert!(assessment.escalation.required);
    }

    #[test]
    fn test_safety_playbook_keeps_titles_and_positions() {
        let raw = playbook_for(CrisisKind::Safety, Severity::High);
        let assessment = adapter::normalize_assessment(&raw);

        assert_eq!(assessment.steps.len(), 5);
        assert_eq!(assessment.steps[0].title.as_deref(), Some("Look around"));
        // No ids in this dialect: positions become the identities
        assert_eq!(assessment.steps[0].id, "1");
        assert_eq!(assessment.steps[4].id, "5");
    }

    #[test]
    fn test_safety_high_lists_police_without_forcing_escalation() {
        let raw = playbook_for(CrisisKind::Safety, Severity::High);
        let assessment = adapter::normalize_assessment(&raw);

        assert!(assessment
            .escalation
            .contacts
            .iter()
            .any(|c| c.contains("Police")));
        assert!(!assessment.escalation.required);
    }

    #[test]
    fn test_financial_moderate_has_no_contacts() {
        let raw = playbook_for(CrisisKind::Financial, Severity::Moderate);
        let assessment = adapter::normalize_assessment(&raw);

        assert!(assessment.escalation.contacts.is_empty());
        assert!(!assessment.escalation.required);
        assert_eq!(assessment.steps.len(), 5);
    }

    #[test]
    fn test_critical_always_adds_universal_number() {
        for kind in CrisisKind::all() {
            let raw = playbook_for(kind, Severity::Critical);
            let assessment = adapter::normalize_assessment(&raw);
            assert!(
                assessment
                    .escalation
                    .contacts
                    .iter()
                    .any(|c| c.contains(UNIVERSAL_EMERGENCY_NUMBER)),
                "{:?} critical playbook lost the universal number",
                kind
            );
            assert!(assessment.escalation.required);
            assert!(assessment.escalation.reason.is_some());
        }
    }

    #[test]
    fn test_playbooks_always_reassure() {
        for kind in CrisisKind::all() {
            let raw = playbook_for(kind, Severity::Moderate);
            assert!(raw.reassurance_message.is_some(), "{:?} playbook has no reassurance", kind);
            assert!(raw.do_not_do.as_ref().is_some_and(|d| !d.is_empty()));
        }
    }
}

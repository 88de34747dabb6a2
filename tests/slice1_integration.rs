//! Integration tests for Slice 1
//!
//! Tests the full path: text → TriageEngine → adapter → Assessment

use calmpath::core::adapter::normalize_assessment;
use calmpath::core::triage::{estimate_duration, QUICK_PRESETS};
use calmpath::core::TriageEngine;
use calmpath::types::{Assessment, CrisisKind, Severity};
use calmpath::UNIVERSAL_EMERGENCY_NUMBER;

fn assess(text: &str) -> Assessment {
    let engine = TriageEngine::new();
    normalize_assessment(&engine.assess(text))
}

/// Test the full slice 1 path
#[test]
fn test_full_slice_path() {
    let engine = TriageEngine::new();

    let text = "My dad collapsed and he's not breathing";
    let report = engine.classify(text);
    let assessment = normalize_assessment(&engine.assess(text));

    assert_eq!(report.kind, CrisisKind::Medical);
    assert_eq!(report.severity, Severity::Critical);
    assert!(report.score >= 3.0, "critical text should clear the top threshold, got {}", report.score);

    assert_eq!(assessment.crisis_type, CrisisKind::Medical);
    assert_eq!(assessment.severity, Severity::Critical);
    assert!(!assessment.steps.is_empty(), "a plan must come with steps");
    assert!(!assessment.reassurance.is_empty(), "a plan always reassures");
}

/// Test that a critical assessment demands escalation with real contacts
#[test]
fn test_critical_escalation_contacts() {
    let assessment = assess("she's unconscious and turning blue");

    assert!(assessment.escalation.required);
    assert!(
        assessment
            .escalation
            .contacts
            .iter()
            .any(|c| c.contains("102")),
        "medical escalation should name the ambulance line"
    );
    assert!(
        assessment
            .escalation
            .contacts
            .iter()
            .any(|c| c.contains(UNIVERSAL_EMERGENCY_NUMBER)),
        "critical plans always add the universal number"
    );
    assert!(assessment.escalation.reason.is_some());
}

/// Test that the fire payload's string ids and sort keys survive normalization
#[test]
fn test_fire_plan_keeps_identity_and_order() {
    let assessment = assess("there's a fire in my kitchen and it's spreading");

    assert_eq!(assessment.crisis_type, CrisisKind::Fire);
    assert_eq!(assessment.severity, Severity::Critical);

    // Fire steps travel with string ids and a separate numeric sort key
    assert!(assessment.steps.iter().all(|s| s.id.starts_with("fire-")));
    let orders: Vec<i64> = assessment.steps.iter().map(|s| s.order).collect();
    let mut sorted = orders.clone();
    sorted.sort_unstable();
    assert_eq!(orders, sorted, "steps must come out in sort-key order");
    assert!(assessment.steps.iter().any(|s| s.critical));
}

/// Test that the safety payload's position-derived ids come out 1-based
#[test]
fn test_safety_plan_backfills_position_ids() {
    let assessment = assess("someone is following me");

    assert_eq!(assessment.crisis_type, CrisisKind::Safety);
    assert_eq!(assessment.severity, Severity::High);

    let ids: Vec<&str> = assessment.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert!(assessment.steps.iter().all(|s| s.title.is_some()));

    // High safety lists the police without forcing the escalation flag
    assert!(!assessment.escalation.required);
    assert!(assessment
        .escalation
        .contacts
        .iter()
        .any(|c| c.contains("100")));
}

/// Test a moderate money crisis: plan but no emergency machinery
#[test]
fn test_financial_moderate_stays_local() {
    let assessment = assess("I'm being evicted and I can't pay rent");

    assert_eq!(assessment.crisis_type, CrisisKind::Financial);
    assert_eq!(assessment.severity, Severity::Moderate);
    assert!(!assessment.steps.is_empty());
    assert!(!assessment.escalation.required);
    assert!(assessment.escalation.contacts.is_empty());
}

/// Test empty input takes the safe default path end to end
#[test]
fn test_empty_input_stays_safe() {
    let assessment = assess("");

    assert_eq!(assessment.crisis_type, CrisisKind::Other);
    assert_eq!(assessment.severity, Severity::Unknown);
    assert!(!assessment.escalation.required);
    assert!(!assessment.steps.is_empty(), "even the default plan has steps");
}

/// Test determinism - same input always gives the same triage
#[test]
fn test_determinism_full_path() {
    let engine = TriageEngine::new();
    let text = "help, my chest hurts and I can't breathe properly";

    let first = engine.classify(text);
    let second = engine.classify(text);

    assert_eq!(first.kind, second.kind);
    assert_eq!(first.severity, second.severity);
    assert!((first.score - second.score).abs() < 1e-10);
}

/// Test every quick preset resolves to a walkable plan
#[test]
fn test_presets_all_yield_plans() {
    for preset in QUICK_PRESETS {
        let assessment = assess(preset);
        assert!(
            !assessment.steps.is_empty(),
            "preset '{}' should produce steps",
            preset
        );
        assert!(
            assessment.severity != Severity::Unknown,
            "preset '{}' should rank above unknown",
            preset
        );
        assert!(!assessment.reassurance.is_empty());
    }
}

/// Test severity scales on hit count, not text length
#[test]
fn test_severity_from_absolute_hits() {
    let engine = TriageEngine::new();

    let short = engine.classify("not breathing");
    let padded = engine.classify(
        "so we were at the park earlier today just walking around and talking \
         about nothing in particular and then suddenly he said he was not breathing",
    );

    assert_eq!(short.severity, Severity::Critical);
    assert_eq!(
        padded.severity,
        Severity::Critical,
        "padding words must not dilute a life-threat cue"
    );
}

/// Test duration estimation bounds
#[test]
fn test_duration_estimation_clamps() {
    assert_eq!(estimate_duration("short"), 15);
    assert_eq!(estimate_duration(&"x".repeat(2000)), 60);
    let mid = estimate_duration(&"x".repeat(240));
    assert_eq!(mid, 30);
}

/// Test JSON output is valid
#[test]
fn test_json_assessment_valid() {
    let assessment = assess("grease fire on the stove");

    let json = serde_json::to_string(&assessment).unwrap();
    assert!(json.contains("\"crisis_type\""));
    assert!(json.contains("\"severity\""));
    assert!(json.contains("\"steps\""));
    assert!(json.contains("\"reassurance\""));

    // Should deserialize back
    let parsed: Assessment = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.crisis_type, assessment.crisis_type);
    assert_eq!(parsed.steps.len(), assessment.steps.len());
}

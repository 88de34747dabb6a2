//! Assessment adapter: loose provider payloads in, canonical plans out
//!
//! Field tolerance rules:
//! - id: step_id if present, else 1-based position
//! - sort key: numeric step_id, else numeric order, else 0 (stable ties)
//! - text: instruction, else action, else title, else empty
//! - critical: `critical` or its fleet alias `is_critical`
//! - duration: `duration_seconds`, only when a non-negative number
//!
//! Nothing here ever raises; a malformed payload normalizes to a safe
//! default instead.

use serde_json::Value;
use tracing::warn;

use crate::types::{
    Assessment, CrisisKind, Escalation, FaultCode, RawAction, RawAssessment, Severity, Step,
};

/// Contact substrings that force an escalation on their own
const ESCALATION_CONTACT_MARKERS: [&str; 3] = ["ambulance", "911", "emergency"];

/// Extract a numeric sort key; strings never coerce
fn numeric(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// Duration only counts when it is a non-negative number
fn duration_secs(value: Option<&Value>) -> Option<u32> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 => Some(f as u32),
        _ => None,
    }
}

/// First non-empty text wins
fn first_text<'a>(candidates: [Option<&'a String>; 3]) -> &'a str {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.as_str())
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Identity string for a step; position backfills a missing id
fn step_identity(raw: &RawAction, position: usize) -> String {
    match raw.step_id.as_ref() {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => (position + 1).to_string(),
    }
}

/// Normalize a loose action list into ordered canonical steps.
/// Output length always equals input length.
pub fn normalize(raw_actions: &[RawAction]) -> Vec<Step> {
    let mut steps: Vec<Step> = raw_actions
        .iter()
        .enumerate()
        .map(|(position, raw)| {
            let order = numeric(raw.step_id.as_ref())
                .or_else(|| numeric(raw.order.as_ref()))
                .unwrap_or(0);

            Step {
                id: step_identity(raw, position),
                order,
                title: raw.title.clone().filter(|t| !t.is_empty()),
                instruction: first_text([
                    raw.instruction.as_ref(),
                    raw.action.as_ref(),
                    raw.title.as_ref(),
                ])
                .to_string(),
                critical: raw.critical.or(raw.is_critical).unwrap_or(false),
                duration_seconds: duration_secs(raw.duration_seconds.as_ref()),
                completed: raw.completed.unwrap_or(false),
            }
        })
        .collect();

    // Stable sort keeps original position on ties
    steps.sort_by_key(|s| s.order);
    steps
}

/// Decide whether the plan escalates to outside help.
/// Required when the flag says so, when severity is critical, or when any
/// contact names an emergency service.
pub fn resolve_escalation(raw: &RawAssessment) -> Escalation {
    let contacts = raw.who_to_contact.clone().unwrap_or_default();
    let severity = raw
        .severity_level
        .as_deref()
        .map(Severity::parse_str)
        .unwrap_or(Severity::Unknown);

    let contact_signal = contacts.iter().any(|contact| {
        let lowered = contact.to_lowercase();
        ESCALATION_CONTACT_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    });

    let required =
        raw.escalation_required.unwrap_or(false) || severity == Severity::Critical || contact_signal;

    Escalation {
        required,
        contacts,
        reason: raw.escalation_reason.clone().filter(|r| !r.is_empty()),
    }
}

/// Full payload normalization: one canonical Assessment per raw response
pub fn normalize_assessment(raw: &RawAssessment) -> Assessment {
    let actions = raw.immediate_actions.as_deref().unwrap_or(&[]);
    if actions.is_empty() {
        warn!(
            code = FaultCode::F001_VALIDATION_GAP.code(),
            "assessment payload carried no action list"
        );
    }

    Assessment {
        timestamp: chrono::Utc::now(),
        crisis_type: raw
            .crisis_type
            .as_deref()
            .map(CrisisKind::parse_str)
            .unwrap_or(CrisisKind::Other),
        severity: raw
            .severity_level
            .as_deref()
            .map(Severity::parse_str)
            .unwrap_or(Severity::Unknown),
        steps: normalize(actions),
        do_not_do: raw.do_not_do.clone().unwrap_or_default(),
        escalation: resolve_escalation(raw),
        reassurance: raw.reassurance_message.clone().unwrap_or_default(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

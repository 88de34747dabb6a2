//! Crisis session: one person, one conversation, one active timer
//!
//! The session owns the transcript and the engines and arbitrates between
//! them. Rules it enforces:
//! - at most one assessment request in flight; a second send is rejected
//! - at most one timer consumer; tutorial and breathing never tick together
//! - connectivity loss is a state transition, not an error
//! - a failed request degrades the session but never ends it

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::adapter;
use crate::core::breathing::{CycleSnapshot, PhaseCycler};
use crate::core::offline::{OfflineNavigator, OfflineSnapshot};
use crate::core::provider::{AssessmentProvider, ProviderError};
use crate::core::tutorial::{TutorialEngine, TutorialSnapshot};
use crate::types::{
    Assessment, BreathingPattern, FaultCode, FlowEvent, LinkState, PanicLevel, RawAssessment,
    Severity, Transcript, Turn, TutorialPhase,
};
use crate::TRANSPORT_FALLBACK_MESSAGE;

/// Fire-and-forget speech sink; implementations live with the caller
pub trait Narrator: Send + Sync {
    fn narrate(&self, text: &str);
}

/// Which engine currently consumes timer ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerOwner {
    Idle,
    Tutorial,
    Breathing,
}

/// Operations a session can refuse
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("an assessment request is already in flight")]
    RequestOutstanding,
    #[error("no assessment available yet")]
    NoAssessment,
    #[error("no guided walk has been started")]
    NoTutorial,
    #[error("no breathing exercise has been started")]
    NoBreathing,
    #[error("unknown breathing pattern '{0}'")]
    UnknownPattern(String),
}

/// Serializable view of the whole session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub panic_level: PanicLevel,
    pub link: LinkState,
    pub degraded: bool,
    pub request_outstanding: bool,
    pub timer_owner: TimerOwner,
    pub offline_active: bool,
    pub transcript: Vec<Turn>,
    pub assessment: Option<Assessment>,
    pub tutorial: Option<TutorialSnapshot>,
    pub breathing: Option<CycleSnapshot>,
    pub offline: OfflineSnapshot,
}

/// Clears the in-flight flag when an awaiting send is dropped mid-request
struct SlotRelease<'a> {
    flag: Option<&'a mut bool>,
}

impl<'a> SlotRelease<'a> {
    fn arm(flag: &'a mut bool) -> Self {
        Self { flag: Some(flag) }
    }

    /// The provider answered; the flag now belongs to complete_message
    fn disarm(mut self) {
        self.flag = None;
    }
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag.take() {
            *flag = false;
        }
    }
}

/// One person's crisis interaction from first message to resolution
pub struct CrisisSession {
    /// Stable identity handed out at creation
    id: String,
    /// When the session was opened
    created_at: DateTime<Utc>,
    /// Chat history, pruned to a bounded length
    transcript: Transcript,
    /// Urgency classification of the latest assessment
    panic_level: PanicLevel,
    /// Last connectivity report
    link: LinkState,
    /// The last assessment request failed
    degraded: bool,
    /// One request in flight, no queueing
    request_outstanding: bool,
    /// Which engine receives ticks
    timer_owner: TimerOwner,
    /// Latest normalized assessment
    assessment: Option<Assessment>,
    /// Guided step walk over the assessment plan
    tutorial: Option<TutorialEngine>,
    /// Breathing pacing exercise
    breathing: Option<PhaseCycler>,
    /// Network-free question walk, alive for the whole session
    offline: OfflineNavigator,
    /// Offline walk is the active surface
    offline_active: bool,
    /// Optional speech sink
    narrator: Option<Box<dyn Narrator>>,
}

impl CrisisSession {
    /// Open a session under the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            transcript: Transcript::new(),
            panic_level: PanicLevel::Calm,
            link: LinkState::Online,
            degraded: false,
            request_outstanding: false,
            timer_owner: TimerOwner::Idle,
            assessment: None,
            tutorial: None,
            breathing: None,
            offline: OfflineNavigator::new(),
            offline_active: false,
            narrator: None,
        }
    }

    /// Open a session with previously persisted offline answers
    pub fn with_offline_answers(
        id: impl Into<String>,
        answers: std::collections::BTreeMap<String, String>,
    ) -> Self {
        let mut session = Self::new(id);
        session.offline = OfflineNavigator::with_answers(answers);
        session
    }

    /// Attach a speech sink
    pub fn set_narrator(&mut self, narrator: Box<dyn Narrator>) {
        self.narrator = Some(narrator);
    }

    // =========================================================================
    // MESSAGING
    // =========================================================================

    /// Send one user message through the provider and absorb the result.
    /// A second send while one is outstanding is rejected outright.
    /// Dropping the future mid-request releases the slot with nothing absorbed.
    pub async fn send_message(
        &mut self,
        text: &str,
        provider: &dyn AssessmentProvider,
    ) -> Result<Vec<FlowEvent>, SessionError> {
        self.begin_message(text)?;
        let result = {
            let release = SlotRelease::arm(&mut self.request_outstanding);
            let result = provider.get_assessment(text, &self.id).await;
            release.disarm();
            result
        };
        Ok(self.complete_message(result))
    }

    /// Claim the in-flight slot and record the user's turn.
    /// A second send while one is outstanding is rejected outright.
    /// Callers that cannot hold the session across the provider call pair
    /// this with complete_message; everyone else uses send_message.
    pub fn begin_message(&mut self, text: &str) -> Result<(), SessionError> {
        if self.request_outstanding {
            warn!(session = %self.id, "send rejected, request already outstanding");
            return Err(SessionError::RequestOutstanding);
        }
        self.transcript.add_user(text);
        self.request_outstanding = true;
        Ok(())
    }

    /// Release the in-flight slot and absorb what the provider returned.
    /// A failure degrades the session but never ends it.
    pub fn complete_message(
        &mut self,
        result: Result<RawAssessment, ProviderError>,
    ) -> Vec<FlowEvent> {
        self.request_outstanding = false;
        match result {
            Ok(raw) => {
                let assessment = adapter::normalize_assessment(&raw);
                self.absorb_assessment(assessment)
            }
            Err(err) => {
                warn!(
                    code = FaultCode::F002_TRANSPORT_FAILURE.code(),
                    session = %self.id,
                    error = %err,
                    "assessment request failed, degrading"
                );
                self.degraded = true;
                if self.panic_level == PanicLevel::Calm {
                    self.panic_level = PanicLevel::Stressed;
                }
                self.transcript.add_companion(TRANSPORT_FALLBACK_MESSAGE);
                self.narrate(TRANSPORT_FALLBACK_MESSAGE);
                Vec::new()
            }
        }
    }

    fn absorb_assessment(&mut self, assessment: Assessment) -> Vec<FlowEvent> {
        let mut events = Vec::new();

        self.degraded = false;
        self.panic_level = PanicLevel::from_severity(assessment.severity);

        if !assessment.reassurance.is_empty() {
            self.transcript.add_companion(&assessment.reassurance);
            self.narrate(&assessment.reassurance);
        }
        if assessment.escalation.required {
            let notice = match assessment.severity {
                Severity::Critical => {
                    "🚨 This appears to be a critical emergency. I can connect you to emergency contacts at any point."
                }
                _ => "⚠️ Outside help is advised for this one. Emergency contacts are one tap away.",
            };
            self.transcript.add_companion(notice);
            events.push(FlowEvent::EscalationRequested {
                contacts: assessment.escalation.contacts.clone(),
            });
        }

        info!(
            session = %self.id,
            kind = %assessment.crisis_type,
            severity = %assessment.severity,
            steps = assessment.steps.len(),
            "assessment absorbed"
        );

        self.assessment = Some(assessment);
        // A fresh plan invalidates any earlier walk
        self.tutorial = None;
        if self.timer_owner == TimerOwner::Tutorial {
            self.timer_owner = TimerOwner::Idle;
        }
        events
    }

    // =========================================================================
    // TIMER ARBITRATION
    // =========================================================================

    /// One wall-clock second. Routed to whichever engine owns the timer;
    /// ticks while idle fall through without touching anything.
    pub fn tick(&mut self) -> Vec<FlowEvent> {
        match self.timer_owner {
            TimerOwner::Idle => Vec::new(),
            TimerOwner::Tutorial => {
                let events = match self.tutorial.as_mut() {
                    Some(engine) => engine.tick(),
                    None => Vec::new(),
                };
                self.settle_tutorial_timer();
                self.narrate_step_ready(&events);
                events
            }
            TimerOwner::Breathing => match self.breathing.as_mut() {
                Some(cycler) => cycler.tick(),
                None => Vec::new(),
            },
        }
    }

    /// Which engine currently consumes ticks
    pub fn timer_owner(&self) -> TimerOwner {
        self.timer_owner
    }

    /// A timer consumer exists right now
    pub fn timer_active(&self) -> bool {
        self.timer_owner != TimerOwner::Idle
    }

    // Timer falls back to the walk only while its step timer runs
    fn settle_tutorial_timer(&mut self) {
        let running = self
            .tutorial
            .as_ref()
            .is_some_and(|t| t.phase() == TutorialPhase::TimerRunning);
        if self.timer_owner == TimerOwner::Tutorial && !running {
            self.timer_owner = TimerOwner::Idle;
        }
    }

    // =========================================================================
    // GUIDED WALK
    // =========================================================================

    /// Start walking the current assessment plan
    pub fn start_tutorial(&mut self) -> Result<Vec<FlowEvent>, SessionError> {
        let assessment = self.assessment.as_ref().ok_or(SessionError::NoAssessment)?;
        let mut engine = TutorialEngine::from_assessment(assessment);
        let events = engine.start();

        // The walk takes the timer; breathing freezes where it is
        if let Some(cycler) = self.breathing.as_mut() {
            cycler.pause();
        }
        self.timer_owner = if engine.phase() == TutorialPhase::TimerRunning {
            TimerOwner::Tutorial
        } else {
            TimerOwner::Idle
        };

        if let Some(step) = engine.current_step() {
            let line = step.instruction.clone();
            self.tutorial = Some(engine);
            self.narrate(&line);
        } else {
            self.tutorial = Some(engine);
        }
        Ok(events)
    }

    /// Advance past the current step once its timer is done or skipped
    pub fn advance_step(&mut self) -> Result<Vec<FlowEvent>, SessionError> {
        let engine = self.tutorial.as_mut().ok_or(SessionError::NoTutorial)?;
        let events = engine.advance();

        let narration = match engine.phase() {
            TutorialPhase::EscalationPrompt => {
                Some("That was the last step. Do you want me to connect you to emergency contacts?".to_string())
            }
            _ => engine.current_step().map(|s| s.instruction.clone()),
        };

        self.timer_owner = if engine.phase() == TutorialPhase::TimerRunning {
            TimerOwner::Tutorial
        } else {
            TimerOwner::Idle
        };

        if !events.is_empty() {
            if let Some(line) = narration {
                self.narrate(&line);
            }
        }
        Ok(events)
    }

    /// Decline escalation at the end of the walk
    pub fn finish_tutorial(&mut self) -> Result<Vec<FlowEvent>, SessionError> {
        let engine = self.tutorial.as_mut().ok_or(SessionError::NoTutorial)?;
        let events = engine.resolve();
        self.settle_tutorial_timer();
        if events
            .iter()
            .any(|e| matches!(e, FlowEvent::TutorialCompleted))
        {
            self.narrate("You got through every step. Well done.");
        }
        Ok(events)
    }

    /// Escalate to outside help from anywhere in the walk
    pub fn escalate(&mut self) -> Result<Vec<FlowEvent>, SessionError> {
        let engine = self.tutorial.as_mut().ok_or(SessionError::NoTutorial)?;
        let events = engine.escalate();
        if !events.is_empty() {
            self.panic_level = PanicLevel::Panic;
            self.timer_owner = TimerOwner::Idle;
        }
        Ok(events)
    }

    // =========================================================================
    // BREATHING
    // =========================================================================

    /// Start (or restart under a new pattern) the breathing exercise
    pub fn start_breathing(&mut self, pattern_key: &str) -> Result<Vec<FlowEvent>, SessionError> {
        let pattern = BreathingPattern::by_key(pattern_key)
            .ok_or_else(|| SessionError::UnknownPattern(pattern_key.to_string()))?;

        let mut cycler = match self.breathing.take() {
            Some(cycler) => cycler,
            None => PhaseCycler::new(pattern.clone()),
        };
        let events = if cycler.pattern().name == pattern.name && cycler.is_running() {
            Vec::new()
        } else {
            cycler.switch_pattern(pattern)
        };
        self.breathing = Some(cycler);

        if self.breathing.as_ref().is_some_and(|c| c.is_running()) {
            // Breathing takes the timer; a running step timer freezes
            self.timer_owner = TimerOwner::Breathing;
        }
        Ok(events)
    }

    /// Freeze the breathing exercise in place
    pub fn pause_breathing(&mut self) -> Result<(), SessionError> {
        let cycler = self.breathing.as_mut().ok_or(SessionError::NoBreathing)?;
        cycler.pause();
        self.release_breathing_timer();
        Ok(())
    }

    /// Continue a paused exercise from the exact phase it froze in
    pub fn resume_breathing(&mut self) -> Result<(), SessionError> {
        let cycler = self.breathing.as_mut().ok_or(SessionError::NoBreathing)?;
        cycler.resume();
        if cycler.is_running() {
            self.timer_owner = TimerOwner::Breathing;
        }
        Ok(())
    }

    // Hand the timer back to a frozen step walk, or go idle
    fn release_breathing_timer(&mut self) {
        if self.timer_owner != TimerOwner::Breathing {
            return;
        }
        let walk_waiting = self
            .tutorial
            .as_ref()
            .is_some_and(|t| t.phase() == TutorialPhase::TimerRunning);
        self.timer_owner = if walk_waiting {
            TimerOwner::Tutorial
        } else {
            TimerOwner::Idle
        };
    }

    // =========================================================================
    // CONNECTIVITY
    // =========================================================================

    /// Absorb one connectivity report from the platform observer
    pub fn on_connectivity(&mut self, state: LinkState) -> Vec<FlowEvent> {
        if state == self.link {
            return Vec::new();
        }
        self.link = state;

        match state {
            LinkState::Offline => {
                warn!(
                    code = FaultCode::F004_CONNECTIVITY_LOSS.code(),
                    session = %self.id,
                    "connectivity lost, offline walk active"
                );
                self.offline_active = true;
                let notice =
                    "📴 You're offline. I can still help: let's walk through a few questions together.";
                self.transcript.add_companion(notice);
                self.narrate(notice);
            }
            LinkState::Online => {
                info!(session = %self.id, "connectivity restored");
                self.offline_active = false;
                self.transcript.add_companion("🌐 You're back online.");
            }
        }
        Vec::new()
    }

    // =========================================================================
    // OFFLINE WALK
    // =========================================================================

    /// Enter one offline category, restarting its question walk
    pub fn select_offline_category(&mut self, label: &str) {
        self.offline.select_category(label);
    }

    /// Record the answer for the question in view
    pub fn answer_offline(&mut self, option: &str) -> Vec<FlowEvent> {
        self.offline.answer(option)
    }

    /// Move forward in the offline walk
    pub fn offline_next(&mut self) {
        self.offline.next();
    }

    /// Move back in the offline walk
    pub fn offline_back(&mut self) {
        self.offline.back();
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn panic_level(&self) -> PanicLevel {
        self.panic_level
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn offline_active(&self) -> bool {
        self.offline_active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        self.assessment.as_ref()
    }

    pub fn tutorial(&self) -> Option<&TutorialEngine> {
        self.tutorial.as_ref()
    }

    pub fn breathing(&self) -> Option<&PhaseCycler> {
        self.breathing.as_ref()
    }

    pub fn offline(&self) -> &OfflineNavigator {
        &self.offline
    }

    /// Full serializable view
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            panic_level: self.panic_level,
            link: self.link,
            degraded: self.degraded,
            request_outstanding: self.request_outstanding,
            timer_owner: self.timer_owner,
            offline_active: self.offline_active,
            transcript: self.transcript.to_vec(),
            assessment: self.assessment.clone(),
            tutorial: self.tutorial.as_ref().map(|t| t.snapshot()),
            breathing: self.breathing.as_ref().map(|c| c.snapshot()),
            offline: self.offline.snapshot(),
        }
    }

    fn narrate(&self, text: &str) {
        if let Some(narrator) = &self.narrator {
            narrator.narrate(text);
        }
    }

    fn narrate_step_ready(&self, events: &[FlowEvent]) {
        if events
            .iter()
            .any(|e| matches!(e, FlowEvent::StepReady { .. }))
        {
            self.narrate("Time's up for this step. Ready to move on?");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{ProviderError, TriageProvider};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct DeadProvider;

    #[async_trait]
    impl AssessmentProvider for DeadProvider {
        async fn get_assessment(
            &self,
            _input: &str,
            _session_id: &str,
        ) -> Result<crate::types::RawAssessment, ProviderError> {
            Err(ProviderError::Transport("wire is down".to_string()))
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl AssessmentProvider for HangingProvider {
        async fn get_assessment(
            &self,
            _input: &str,
            _session_id: &str,
        ) -> Result<crate::types::RawAssessment, ProviderError> {
            std::future::pending().await
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNarrator {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Narrator for RecordingNarrator {
        fn narrate(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }
    }

    async fn assessed_session(text: &str) -> CrisisSession {
        let mut session = CrisisSession::new("s-test");
        let provider = TriageProvider::new();
        session.send_message(text, &provider).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_send_message_absorbs_assessment() {
        let mut session = CrisisSession::new("s-1");
        let provider = TriageProvider::new();
        let events = session
            .send_message("My father is unconscious and not breathing", &provider)
            .await
            .unwrap();

        assert_eq!(session.panic_level(), PanicLevel::Panic);
        assert!(session.assessment().is_some());
        assert!(!session.is_degraded());
        // User turn plus reassurance plus critical notice
        assert!(session.transcript().len() >= 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, FlowEvent::EscalationRequested { .. })));
    }

    #[tokio::test]
    async fn test_second_send_while_outstanding_is_rejected() {
        let mut session = CrisisSession::new("s-2");
        session.request_outstanding = true;

        let provider = TriageProvider::new();
        let result = session.send_message("help", &provider).await;
        assert!(matches!(result, Err(SessionError::RequestOutstanding)));
        // Rejected before anything was recorded
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_begun_send_blocks_others_until_completed() {
        let mut session = CrisisSession::new("s-split");
        session.begin_message("my chest hurts badly").unwrap();

        assert!(matches!(
            session.begin_message("it is getting worse"),
            Err(SessionError::RequestOutstanding)
        ));
        // The rejected send left no trace
        assert_eq!(session.transcript().len(), 1);

        let provider = TriageProvider::new();
        let result = provider.get_assessment("my chest hurts badly", "s-split").await;
        session.complete_message(result);

        assert!(!session.snapshot().request_outstanding);
        assert!(session.assessment().is_some());
        assert!(session.begin_message("follow-up").is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_send_releases_the_slot() {
        let mut session = CrisisSession::new("s-drop");

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            session.send_message("I cannot breathe", &HangingProvider),
        )
        .await;
        assert!(abandoned.is_err(), "hanging provider must outlive the timeout");

        // The dropped send released its claim without degrading anything
        assert!(!session.snapshot().request_outstanding);
        assert!(!session.is_degraded());

        let provider = TriageProvider::new();
        session
            .send_message("I cannot breathe", &provider)
            .await
            .expect("slot released after the abandoned send");
        assert!(session.assessment().is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_but_keeps_session_alive() {
        let mut session = CrisisSession::new("s-3");
        let events = session.send_message("chest pain", &DeadProvider).await.unwrap();

        assert!(events.is_empty());
        assert!(session.is_degraded());
        assert_eq!(session.panic_level(), PanicLevel::Stressed);
        let last = session.transcript().last().unwrap();
        assert!(last.text.contains("112"));
        assert!(matches!(
            session.start_tutorial(),
            Err(SessionError::NoAssessment)
        ));

        // A later successful request recovers full service
        let provider = TriageProvider::new();
        session.send_message("chest pain", &provider).await.unwrap();
        assert!(!session.is_degraded());
        assert!(session.start_tutorial().is_ok());
    }

    #[tokio::test]
    async fn test_tutorial_owns_timer_then_breathing_takes_it() {
        let mut session = assessed_session("Someone collapsed, not breathing").await;
        session.start_tutorial().unwrap();
        assert_eq!(session.timer_owner(), TimerOwner::Tutorial);
        let before = session.tutorial().unwrap().remaining_seconds();

        session.start_breathing("box").unwrap();
        assert_eq!(session.timer_owner(), TimerOwner::Breathing);

        // Ticks now feed the cycler; the step timer is frozen
        session.tick();
        session.tick();
        assert_eq!(session.tutorial().unwrap().remaining_seconds(), before);
        assert!(session.breathing().unwrap().is_running());

        // Releasing the timer hands it back to the frozen walk
        session.pause_breathing().unwrap();
        assert_eq!(session.timer_owner(), TimerOwner::Tutorial);
        session.tick();
        assert_eq!(
            session.tutorial().unwrap().remaining_seconds(),
            before - 1
        );
    }

    #[tokio::test]
    async fn test_tick_while_idle_touches_nothing() {
        let mut session = CrisisSession::new("s-idle");
        assert!(session.tick().is_empty());
        assert_eq!(session.timer_owner(), TimerOwner::Idle);
    }

    #[tokio::test]
    async fn test_connectivity_loss_activates_offline_and_answers_survive() {
        let mut session = CrisisSession::new("s-offline");

        session.on_connectivity(LinkState::Offline);
        assert!(session.offline_active());
        assert!(session.link_state().is_offline());

        session.select_offline_category("Medical");
        let events = session.answer_offline("Yes");
        assert!(events
            .iter()
            .any(|e| matches!(e, FlowEvent::AnswerRecorded { .. })));

        session.on_connectivity(LinkState::Online);
        assert!(!session.offline_active());
        // Coming back online never discards recorded answers
        assert_eq!(
            session.offline().answers().get("Medical-0"),
            Some(&"Yes".to_string())
        );

        // Duplicate report is a no-op
        assert!(session.on_connectivity(LinkState::Online).is_empty());
    }

    #[tokio::test]
    async fn test_escalate_ends_walk_and_raises_panic() {
        let mut session = assessed_session("There is a fire in my kitchen").await;
        session.start_tutorial().unwrap();

        let events = session.escalate().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, FlowEvent::EscalationRequested { .. })));
        assert_eq!(session.panic_level(), PanicLevel::Panic);
        assert_eq!(session.timer_owner(), TimerOwner::Idle);
        assert_eq!(
            session.tutorial().unwrap().phase(),
            TutorialPhase::Escalated
        );
    }

    #[tokio::test]
    async fn test_narrator_hears_reassurance_and_steps() {
        let narrator = RecordingNarrator::default();
        let mut session = CrisisSession::new("s-voice");
        session.set_narrator(Box::new(narrator.clone()));

        let provider = TriageProvider::new();
        session
            .send_message("heavy bleeding, please hurry", &provider)
            .await
            .unwrap();
        session.start_tutorial().unwrap();

        let lines = narrator.lines.lock().unwrap();
        assert!(!lines.is_empty());
        let first_step = session
            .tutorial()
            .unwrap()
            .current_step()
            .unwrap()
            .instruction
            .clone();
        assert!(lines.iter().any(|l| *l == first_step));
    }

    #[tokio::test]
    async fn test_snapshot_carries_all_surfaces() {
        let mut session = assessed_session("I feel overwhelmed and scared").await;
        session.start_tutorial().unwrap();
        session.on_connectivity(LinkState::Offline);

        let snap = session.snapshot();
        assert_eq!(snap.id, "s-test");
        assert!(snap.assessment.is_some());
        assert!(snap.tutorial.is_some());
        assert!(snap.breathing.is_none());
        assert!(snap.offline_active);
        assert!(!snap.transcript.is_empty());

        // The whole snapshot serializes for the wire
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("panic_level").is_some());
        assert!(json.get("timer_owner").is_some());
    }
}

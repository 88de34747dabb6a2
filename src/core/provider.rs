//! Provider seam between sessions and whatever produces assessments
//!
//! The session only sees this trait. The bundled implementation runs the
//! local keyword triage; a remote service would slot in behind the same
//! signature.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::core::triage::TriageEngine;
use crate::types::RawAssessment;

/// Errors a provider can surface to the session
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("assessment request failed: {0}")]
    Transport(String),
    #[error("assessment payload could not be decoded: {0}")]
    Decode(String),
}

/// Anything that can turn one user message into an assessment payload
#[async_trait]
pub trait AssessmentProvider: Send + Sync {
    async fn get_assessment(
        &self,
        input: &str,
        session_id: &str,
    ) -> Result<RawAssessment, ProviderError>;
}

/// Local triage-backed provider; never fails, never leaves the process
#[derive(Debug, Default)]
pub struct TriageProvider {
    engine: TriageEngine,
}

impl TriageProvider {
    /// Create new provider
    pub fn new() -> Self {
        Self {
            engine: TriageEngine::new(),
        }
    }
}

#[async_trait]
impl AssessmentProvider for TriageProvider {
    async fn get_assessment(
        &self,
        input: &str,
        session_id: &str,
    ) -> Result<RawAssessment, ProviderError> {
        debug!(session_id, "running local triage");
        Ok(self.engine.assess(input))
    }
}

// =============================================================================
// TESTS
// =============================================================================

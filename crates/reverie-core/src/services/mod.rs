//! External collaborator interfaces
//!
//! Capture, speech-to-text, insight analysis, and entitlement checks are
//! provided by surrounding feature code; the core only defines the contracts
//! it consumes.

use thiserror::Error;

use crate::models::StructuredInsight;

/// Speech-to-text collaborator failure.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The media could not be transcribed
    #[error("Transcription failed: {0}")]
    Failed(String),
}

/// Text-analysis collaborator failure.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The exchanges could not be analyzed
    #[error("Analysis failed: {0}")]
    Failed(String),
}

/// Turns a captured media handle into transcript text.
#[allow(async_fn_in_trait)]
pub trait TranscriptionService {
    /// Transcribe the referenced recording.
    async fn transcribe(
        &self,
        media_reference: &str,
    ) -> std::result::Result<String, TranscriptionError>;
}

/// Produces structured insight from (prompt, answer) exchanges.
#[allow(async_fn_in_trait)]
pub trait InsightService {
    /// Analyze a batch of exchanges.
    async fn analyze(
        &self,
        exchanges: &[(String, String)],
    ) -> std::result::Result<StructuredInsight, InsightError>;
}

/// Gates premium resurfacing features.
pub trait EntitlementService {
    /// Whether the user is entitled to memory resurfacing.
    fn is_entitled(&self) -> bool;
}

/// Fixed entitlement answer, for tests and environments where the check is
/// resolved ahead of time.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntitlement {
    entitled: bool,
}

impl StaticEntitlement {
    /// Build an entitlement service with a fixed answer.
    #[must_use]
    pub const fn new(entitled: bool) -> Self {
        Self { entitled }
    }
}

impl EntitlementService for StaticEntitlement {
    fn is_entitled(&self) -> bool {
        self.entitled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_entitlement_reports_fixed_answer() {
        assert!(StaticEntitlement::new(true).is_entitled());
        assert!(!StaticEntitlement::new(false).is_entitled());
    }

    #[test]
    fn collaborator_errors_render_their_cause() {
        let error = TranscriptionError::Failed("no speech detected".to_string());
        assert!(error.to_string().contains("no speech detected"));

        let error = InsightError::Failed("quota exhausted".to_string());
        assert!(error.to_string().contains("quota exhausted"));
    }
}

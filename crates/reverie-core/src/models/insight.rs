//! Structured insight produced by the external text-analysis collaborator

use serde::{Deserialize, Serialize};

/// Analysis of a batch of (prompt, answer) exchanges.
///
/// Produced outside the core by an [`InsightService`] implementation; the
/// core only defines the shape it consumes.
///
/// [`InsightService`]: crate::services::InsightService
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredInsight {
    /// One-line takeaway
    pub headline: String,
    /// Recurring themes detected across the exchanges
    pub themes: Vec<String>,
    /// Optional prompt suggested as a follow-up recording
    pub suggested_follow_up: Option<String>,
}

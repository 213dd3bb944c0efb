use crate::models::SourceKind;
use std::fmt;

/// Pipeline error taxonomy.
///
/// Only `QuotaExceeded` and `InvalidRequest` ever surface from
/// `LeadPipeline::discover`. `SourceUnavailable` and `AnalysisDegraded` are
/// recovered where they occur: a failed source contributes zero candidates,
/// a failed analysis call yields the default neutral annotation.
#[derive(Debug, Clone)]
pub enum PipelineError {
    /// The account has exhausted its monthly discovery allowance.
    QuotaExceeded,
    /// Malformed search request (e.g. empty source set).
    InvalidRequest(String),
    /// A source adapter could not produce candidates.
    SourceUnavailable {
        /// Which source failed.
        source: SourceKind,
        /// Descriptive failure tag (missing credentials, HTTP status, ...).
        reason: String,
    },
    /// The analysis capability failed for one candidate.
    AnalysisDegraded(String),
    /// A collaborator (quota gate, notifier) failed at the transport level.
    ExternalService(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::QuotaExceeded => {
                write!(f, "Monthly lead discovery limit reached")
            }
            PipelineError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            PipelineError::SourceUnavailable { source, reason } => {
                write!(f, "Source {} unavailable: {}", source, reason)
            }
            PipelineError::AnalysisDegraded(msg) => {
                write!(f, "Analysis degraded: {}", msg)
            }
            PipelineError::ExternalService(msg) => {
                write!(f, "External service error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::ExternalService(err.to_string())
    }
}

impl PipelineError {
    /// Whether the orchestrator recovers from this error locally instead of
    /// surfacing it to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceUnavailable { .. } | PipelineError::AnalysisDegraded(_)
        )
    }
}

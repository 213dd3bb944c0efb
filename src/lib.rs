//! AI-assisted sales-lead discovery, enrichment and scoring.
//!
//! The crate discovers lead candidates from a closed set of external
//! sources, merges duplicate identities, annotates each unique lead through
//! an AI analysis capability, and scores it deterministically. Entry point
//! is [`pipeline::LeadPipeline`]; callers supply a [`quota::QuotaGate`] and
//! optionally a [`notify::Notifier`].

pub mod analysis;
pub mod config;
pub mod contact;
pub mod dedupe;
pub mod errors;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod quota;
pub mod scoring;
pub mod sources;

pub use config::Config;
pub use errors::PipelineError;
pub use models::{
    Annotation, CompanySize, EnrichedLead, Industry, RawCandidate, ScoreFactor, SearchRequest,
    SourceKind,
};
pub use pipeline::LeadPipeline;
pub use quota::{InMemoryQuota, QuotaGate, UsageKind};

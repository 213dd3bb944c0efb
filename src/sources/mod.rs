//! Source adapters for lead discovery.
//!
//! Each adapter wraps one external source behind the same contract:
//! `discover(&SearchRequest) -> Result<Vec<RawCandidate>, PipelineError>`.
//! Expected failure modes (missing credentials, network errors, empty
//! results) surface as `SourceUnavailable` or an empty list; the orchestrator
//! recovers from both without touching the other sources.
//!
//! The set of sources is closed: adding one means adding a `SourceKind`
//! variant, an adapter module here, and an arm in `SourceAdapter::for_kind`.
//! Unknown kinds never reach this module; they are rejected when the
//! request is parsed.

mod marketplace;
mod news_feed;
mod profile_index;
mod registry;
mod social_feed;
mod web_page;

pub use marketplace::MarketplaceAdapter;
pub use news_feed::NewsFeedAdapter;
pub use profile_index::ProfileIndexAdapter;
pub use registry::RegistryAdapter;
pub use social_feed::SocialFeedAdapter;
pub use web_page::WebPageAdapter;

use crate::analysis::AnalysisClient;
use crate::config::Config;
use crate::errors::PipelineError;
use crate::models::{RawCandidate, SearchRequest, SourceKind};
use std::sync::Arc;

/// The closed adapter set, dispatched statically.
pub enum SourceAdapter {
    ProfileIndex(ProfileIndexAdapter),
    Marketplace(MarketplaceAdapter),
    WebPage(WebPageAdapter),
    NewsFeed(NewsFeedAdapter),
    SocialFeed(SocialFeedAdapter),
    Registry(RegistryAdapter),
}

impl SourceAdapter {
    /// Resolve the adapter for a requested source kind.
    pub fn for_kind(
        kind: SourceKind,
        config: &Config,
        analysis: Arc<AnalysisClient>,
        client: reqwest::Client,
    ) -> Self {
        match kind {
            SourceKind::ProfileIndex => {
                SourceAdapter::ProfileIndex(ProfileIndexAdapter::new(config, client))
            }
            SourceKind::Marketplace => {
                SourceAdapter::Marketplace(MarketplaceAdapter::new(config, client))
            }
            SourceKind::WebPage => SourceAdapter::WebPage(WebPageAdapter::new(config, client)),
            SourceKind::NewsFeed => {
                SourceAdapter::NewsFeed(NewsFeedAdapter::new(config, analysis, client))
            }
            SourceKind::SocialFeed => {
                SourceAdapter::SocialFeed(SocialFeedAdapter::new(config, client))
            }
            SourceKind::Registry => SourceAdapter::Registry(RegistryAdapter::new(config, client)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceAdapter::ProfileIndex(_) => SourceKind::ProfileIndex,
            SourceAdapter::Marketplace(_) => SourceKind::Marketplace,
            SourceAdapter::WebPage(_) => SourceKind::WebPage,
            SourceAdapter::NewsFeed(_) => SourceKind::NewsFeed,
            SourceAdapter::SocialFeed(_) => SourceKind::SocialFeed,
            SourceAdapter::Registry(_) => SourceKind::Registry,
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        match self {
            SourceAdapter::ProfileIndex(a) => a.discover(request).await,
            SourceAdapter::Marketplace(a) => a.discover(request).await,
            SourceAdapter::WebPage(a) => a.discover(request).await,
            SourceAdapter::NewsFeed(a) => a.discover(request).await,
            SourceAdapter::SocialFeed(a) => a.discover(request).await,
            SourceAdapter::Registry(a) => a.discover(request).await,
        }
    }
}

/// Shorthand for the adapters' expected failure tag.
pub(crate) fn unavailable(source: SourceKind, reason: impl Into<String>) -> PipelineError {
    PipelineError::SourceUnavailable {
        source,
        reason: reason.into(),
    }
}

/// Credential gate shared by the key-bearing adapters.
pub(crate) fn require_key(
    key: &Option<String>,
    source: SourceKind,
) -> Result<String, PipelineError> {
    key.clone()
        .ok_or_else(|| unavailable(source, "API key not configured"))
}

use crate::analysis::AnalysisClient;
use crate::config::Config;
use crate::dedupe::dedupe;
use crate::errors::PipelineError;
use crate::models::{EnrichedLead, RawCandidate, SearchRequest, SourceKind};
use crate::notify::Notifier;
use crate::quota::{QuotaGate, UsageKind};
use crate::scoring::score_lead;
use crate::sources::SourceAdapter;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The discovery orchestrator.
///
/// One run walks the stages in order: validate, quota check, concurrent
/// source fan-out, dedup, sequential enrichment and scoring, usage
/// recording. Source failures never fail the run; a run only errors on a
/// bad request, an exhausted quota, or a quota gate that cannot answer.
pub struct LeadPipeline {
    config: Arc<Config>,
    http: reqwest::Client,
    analysis: Arc<AnalysisClient>,
    quota: Arc<dyn QuotaGate>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl LeadPipeline {
    pub fn new(config: Config, quota: Arc<dyn QuotaGate>) -> Result<Self, PipelineError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                PipelineError::ExternalService(format!("Failed to create HTTP client: {}", e))
            })?;
        let analysis = Arc::new(AnalysisClient::new(&config, http.clone()));
        Ok(Self {
            config: Arc::new(config),
            http,
            analysis,
            quota,
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run one discovery search for an account.
    ///
    /// # Arguments
    /// * `request` - industry, optional filters, and the ordered source list
    /// * `account_id` - the account charged for the run
    ///
    /// Returns the enriched, scored leads. An empty list is a valid outcome
    /// (all sources failed or nothing survived dedup) and does not consume
    /// quota.
    pub async fn discover(
        &self,
        request: &SearchRequest,
        account_id: Uuid,
    ) -> Result<Vec<EnrichedLead>, PipelineError> {
        request.validate()?;

        if !self.quota.can_discover(account_id).await? {
            tracing::warn!("Account {} is over its monthly lead limit", account_id);
            return Err(PipelineError::QuotaExceeded);
        }

        tracing::info!(
            "Starting discovery for {} across {} source(s)",
            request.industry,
            request.sources.len()
        );

        let raw = self.fan_out(request).await;
        let unique = dedupe(raw);
        tracing::info!("{} unique candidate(s) after dedup", unique.len());

        let mut leads = Vec::with_capacity(unique.len());
        for (i, candidate) in unique.into_iter().enumerate() {
            if i > 0 && self.config.analysis_delay_ms > 0 {
                // Upstream analysis rate limit; spacing calls beats retrying 429s
                tokio::time::sleep(Duration::from_millis(self.config.analysis_delay_ms)).await;
            }

            let analysis = self.analysis.analyze(&candidate).await;
            let score_factors = self.analysis.suggest_factors(&candidate).await;
            let score = score_lead(&candidate, &analysis);
            leads.push(EnrichedLead {
                candidate,
                analysis,
                score_factors,
                score,
                discovered_at: Utc::now(),
            });
        }

        if !leads.is_empty() {
            // Only the entry check fails closed; after enrichment a gate
            // failure is recovered and the computed leads still return
            if let Err(e) = self.quota.record_usage(account_id, UsageKind::Leads).await {
                tracing::warn!("Failed to record usage for {}: {}", account_id, e);
            }

            if let Some(notifier) = &self.notifier {
                let notifier = Arc::clone(notifier);
                let count = leads.len();
                // Fire and forget; a slow webhook must not delay the response
                tokio::spawn(async move {
                    notifier.leads_discovered(account_id, count).await;
                });
            }
        }

        tracing::info!("Discovery produced {} lead(s)", leads.len());
        Ok(leads)
    }

    /// Query every requested source concurrently, collecting whatever
    /// succeeds. Results come back in request order regardless of which
    /// source answered first, so dedup stays deterministic.
    async fn fan_out(&self, request: &SearchRequest) -> Vec<RawCandidate> {
        let mut kinds: Vec<SourceKind> = Vec::new();
        for kind in &request.sources {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        let timeout = Duration::from_secs(self.config.adapter_timeout_secs);
        let mut handles = Vec::with_capacity(kinds.len());
        for kind in &kinds {
            let kind = *kind;
            let config = Arc::clone(&self.config);
            let analysis = Arc::clone(&self.analysis);
            let client = self.http.clone();
            let request = request.clone();
            handles.push(tokio::spawn(async move {
                let adapter = SourceAdapter::for_kind(kind, &config, analysis, client);
                tokio::time::timeout(timeout, adapter.discover(&request)).await
            }));
        }

        let mut candidates = Vec::new();
        for (kind, handle) in kinds.into_iter().zip(handles) {
            match handle.await {
                Ok(Ok(Ok(mut found))) => {
                    tracing::info!("Source {} contributed {} candidate(s)", kind, found.len());
                    candidates.append(&mut found);
                }
                Ok(Ok(Err(e))) => {
                    tracing::warn!("Source {} failed: {}", kind, e);
                }
                Ok(Err(_)) => {
                    tracing::warn!(
                        "Source {} timed out after {}s",
                        kind,
                        self.config.adapter_timeout_secs
                    );
                }
                Err(e) => {
                    tracing::warn!("Source {} task panicked: {}", kind, e);
                }
            }
        }
        candidates
    }
}

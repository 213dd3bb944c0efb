use crate::config::Config;
use crate::errors::PipelineError;
use crate::models::{
    Annotation, BudgetLevel, IntentLevel, RawCandidate, ScoreFactor, Sentiment, TimelineBucket,
};
use moka::future::Cache;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for the external AI analysis capability (OpenAI-compatible chat
/// completions).
///
/// One long-lived instance per process; every call is stateless, so the
/// orchestrator and adapters may share it freely. Every public method
/// degrades on failure instead of erroring: a missing key, timeout, rate
/// limit or malformed response yields the neutral default payload, and the
/// failure is only logged.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    /// Annotations keyed by identity, so a repeat discovery of the same
    /// person within the TTL skips the paid call. Failures are never cached.
    annotation_cache: Cache<String, Annotation>,
}

/// Contact information extracted from free text (news article bodies).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSheet {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default, alias = "jobTitles")]
    pub job_titles: Vec<String>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Annotation payload as the model emits it; field names follow the prompt.
#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default, alias = "painPoints")]
    pain_points: Vec<String>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    timeline: Option<String>,
    #[serde(default, alias = "decisionMaker")]
    decision_maker: bool,
    #[serde(default)]
    sentiment: Option<String>,
}

#[derive(Deserialize)]
struct FactorsEnvelope {
    #[serde(default)]
    factors: Vec<ScoreFactor>,
}

impl AnalysisClient {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.analysis_base_url.clone(),
            api_key: config.analysis_api_key.clone(),
            model: config.analysis_model.clone(),
            timeout: Duration::from_secs(config.analysis_timeout_secs),
            annotation_cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(50_000)
                .build(),
        }
    }

    /// Annotate one candidate. Never fails: any error substitutes the
    /// all-Unknown default annotation.
    pub async fn analyze(&self, candidate: &RawCandidate) -> Annotation {
        let cache_key = candidate.identity_key().as_str().to_string();
        if let Some(cached) = self.annotation_cache.get(&cache_key).await {
            tracing::debug!("Annotation cache hit for {}", candidate.name);
            return cached;
        }

        match self.try_analyze(candidate).await {
            Ok(annotation) => {
                self.annotation_cache
                    .insert(cache_key, annotation.clone())
                    .await;
                annotation
            }
            Err(e) => {
                tracing::warn!(
                    "Analysis degraded for '{}' ({}): {}",
                    candidate.name,
                    candidate.company,
                    e
                );
                Annotation::default()
            }
        }
    }

    async fn try_analyze(&self, candidate: &RawCandidate) -> Result<Annotation, PipelineError> {
        let prompt = format!(
            "Analyze the following lead information and provide insights:\n\n\
             Name: {}\n\
             Company: {}\n\
             Job Title: {}\n\
             Industry: {}\n\
             Company Size: {}\n\
             Website: {}\n\
             Description: {}\n\n\
             Please provide:\n\
             1. Intent level (High/Medium/Low/Unknown) - likelihood to purchase\n\
             2. Pain points they might have\n\
             3. Budget level (High/Medium/Low/Unknown)\n\
             4. Timeline (Immediate/1-3 months/3-6 months/6+ months/Unknown)\n\
             5. Whether they are likely a decision maker (true/false)\n\
             6. Overall sentiment (Positive/Neutral/Negative)\n\n\
             Respond in JSON format only, with keys: intent, pain_points, budget, \
             timeline, decision_maker, sentiment.",
            candidate.name,
            candidate.company,
            candidate.job_title.as_deref().unwrap_or("Unknown"),
            candidate
                .industry
                .map(|i| i.as_str())
                .unwrap_or("Unknown"),
            candidate
                .company_size
                .map(|s| s.as_str())
                .unwrap_or("Unknown"),
            candidate.company_website.as_deref().unwrap_or("Unknown"),
            candidate
                .description
                .as_deref()
                .unwrap_or("No description available"),
        );

        let content = self.chat(&prompt, 0.3, 500).await?;
        parse_annotation(&content)
    }

    /// Ask for an advisory scoring-factor breakdown. Empty list on failure.
    pub async fn suggest_factors(&self, candidate: &RawCandidate) -> Vec<ScoreFactor> {
        let prompt = format!(
            "Analyze this lead and provide scoring factors:\n\n\
             Company: {}\n\
             Industry: {}\n\
             Job Title: {}\n\
             Company Size: {}\n\
             Website: {}\n\n\
             Provide scoring factors in JSON format:\n\
             {{\"factors\": [{{\"factor\": \"Job Title Relevance\", \"weight\": 0.3, \
             \"value\": \"High\", \"reason\": \"Explanation\"}}]}}\n\n\
             Consider factors like job title relevance to decision making, company \
             size and growth potential, industry alignment, contact information \
             completeness, and website quality indicators.",
            candidate.company,
            candidate
                .industry
                .map(|i| i.as_str())
                .unwrap_or("Unknown"),
            candidate.job_title.as_deref().unwrap_or("Unknown"),
            candidate
                .company_size
                .map(|s| s.as_str())
                .unwrap_or("Unknown"),
            candidate.company_website.as_deref().unwrap_or("Unknown"),
        );

        match self.chat(&prompt, 0.3, 600).await.and_then(|c| parse_factors(&c)) {
            Ok(factors) => factors,
            Err(e) => {
                tracing::warn!("Score factor suggestion failed for '{}': {}", candidate.name, e);
                Vec::new()
            }
        }
    }

    /// Extract contact info from free text (used by the news adapter).
    /// Empty sheet on failure.
    pub async fn extract_contacts(&self, text: &str) -> ContactSheet {
        let prompt = format!(
            "Extract contact information from the following text:\n\n{}\n\n\
             Return JSON with keys: emails, phones, names, companies, job_titles. \
             Use an empty array for any field with no information.",
            text
        );

        match self.chat(&prompt, 0.1, 500).await.and_then(|c| parse_contacts(&c)) {
            Ok(sheet) => sheet,
            Err(e) => {
                tracing::warn!("Contact extraction failed: {}", e);
                ContactSheet::default()
            }
        }
    }

    async fn chat(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, PipelineError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PipelineError::AnalysisDegraded("analysis API key not configured".to_string())
        })?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::AnalysisDegraded(format!("analysis request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PipelineError::AnalysisDegraded(format!(
                "analysis capability returned status {}",
                status
            )));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            PipelineError::AnalysisDegraded(format!("failed to parse completion: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::AnalysisDegraded("empty completion".to_string()))
    }
}

/// Strip markdown code fences the model sometimes wraps JSON in.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn parse_annotation(content: &str) -> Result<Annotation, PipelineError> {
    let raw: RawAnalysis = serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        PipelineError::AnalysisDegraded(format!("malformed analysis payload: {}", e))
    })?;

    Ok(Annotation {
        intent: raw
            .intent
            .as_deref()
            .map(IntentLevel::parse_loose)
            .unwrap_or_default(),
        pain_points: raw.pain_points,
        budget: raw
            .budget
            .as_deref()
            .map(BudgetLevel::parse_loose)
            .unwrap_or_default(),
        timeline: raw
            .timeline
            .as_deref()
            .map(TimelineBucket::parse_loose)
            .unwrap_or_default(),
        decision_maker: raw.decision_maker,
        sentiment: raw
            .sentiment
            .as_deref()
            .map(Sentiment::parse_loose)
            .unwrap_or_default(),
    })
}

fn parse_factors(content: &str) -> Result<Vec<ScoreFactor>, PipelineError> {
    let envelope: FactorsEnvelope =
        serde_json::from_str(strip_code_fence(content)).map_err(|e| {
            PipelineError::AnalysisDegraded(format!("malformed factors payload: {}", e))
        })?;
    Ok(envelope.factors)
}

fn parse_contacts(content: &str) -> Result<ContactSheet, PipelineError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        PipelineError::AnalysisDegraded(format!("malformed contact payload: {}", e))
    })
}

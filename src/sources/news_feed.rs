use super::{require_key, unavailable};
use crate::analysis::AnalysisClient;
use crate::config::Config;
use crate::contact::{sanitize_email, sanitize_phone};
use crate::errors::PipelineError;
use crate::models::{RawCandidate, SearchRequest, SourceKind};
use serde::Deserialize;
use std::sync::Arc;

const KIND: SourceKind = SourceKind::NewsFeed;

/// News and press-release search.
///
/// Articles do not carry structured contacts, so each article body goes
/// through the shared analysis client's contact extraction. Extraction is
/// best-effort under the usual fallback policy: an unreachable analysis
/// capability just means zero candidates from this source.
pub struct NewsFeedAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    analysis: Arc<AnalysisClient>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct Article {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl NewsFeedAdapter {
    pub fn new(config: &Config, analysis: Arc<AnalysisClient>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.news_base_url.clone(),
            api_key: config.news_api_key.clone(),
            analysis,
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let api_key = require_key(&self.api_key, KIND)?;

        let query = format!("{} {}", request.industry, request.keywords.join(" "));
        // Encoded query building; the api key travels as a query param on
        // this API, so keep it out of any logged URL.
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url),
            &[
                ("q", query.trim()),
                ("apiKey", api_key.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", "50"),
            ],
        )
        .map_err(|e| unavailable(KIND, format!("failed to build URL: {}", e)))?;

        tracing::info!("Searching news feed for {} leads", request.industry);
        tracing::debug!(
            "News URL: {}/v2/everything?q={}&apiKey=[REDACTED]",
            self.base_url,
            query.trim()
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(KIND, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(unavailable(
                KIND,
                format!("returned status {}", response.status()),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| unavailable(KIND, format!("malformed response: {}", e)))?;

        let mut candidates = Vec::new();
        for article in parsed.articles {
            let Some(text) = article.content.as_deref().or(article.description.as_deref())
            else {
                continue;
            };

            let sheet = self.analysis.extract_contacts(text).await;
            let pairings = sheet.names.len().min(sheet.companies.len());
            for i in 0..pairings {
                let mut candidate =
                    RawCandidate::new(sheet.names[i].clone(), sheet.companies[i].clone(), KIND);
                candidate.email = sanitize_email(sheet.emails.get(i).cloned());
                candidate.phone = sanitize_phone(sheet.phones.get(i).cloned());
                candidate.job_title = sheet.job_titles.get(i).cloned();
                candidate.industry = Some(request.industry);
                candidate.description = article.description.clone();
                candidate.source_ref = article.url.clone();
                candidates.push(candidate);
            }
        }

        tracing::info!("News feed yielded {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

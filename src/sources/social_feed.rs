use super::{require_key, unavailable};
use crate::config::Config;
use crate::errors::PipelineError;
use crate::models::{RawCandidate, SearchRequest, SourceKind};
use serde::Deserialize;

const KIND: SourceKind = SourceKind::SocialFeed;

/// Social post search. Signal here is thin (a post author talking about the
/// industry), so most of the candidate shape stays optional.
pub struct SocialFeedAdapter {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct Post {
    author_name: String,
    #[serde(default)]
    author_title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl SocialFeedAdapter {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.social_base_url.clone(),
            api_token: config.social_api_token.clone(),
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let token = require_key(&self.api_token, KIND)?;

        let query = if request.keywords.is_empty() {
            request.industry.as_str().to_string()
        } else {
            format!("{} {}", request.industry, request.keywords.join(" "))
        };
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/posts/search", self.base_url),
            &[("query", query.as_str()), ("max_results", "50")],
        )
        .map_err(|e| unavailable(KIND, format!("failed to build URL: {}", e)))?;

        tracing::info!("Searching social feed for {} leads", request.industry);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
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

        let candidates: Vec<RawCandidate> = parsed
            .posts
            .into_iter()
            .filter_map(|post| {
                // Posts without a company affiliation cannot become candidates
                let company = post.company?;
                let mut candidate = RawCandidate::new(post.author_name, company, KIND);
                candidate.job_title = post.author_title;
                candidate.industry = Some(request.industry);
                candidate.description = post.text;
                candidate.source_ref = post.url;
                Some(candidate)
            })
            .collect();

        tracing::info!("Social feed returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

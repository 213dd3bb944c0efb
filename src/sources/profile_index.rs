use super::{require_key, unavailable};
use crate::config::Config;
use crate::contact::sanitize_email;
use crate::errors::PipelineError;
use crate::models::{RawCandidate, SearchRequest, SourceKind};
use serde::Deserialize;

const KIND: SourceKind = SourceKind::ProfileIndex;

/// Professional-network profile index search.
pub struct ProfileIndexAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    profiles: Vec<Profile>,
}

#[derive(Deserialize)]
struct Profile {
    name: String,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    profile_url: Option<String>,
}

impl ProfileIndexAdapter {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.profile_index_base_url.clone(),
            api_key: config.profile_index_api_key.clone(),
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let api_key = require_key(&self.api_key, KIND)?;

        // Encode via parse_with_params to keep user keywords out of the raw URL
        let mut params: Vec<(&str, String)> = vec![
            ("industry", request.industry.as_str().to_string()),
            ("keywords", request.keywords.join(" ")),
        ];
        if let Some(location) = &request.location {
            params.push(("location", location.clone()));
        }
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/people/search", self.base_url),
            &params,
        )
        .map_err(|e| unavailable(KIND, format!("failed to build URL: {}", e)))?;

        tracing::info!("Searching profile index for {} leads", request.industry);
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", api_key)
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
            .profiles
            .into_iter()
            .filter_map(|profile| {
                let company = profile.company?;
                let mut candidate = RawCandidate::new(profile.name, company, KIND);
                candidate.email = sanitize_email(profile.email);
                candidate.job_title = profile.job_title;
                candidate.industry = Some(request.industry);
                candidate.location = profile.location.or_else(|| request.location.clone());
                candidate.source_ref = profile.profile_url;
                Some(candidate)
            })
            .collect();

        tracing::info!("Profile index returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

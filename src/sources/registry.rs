use super::{require_key, unavailable};
use crate::config::Config;
use crate::contact::{sanitize_email, sanitize_phone};
use crate::errors::PipelineError;
use crate::models::{CompanySize, RawCandidate, SearchRequest, SourceKind};
use serde::Deserialize;

const KIND: SourceKind = SourceKind::Registry;

/// Industry registry / database lookup.
pub struct RegistryAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    contact_name: String,
    company: String,
    #[serde(default)]
    contact_title: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    employees: Option<u32>,
    #[serde(default)]
    revenue: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    reference: Option<String>,
}

impl RegistryAdapter {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.registry_base_url.clone(),
            api_key: config.registry_api_key.clone(),
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let api_key = require_key(&self.api_key, KIND)?;

        let mut params: Vec<(&str, String)> =
            vec![("industry", request.industry.as_str().to_string())];
        if let Some(location) = &request.location {
            params.push(("location", location.clone()));
        }
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/companies/search", self.base_url),
            &params,
        )
        .map_err(|e| unavailable(KIND, format!("failed to build URL: {}", e)))?;

        tracing::info!("Searching industry registry for {} leads", request.industry);
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
            .entries
            .into_iter()
            .map(|entry| {
                let mut candidate = RawCandidate::new(entry.contact_name, entry.company, KIND);
                candidate.email = sanitize_email(entry.email);
                candidate.phone = sanitize_phone(entry.phone);
                candidate.job_title = entry.contact_title;
                candidate.industry = Some(request.industry);
                candidate.company_size = entry.employees.map(CompanySize::from_headcount);
                candidate.company_revenue = entry.revenue;
                candidate.company_website = entry.website;
                candidate.location = entry.location.or_else(|| request.location.clone());
                candidate.source_ref = entry.reference;
                candidate
            })
            .collect();

        tracing::info!("Registry returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

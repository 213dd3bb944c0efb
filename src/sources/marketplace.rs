use super::{require_key, unavailable};
use crate::config::Config;
use crate::contact::{sanitize_email, sanitize_phone};
use crate::errors::PipelineError;
use crate::models::{CompanySize, RawCandidate, SearchRequest, SourceKind};
use serde::Deserialize;
use serde_json::json;

const KIND: SourceKind = SourceKind::Marketplace;

/// Titles worth paying marketplace credits for; matches the decision-maker
/// filter the scoring engine rewards.
const PERSON_TITLES: [&str; 5] = ["CEO", "CTO", "VP", "Director", "Manager"];

/// Data-enrichment marketplace people search (Apollo-style API).
pub struct MarketplaceAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Deserialize)]
struct Person {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    organization: Option<Organization>,
    #[serde(default)]
    linkedin_url: Option<String>,
}

#[derive(Deserialize)]
struct PhoneNumber {
    #[serde(default)]
    sanitized_number: Option<String>,
}

#[derive(Deserialize)]
struct Organization {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    estimated_num_employees: Option<u32>,
    #[serde(default)]
    website_url: Option<String>,
}

impl MarketplaceAdapter {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.marketplace_base_url.clone(),
            api_key: config.marketplace_api_key.clone(),
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let api_key = require_key(&self.api_key, KIND)?;

        let url = format!("{}/v1/mixed_people/search", self.base_url);
        let mut body = json!({
            "q_organization_domains": request.keywords.join(" "),
            "person_titles": PERSON_TITLES,
            "page": 1,
            "per_page": 25,
        });
        if let Some(location) = &request.location {
            body["organization_locations"] = json!([location]);
        }
        if let Some(size) = request.company_size {
            body["organization_num_employees_ranges"] = json!([size.as_str()]);
        }

        tracing::info!("Searching marketplace for {} leads", request.industry);
        let response = self
            .client
            .post(&url)
            .header("Cache-Control", "no-cache")
            .header("X-Api-Key", api_key)
            .json(&body)
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
        for person in parsed.people {
            let name = match (&person.first_name, &person.last_name) {
                (Some(first), Some(last)) => format!("{} {}", first, last),
                (Some(first), None) => first.clone(),
                (None, Some(last)) => last.clone(),
                (None, None) => continue,
            };
            // Company is required on candidates; a person without an
            // organization cannot be keyed or scored meaningfully.
            let Some(company) = person.organization.as_ref().and_then(|o| o.name.clone()) else {
                continue;
            };

            let mut candidate = RawCandidate::new(name, company, KIND);
            candidate.email = sanitize_email(person.email);
            candidate.phone = sanitize_phone(
                person
                    .phone_numbers
                    .into_iter()
                    .find_map(|p| p.sanitized_number),
            );
            candidate.job_title = person.title;
            candidate.industry = Some(request.industry);
            candidate.location = request.location.clone();
            if let Some(org) = person.organization {
                candidate.company_size =
                    org.estimated_num_employees.map(CompanySize::from_headcount);
                candidate.company_website = org.website_url;
            }
            candidate.source_ref = person.linkedin_url;
            candidates.push(candidate);
        }

        tracing::info!("Marketplace returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

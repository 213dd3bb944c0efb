use super::unavailable;
use crate::config::Config;
use crate::contact::{sanitize_email, sanitize_phone};
use crate::errors::PipelineError;
use crate::models::{RawCandidate, SearchRequest, SourceKind};
use regex::Regex;
use std::time::Duration;

const KIND: SourceKind = SourceKind::WebPage;

/// Best-effort scraping of company pages named in the request keywords.
///
/// Keywords that look like domains or URLs become fetch targets; everything
/// else is ignored. A page that fails to fetch or parse is logged and
/// skipped, so the adapter itself only fails when no keyword yields a
/// target at all.
pub struct WebPageAdapter {
    client: reqwest::Client,
    scraping_delay_ms: u64,
}

impl WebPageAdapter {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            scraping_delay_ms: config.scraping_delay_ms,
        }
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, PipelineError> {
        let targets = scrape_targets(&request.keywords);
        if targets.is_empty() {
            return Err(unavailable(
                KIND,
                "no keyword resolves to a scrapeable URL",
            ));
        }

        tracing::info!("Scraping {} page(s) for leads", targets.len());
        let mut candidates = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            if i > 0 && self.scraping_delay_ms > 0 {
                // Pace requests so we do not hammer the target site
                tokio::time::sleep(Duration::from_millis(self.scraping_delay_ms)).await;
            }

            match self.fetch_page(target).await {
                Ok(body) => {
                    let company = host_of(target).unwrap_or_else(|| target.clone());
                    let mut found = extract_leads_from_page(&body, &company, request);
                    tracing::info!("Found {} lead(s) on {}", found.len(), target);
                    candidates.append(&mut found);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", target, e);
                }
            }
        }

        Ok(candidates)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, PipelineError> {
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

        response
            .text()
            .await
            .map_err(|e| unavailable(KIND, format!("unreadable body: {}", e)))
    }
}

/// Keywords that look like a site (contain a dot, no whitespace) become
/// fetch targets, capped at three per run.
fn scrape_targets(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| k.contains('.') && !k.contains(char::is_whitespace))
        .take(3)
        .map(|k| {
            if k.starts_with("http://") || k.starts_with("https://") {
                k.clone()
            } else {
                format!("https://{}", k)
            }
        })
        .collect()
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

/// Pull candidate contacts out of raw page HTML.
///
/// Pages are not structured data, so this leans on three loose patterns:
/// "Name, Title" pairs in the visible text, email addresses, and US-style
/// phone numbers. A person only becomes a candidate with a name, a title
/// and at least one contact channel.
fn extract_leads_from_page(html: &str, company: &str, request: &SearchRequest) -> Vec<RawCandidate> {
    let text = strip_tags(html);

    // Exactly two capitalized words before the comma, so a capitalized
    // heading right before the name ("Leadership Jane Smith, CEO") cannot
    // leak into the captured name
    let pair_re = Regex::new(
        r"([A-Z][a-z]+ [A-Z][a-z]+),\s*((?:CEO|CTO|CFO|COO|VP|President|Director|Manager|Founder|Owner|Head)[A-Za-z &]*)",
    )
    .unwrap();
    let email_re =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
    let phone_re =
        Regex::new(r"(?:\+1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").unwrap();

    let emails: Vec<&str> = email_re.find_iter(&text).map(|m| m.as_str()).collect();
    let phones: Vec<&str> = phone_re.find_iter(&text).map(|m| m.as_str()).collect();

    let mut candidates = Vec::new();
    for (i, caps) in pair_re.captures_iter(&text).enumerate() {
        let name = caps[1].trim().to_string();
        let title = caps[2].trim().to_string();
        let email = sanitize_email(emails.get(i).map(|e| e.to_string()));
        let phone = sanitize_phone(phones.get(i).map(|p| p.to_string()));
        // Contactless names are noise, not leads
        if email.is_none() && phone.is_none() {
            continue;
        }

        let mut candidate = RawCandidate::new(name, company.to_string(), KIND);
        candidate.email = email;
        candidate.phone = phone;
        candidate.job_title = Some(title);
        candidate.industry = Some(request.industry);
        candidate.location = request.location.clone();
        candidate.company_website = Some(format!("https://{}", company));
        candidates.push(candidate);
    }

    candidates
}

/// Replace markup with spaces so token boundaries survive tag removal.
fn strip_tags(html: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    let collapsed = tag_re.replace_all(html, " ");
    let ws_re = Regex::new(r"\s+").unwrap();
    ws_re.replace_all(&collapsed, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Industry;

    fn request() -> SearchRequest {
        let mut request = SearchRequest::new(Industry::Technology, vec![SourceKind::WebPage]);
        request.keywords = vec!["techcorp.com".to_string()];
        request
    }

    #[test]
    fn test_scrape_targets_filters_and_prefixes() {
        let keywords = vec![
            "techcorp.com".to_string(),
            "cloud software".to_string(),
            "https://example.org/team".to_string(),
        ];
        assert_eq!(
            scrape_targets(&keywords),
            vec![
                "https://techcorp.com".to_string(),
                "https://example.org/team".to_string(),
            ]
        );
    }

    #[test]
    fn test_scrape_targets_caps_at_three() {
        let keywords = vec![
            "a.com".to_string(),
            "b.com".to_string(),
            "c.com".to_string(),
            "d.com".to_string(),
        ];
        assert_eq!(scrape_targets(&keywords).len(), 3);
    }

    #[test]
    fn test_extract_leads_with_contact_info() {
        let html = r#"
            <html><body>
              <h2>Leadership</h2>
              <p>Jane Smith, CEO of TechCorp. Reach her at jane.smith@techcorp.com
                 or (415) 555-2671.</p>
              <p>Bob Jones, VP of Sales. bob.jones@techcorp.com</p>
            </body></html>
        "#;
        let leads = extract_leads_from_page(html, "techcorp.com", &request());
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Jane Smith");
        assert_eq!(leads[0].job_title.as_deref(), Some("CEO of TechCorp"));
        assert_eq!(leads[0].email.as_deref(), Some("jane.smith@techcorp.com"));
        assert_eq!(leads[0].phone.as_deref(), Some("+14155552671"));
        assert_eq!(leads[1].name, "Bob Jones");
    }

    #[test]
    fn test_heading_words_do_not_leak_into_names() {
        // After tag stripping a heading sits directly before the name
        let html = "<h2>Leadership</h2><p>Jane Smith, CEO. jane@techcorp.com</p>";
        let leads = extract_leads_from_page(html, "techcorp.com", &request());
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Jane Smith");
    }

    #[test]
    fn test_contactless_names_are_skipped() {
        let html = "<p>Alice Brown, Director of Engineering. No contact listed.</p>";
        let leads = extract_leads_from_page(html, "example.com", &request());
        assert!(leads.is_empty());
    }

    #[test]
    fn test_strip_tags_keeps_token_boundaries() {
        assert_eq!(
            strip_tags("<p>Jane Smith,</p><span>CEO</span>"),
            "Jane Smith, CEO"
        );
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://techcorp.com/about"),
            Some("techcorp.com".to_string())
        );
        assert_eq!(host_of("not a url"), None);
    }
}

use serde::Deserialize;

/// Runtime configuration for the discovery pipeline.
///
/// Source credentials are all optional: an adapter without credentials
/// reports itself unavailable and contributes zero candidates instead of
/// blocking the run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the AI analysis capability (OpenAI-compatible).
    pub analysis_base_url: String,
    pub analysis_api_key: Option<String>,
    pub analysis_model: String,
    /// Fixed delay between per-candidate analysis calls (upstream rate limit).
    pub analysis_delay_ms: u64,
    /// Per-call timeout for the analysis capability.
    pub analysis_timeout_secs: u64,

    /// Per-adapter timeout during the fan-out phase.
    pub adapter_timeout_secs: u64,
    /// Delay between paginated/scraped page fetches.
    pub scraping_delay_ms: u64,
    pub user_agent: String,

    pub profile_index_base_url: String,
    pub profile_index_api_key: Option<String>,
    pub marketplace_base_url: String,
    pub marketplace_api_key: Option<String>,
    pub news_base_url: String,
    pub news_api_key: Option<String>,
    pub social_base_url: String,
    pub social_api_token: Option<String>,
    pub registry_base_url: String,
    pub registry_api_key: Option<String>,

    /// Optional webhook for "N leads discovered" notifications.
    pub notify_webhook_url: Option<String>,
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn base_url_env(name: &str, default: &str) -> anyhow::Result<String> {
    let url = env_or(name, default);
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn numeric_env(name: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer", name)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            analysis_base_url: base_url_env("ANALYSIS_BASE_URL", "https://api.openai.com")?,
            analysis_api_key: optional_env("OPENAI_API_KEY"),
            analysis_model: env_or("ANALYSIS_MODEL", "gpt-4"),
            analysis_delay_ms: numeric_env("ANALYSIS_DELAY_MS", 500)?,
            analysis_timeout_secs: numeric_env("ANALYSIS_TIMEOUT_SECS", 30)?,
            adapter_timeout_secs: numeric_env("ADAPTER_TIMEOUT_SECS", 20)?,
            scraping_delay_ms: numeric_env("SCRAPING_DELAY", 1000)?,
            user_agent: env_or(
                "USER_AGENT",
                "Mozilla/5.0 (compatible; AI-Lead-Finder/1.0)",
            ),
            profile_index_base_url: base_url_env(
                "PROFILE_INDEX_BASE_URL",
                "https://api.profileindex.example.com",
            )?,
            profile_index_api_key: optional_env("PROFILE_INDEX_API_KEY"),
            marketplace_base_url: base_url_env("MARKETPLACE_BASE_URL", "https://api.apollo.io")?,
            marketplace_api_key: optional_env("APOLLO_API_KEY"),
            news_base_url: base_url_env("NEWS_BASE_URL", "https://newsapi.org")?,
            news_api_key: optional_env("NEWS_API_KEY"),
            social_base_url: base_url_env(
                "SOCIAL_BASE_URL",
                "https://api.socialsearch.example.com",
            )?,
            social_api_token: optional_env("SOCIAL_API_TOKEN"),
            registry_base_url: base_url_env(
                "REGISTRY_BASE_URL",
                "https://api.industry-registry.example.com",
            )?,
            registry_api_key: optional_env("REGISTRY_API_KEY"),
            notify_webhook_url: optional_env("NOTIFY_WEBHOOK_URL"),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Analysis base URL: {}", config.analysis_base_url);
        tracing::debug!("Analysis model: {}", config.analysis_model);
        if config.analysis_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; analysis will run degraded");
        }
        let configured: Vec<&str> = [
            ("profile_index", config.profile_index_api_key.is_some()),
            ("marketplace", config.marketplace_api_key.is_some()),
            ("news_feed", config.news_api_key.is_some()),
            ("social_feed", config.social_api_token.is_some()),
            ("registry", config.registry_api_key.is_some()),
        ]
        .iter()
        .filter(|(_, ok)| *ok)
        .map(|(name, _)| *name)
        .collect();
        tracing::info!("Sources with credentials: [{}]", configured.join(", "));

        Ok(config)
    }

    /// A config with every external endpoint pointed at `base_url` and all
    /// delays zeroed. Used by tests against mock servers.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            analysis_base_url: base.clone(),
            analysis_api_key: Some("test-analysis-key".to_string()),
            analysis_model: "gpt-4".to_string(),
            analysis_delay_ms: 0,
            analysis_timeout_secs: 5,
            adapter_timeout_secs: 5,
            scraping_delay_ms: 0,
            user_agent: "leadfinder-tests/0.1".to_string(),
            profile_index_base_url: base.clone(),
            profile_index_api_key: Some("test-profile-key".to_string()),
            marketplace_base_url: base.clone(),
            marketplace_api_key: Some("test-marketplace-key".to_string()),
            news_base_url: base.clone(),
            news_api_key: Some("test-news-key".to_string()),
            social_base_url: base.clone(),
            social_api_token: Some("test-social-token".to_string()),
            registry_base_url: base,
            registry_api_key: Some("test-registry-key".to_string()),
            notify_webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_has_zero_delays() {
        let config = Config::for_base_url("http://localhost:9999/");
        assert_eq!(config.analysis_delay_ms, 0);
        assert_eq!(config.scraping_delay_ms, 0);
        assert_eq!(config.marketplace_base_url, "http://localhost:9999");
    }
}

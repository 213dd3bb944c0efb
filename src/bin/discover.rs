//! Command-line discovery runner.
//!
//! Usage: `discover <industry> <sources> [keywords...]` where `sources` is a
//! comma-separated list of source names. Results print as pretty JSON.

use leadfinder::notify::WebhookNotifier;
use leadfinder::{Config, InMemoryQuota, Industry, LeadPipeline, SearchRequest, SourceKind};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadfinder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(industry_arg), Some(sources_arg)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: discover <industry> <source,source,...> [keywords...]");
    };

    let industry: Industry = industry_arg
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let sources = sources_arg
        .split(',')
        .map(|s| s.parse::<SourceKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut request = SearchRequest::new(industry, sources);
    request.keywords = args.collect();

    let config = Config::from_env()?;
    let webhook_url = config.notify_webhook_url.clone();
    let mut pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default()))
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(url) = webhook_url {
        pipeline = pipeline.with_notifier(Arc::new(WebhookNotifier::new(
            url,
            reqwest::Client::new(),
        )));
    }

    // One-shot CLI run; every invocation is its own account
    let account_id = Uuid::new_v4();
    let leads = pipeline
        .discover(&request, account_id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!("Discovered {} lead(s)", leads.len());
    println!("{}", serde_json::to_string_pretty(&leads)?);
    Ok(())
}

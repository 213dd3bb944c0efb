/// End-to-end pipeline tests with mocked external APIs.
/// Every source endpoint and the analysis capability point at one wiremock
/// server via `Config::for_base_url`, so runs exercise the real fan-out,
/// dedup, enrichment and quota paths without the network.
use async_trait::async_trait;
use leadfinder::notify::Notifier;
use leadfinder::quota::{InMemoryQuota, QuotaGate, UsageKind};
use leadfinder::{
    Config, Industry, LeadPipeline, PipelineError, SearchRequest, SourceKind,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(sources: Vec<SourceKind>) -> SearchRequest {
    let mut request = SearchRequest::new(Industry::Technology, sources);
    request.keywords = vec!["cloud".to_string()];
    request
}

/// Wrap a chat-completion content string in the OpenAI response envelope.
fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"content": content}}]
    })
}

fn registry_entry(name: &str, email: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "contact_name": name,
        "company": "TechCorp",
        "contact_title": "CTO",
        "email": email,
        "phone": "(415) 555-2671",
        "employees": 1200,
    })
}

/// Mount an analysis mock that always returns the all-Unknown payload.
async fn mount_degraded_analysis(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_quota_exhausted_blocks_before_any_source_call() {
    let mock_server = MockServer::start().await;

    // Sources must never be contacted when the quota gate says no
    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [registry_entry("John Smith", Some("john@techcorp.com"))]
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::new(0))).unwrap();

    let result = pipeline
        .discover(&request(vec![SourceKind::Registry]), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(PipelineError::QuotaExceeded)));
}

#[tokio::test]
async fn test_failed_source_does_not_sink_the_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [registry_entry("John Smith", Some("john@techcorp.com"))]
        })))
        .mount(&mock_server)
        .await;
    // Profile index is down
    Mock::given(method("GET"))
        .and(path("/v1/people/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default())).unwrap();

    let leads = pipeline
        .discover(
            &request(vec![SourceKind::ProfileIndex, SourceKind::Registry]),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].candidate.name, "John Smith");
    assert_eq!(leads[0].candidate.source, SourceKind::Registry);
}

#[tokio::test]
async fn test_first_requested_source_wins_dedup() {
    let mock_server = MockServer::start().await;

    // Both sources report the same person (same email), different titles
    Mock::given(method("GET"))
        .and(path("/v1/people/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "profiles": [{
                "name": "Jane Doe",
                "company": "Acme",
                "job_title": "VP of Engineering",
                "email": "jane@acme.com",
            }]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [{
                "contact_name": "Jane Doe",
                "company": "Acme Corporation",
                "contact_title": "Engineering Lead",
                "email": "JANE@ACME.COM",
            }]
        })))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default())).unwrap();

    let leads = pipeline
        .discover(
            &request(vec![SourceKind::ProfileIndex, SourceKind::Registry]),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

    // One person, and the first requested source's record is the keeper
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].candidate.source, SourceKind::ProfileIndex);
    assert_eq!(
        leads[0].candidate.job_title.as_deref(),
        Some("VP of Engineering")
    );
}

#[tokio::test]
async fn test_analysis_outage_degrades_but_keeps_every_lead() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [
                registry_entry("John Smith", Some("john@techcorp.com")),
                registry_entry("Mary Major", Some("mary@techcorp.com")),
            ]
        })))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default())).unwrap();

    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(leads.len(), 2);
    for lead in &leads {
        // Default annotation, scored on company size + contacts only:
        // 1000+ bracket (10) plus email and phone (5)
        assert_eq!(lead.analysis.intent, leadfinder::models::IntentLevel::Unknown);
        assert!(lead.score_factors.is_empty());
        assert_eq!(lead.score, 15);
    }
}

#[tokio::test]
async fn test_fully_qualified_lead_scores_100() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [registry_entry("John Smith", Some("john@techcorp.com"))]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
            r#"{"intent": "High", "budget": "High", "timeline": "Immediate",
                "decision_maker": true, "sentiment": "Positive",
                "pain_points": ["Legacy infrastructure"]}"#,
        )))
        .mount(&mock_server)
        .await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default())).unwrap();

    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].score, 100);
    assert!(leads[0].analysis.decision_maker);
    assert_eq!(leads[0].candidate.phone.as_deref(), Some("+14155552671"));
}

#[tokio::test]
async fn test_empty_run_consumes_no_quota() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"entries": []})),
        )
        .mount(&mock_server)
        .await;

    let config = Config::for_base_url(&mock_server.uri());
    let quota = Arc::new(InMemoryQuota::default());
    let pipeline = LeadPipeline::new(config, quota.clone() as Arc<dyn QuotaGate>).unwrap();
    let account = Uuid::new_v4();

    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), account)
        .await
        .unwrap();

    assert!(leads.is_empty());
    assert_eq!(quota.used(account), 0);
}

#[tokio::test]
async fn test_successful_run_records_one_usage_unit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [
                registry_entry("John Smith", Some("john@techcorp.com")),
                registry_entry("Mary Major", Some("mary@techcorp.com")),
            ]
        })))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let config = Config::for_base_url(&mock_server.uri());
    let quota = Arc::new(InMemoryQuota::default());
    let pipeline = LeadPipeline::new(config, quota.clone() as Arc<dyn QuotaGate>).unwrap();
    let account = Uuid::new_v4();

    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), account)
        .await
        .unwrap();

    // Usage is per run, not per lead
    assert_eq!(leads.len(), 2);
    assert_eq!(quota.used(account), 1);
}

/// Gate that admits everyone but cannot persist usage.
struct UnrecordableGate;

#[async_trait]
impl QuotaGate for UnrecordableGate {
    async fn can_discover(&self, _account_id: Uuid) -> Result<bool, PipelineError> {
        Ok(true)
    }

    async fn record_usage(
        &self,
        _account_id: Uuid,
        _kind: UsageKind,
    ) -> Result<(), PipelineError> {
        Err(PipelineError::ExternalService(
            "usage store unreachable".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_usage_recording_failure_does_not_discard_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [registry_entry("John Smith", Some("john@techcorp.com"))]
        })))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(UnrecordableGate)).unwrap();

    // Only the entry check fails closed; a broken usage store after
    // enrichment is logged and the computed leads still come back
    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].candidate.name, "John Smith");
}

struct RecordingNotifier {
    calls: Mutex<Vec<(Uuid, usize)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn leads_discovered(&self, account_id: Uuid, count: usize) {
        self.calls.lock().unwrap().push((account_id, count));
    }
}

#[tokio::test]
async fn test_notifier_fires_after_successful_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [registry_entry("John Smith", Some("john@techcorp.com"))]
        })))
        .mount(&mock_server)
        .await;
    mount_degraded_analysis(&mock_server).await;

    let notifier = Arc::new(RecordingNotifier {
        calls: Mutex::new(Vec::new()),
    });
    let config = Config::for_base_url(&mock_server.uri());
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::default()))
        .unwrap()
        .with_notifier(Arc::clone(&notifier) as Arc<dyn Notifier>);
    let account = Uuid::new_v4();

    let leads = pipeline
        .discover(&request(vec![SourceKind::Registry]), account)
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);

    // Notification is fire-and-forget; give the spawned task a beat
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.as_slice(), &[(account, 1)]);
}

#[tokio::test]
async fn test_invalid_request_rejected_before_quota() {
    let mock_server = MockServer::start().await;
    let config = Config::for_base_url(&mock_server.uri());
    // A zero quota would also reject; an empty source list must win
    let pipeline = LeadPipeline::new(config, Arc::new(InMemoryQuota::new(0))).unwrap();

    let result = pipeline.discover(&request(vec![]), Uuid::new_v4()).await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
}

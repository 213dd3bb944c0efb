use crate::errors::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed industry taxonomy shared with the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    Technology,
    Healthcare,
    Finance,
    Education,
    Manufacturing,
    Retail,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Consulting,
    Marketing,
    Legal,
    Construction,
    Transportation,
    Energy,
    Media,
    Government,
    #[serde(rename = "Non-Profit")]
    NonProfit,
    Agriculture,
    Hospitality,
    Sports,
    Entertainment,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Technology => "Technology",
            Industry::Healthcare => "Healthcare",
            Industry::Finance => "Finance",
            Industry::Education => "Education",
            Industry::Manufacturing => "Manufacturing",
            Industry::Retail => "Retail",
            Industry::RealEstate => "Real Estate",
            Industry::Consulting => "Consulting",
            Industry::Marketing => "Marketing",
            Industry::Legal => "Legal",
            Industry::Construction => "Construction",
            Industry::Transportation => "Transportation",
            Industry::Energy => "Energy",
            Industry::Media => "Media",
            Industry::Government => "Government",
            Industry::NonProfit => "Non-Profit",
            Industry::Agriculture => "Agriculture",
            Industry::Hospitality => "Hospitality",
            Industry::Sports => "Sports",
            Industry::Entertainment => "Entertainment",
        }
    }

    pub const ALL: [Industry; 20] = [
        Industry::Technology,
        Industry::Healthcare,
        Industry::Finance,
        Industry::Education,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::RealEstate,
        Industry::Consulting,
        Industry::Marketing,
        Industry::Legal,
        Industry::Construction,
        Industry::Transportation,
        Industry::Energy,
        Industry::Media,
        Industry::Government,
        Industry::NonProfit,
        Industry::Agriculture,
        Industry::Hospitality,
        Industry::Sports,
        Industry::Entertainment,
    ];
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Industry::ALL
            .iter()
            .find(|i| i.as_str().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| PipelineError::InvalidRequest(format!("Unknown industry: {}", s)))
    }
}

/// Employee-count brackets as reported by sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "1-10")]
    Size1To10,
    #[serde(rename = "11-50")]
    Size11To50,
    #[serde(rename = "51-200")]
    Size51To200,
    #[serde(rename = "201-500")]
    Size201To500,
    #[serde(rename = "501-1000")]
    Size501To1000,
    #[serde(rename = "1000+")]
    Size1000Plus,
}

impl CompanySize {
    /// Map a raw headcount (as reported by marketplace APIs) to a bracket.
    pub fn from_headcount(employees: u32) -> Self {
        match employees {
            0..=10 => CompanySize::Size1To10,
            11..=50 => CompanySize::Size11To50,
            51..=200 => CompanySize::Size51To200,
            201..=500 => CompanySize::Size201To500,
            501..=1000 => CompanySize::Size501To1000,
            _ => CompanySize::Size1000Plus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Size1To10 => "1-10",
            CompanySize::Size11To50 => "11-50",
            CompanySize::Size51To200 => "51-200",
            CompanySize::Size201To500 => "201-500",
            CompanySize::Size501To1000 => "501-1000",
            CompanySize::Size1000Plus => "1000+",
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of discovery sources. Adding a source means adding a
/// variant here and an adapter in `sources/`; there is no runtime plugin
/// registry, and unknown kinds are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ProfileIndex,
    Marketplace,
    WebPage,
    NewsFeed,
    SocialFeed,
    Registry,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::ProfileIndex => "profile_index",
            SourceKind::Marketplace => "marketplace",
            SourceKind::WebPage => "web_page",
            SourceKind::NewsFeed => "news_feed",
            SourceKind::SocialFeed => "social_feed",
            SourceKind::Registry => "registry",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = PipelineError;

    /// Accepts the canonical snake_case names plus the legacy source names
    /// still used by older saved searches.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "profile_index" | "linkedin" => Ok(SourceKind::ProfileIndex),
            "marketplace" | "apollo" => Ok(SourceKind::Marketplace),
            "web_page" | "websites" => Ok(SourceKind::WebPage),
            "news_feed" | "news" => Ok(SourceKind::NewsFeed),
            "social_feed" | "social" => Ok(SourceKind::SocialFeed),
            "registry" | "databases" => Ok(SourceKind::Registry),
            other => Err(PipelineError::InvalidRequest(format!(
                "Unknown source kind: {}",
                other
            ))),
        }
    }
}

/// A discovery search, immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub industry: Industry,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company_size: Option<CompanySize>,
    /// Ordered, as given by the caller.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ordered; source order is the dedup tie-break (first source wins).
    pub sources: Vec<SourceKind>,
}

impl SearchRequest {
    pub fn new(industry: Industry, sources: Vec<SourceKind>) -> Self {
        Self {
            industry,
            location: None,
            company_size: None,
            keywords: Vec::new(),
            sources,
        }
    }

    /// Reject malformed requests before any quota or adapter work happens.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sources.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one source is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A raw lead record as reported by a single source, pre-deduplication.
///
/// Only `name` and `company` are guaranteed present; everything else depends
/// on what the source exposes. Email is the strongest identity signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub company_size: Option<CompanySize>,
    #[serde(default)]
    pub company_revenue: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text context from the source (news description etc.), fed to the
    /// analysis prompt.
    #[serde(default)]
    pub description: Option<String>,
    pub source: SourceKind,
    /// URL or source-specific reference id of the record.
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl RawCandidate {
    pub fn new(name: impl Into<String>, company: impl Into<String>, source: SourceKind) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            email: None,
            phone: None,
            job_title: None,
            industry: None,
            company_size: None,
            company_revenue: None,
            company_website: None,
            location: None,
            description: None,
            source,
            source_ref: None,
        }
    }

    /// Derive the cross-source identity key: lowercased email when present,
    /// otherwise normalized name + company. Never persisted.
    pub fn identity_key(&self) -> IdentityKey {
        match self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => IdentityKey(email.trim().to_lowercase()),
            None => IdentityKey(format!(
                "{}::{}",
                normalize_identity_part(&self.name),
                normalize_identity_part(&self.company)
            )),
        }
    }
}

fn normalize_identity_part(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Key used to recognize the same real-world person across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(pub(crate) String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Likelihood-to-purchase signal from the analysis capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntentLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl IntentLevel {
    /// Lenient parse for AI output; anything unrecognized degrades to Unknown.
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => IntentLevel::High,
            "medium" => IntentLevel::Medium,
            "low" => IntentLevel::Low,
            _ => IntentLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BudgetLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl BudgetLevel {
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => BudgetLevel::High,
            "medium" => BudgetLevel::Medium,
            "low" => BudgetLevel::Low,
            _ => BudgetLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimelineBucket {
    Immediate,
    #[serde(rename = "1-3 months")]
    OneToThreeMonths,
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6+ months")]
    SixMonthsPlus,
    #[default]
    Unknown,
}

impl TimelineBucket {
    pub fn parse_loose(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "immediate" | "now" => TimelineBucket::Immediate,
            "1-3 months" | "1-3mo" | "1-3" => TimelineBucket::OneToThreeMonths,
            "3-6 months" | "3-6mo" | "3-6" => TimelineBucket::ThreeToSixMonths,
            "6+ months" | "6+mo" | "6+" | "6 months+" => TimelineBucket::SixMonthsPlus,
            _ => TimelineBucket::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// AI-derived qualitative signals about a lead.
///
/// Always fully populated: a failed analysis call yields `Default` (all
/// Unknown, no pain points, not a decision maker, Neutral sentiment), never
/// a partial record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub intent: IntentLevel,
    #[serde(default)]
    pub pain_points: Vec<String>,
    pub budget: BudgetLevel,
    pub timeline: TimelineBucket,
    #[serde(default)]
    pub decision_maker: bool,
    pub sentiment: Sentiment,
}

/// Advisory scoring breakdown suggested by the analysis capability.
///
/// Informational only: the scoring engine recomputes the final number from
/// its own fixed weights, so these values may disagree with the stored score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub factor: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub reason: Option<String>,
}

/// The pipeline's sole output type. Status lifecycle and ownership live in
/// the persistence collaborator, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedLead {
    #[serde(flatten)]
    pub candidate: RawCandidate,
    pub analysis: Annotation,
    #[serde(default)]
    pub score_factors: Vec<ScoreFactor>,
    /// Always within 0..=100.
    pub score: u8,
    pub discovered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_prefers_email() {
        let mut candidate = RawCandidate::new("John Smith", "TechCorp", SourceKind::Marketplace);
        candidate.email = Some("John.Smith@TechCorp.com".to_string());
        assert_eq!(candidate.identity_key().as_str(), "john.smith@techcorp.com");
    }

    #[test]
    fn identity_key_falls_back_to_name_company() {
        let candidate = RawCandidate::new("  John   Smith ", "TechCorp Inc", SourceKind::NewsFeed);
        assert_eq!(
            candidate.identity_key().as_str(),
            "john smith::techcorp inc"
        );
    }

    #[test]
    fn blank_email_does_not_count_as_identity() {
        let mut candidate = RawCandidate::new("Jane Doe", "Acme", SourceKind::WebPage);
        candidate.email = Some("   ".to_string());
        assert_eq!(candidate.identity_key().as_str(), "jane doe::acme");
    }

    #[test]
    fn source_kind_parses_canonical_and_legacy_names() {
        assert_eq!(
            "profile_index".parse::<SourceKind>().unwrap(),
            SourceKind::ProfileIndex
        );
        assert_eq!(
            "linkedin".parse::<SourceKind>().unwrap(),
            SourceKind::ProfileIndex
        );
        assert_eq!(
            "apollo".parse::<SourceKind>().unwrap(),
            SourceKind::Marketplace
        );
        assert_eq!(
            "databases".parse::<SourceKind>().unwrap(),
            SourceKind::Registry
        );
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        let err = "fax_directory".parse::<SourceKind>().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }

    #[test]
    fn empty_sources_fail_validation() {
        let request = SearchRequest::new(Industry::Technology, vec![]);
        assert!(matches!(
            request.validate(),
            Err(PipelineError::InvalidRequest(_))
        ));

        let request = SearchRequest::new(Industry::Technology, vec![SourceKind::NewsFeed]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn company_size_brackets_from_headcount() {
        assert_eq!(CompanySize::from_headcount(5), CompanySize::Size1To10);
        assert_eq!(CompanySize::from_headcount(200), CompanySize::Size51To200);
        assert_eq!(CompanySize::from_headcount(201), CompanySize::Size201To500);
        assert_eq!(CompanySize::from_headcount(1000), CompanySize::Size501To1000);
        assert_eq!(CompanySize::from_headcount(4200), CompanySize::Size1000Plus);
    }

    #[test]
    fn annotation_default_is_fully_degraded() {
        let annotation = Annotation::default();
        assert_eq!(annotation.intent, IntentLevel::Unknown);
        assert_eq!(annotation.budget, BudgetLevel::Unknown);
        assert_eq!(annotation.timeline, TimelineBucket::Unknown);
        assert!(!annotation.decision_maker);
        assert_eq!(annotation.sentiment, Sentiment::Neutral);
        assert!(annotation.pain_points.is_empty());
    }

    #[test]
    fn timeline_parses_original_strings() {
        assert_eq!(
            TimelineBucket::parse_loose("1-3 months"),
            TimelineBucket::OneToThreeMonths
        );
        assert_eq!(
            TimelineBucket::parse_loose("Immediate"),
            TimelineBucket::Immediate
        );
        assert_eq!(
            TimelineBucket::parse_loose("someday"),
            TimelineBucket::Unknown
        );
    }

    #[test]
    fn industry_round_trips_display_names() {
        assert_eq!(
            "Real Estate".parse::<Industry>().unwrap(),
            Industry::RealEstate
        );
        assert_eq!(Industry::NonProfit.to_string(), "Non-Profit");
        assert!("Cryptozoology".parse::<Industry>().is_err());
    }
}

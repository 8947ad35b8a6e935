//! Catalog entities.
//!
//! Raw layer: `RawRecord` — one row per (source, source id), immutable except
//! for re-ingestion upserts from the same pair.
//! Structured layer: `Venue`, `CanonicalPaper`, `ProvenanceLink`.
//! Analysis layer: `KeywordAssignment`, `TrendBucket`, `EmergingTopic` — the
//! last two are derived caches, fully recomputable and safe to regenerate.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Origin system a raw record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    OpenReview,
    Arxiv,
    OpenAlex,
    SemanticScholar,
}

impl RecordSource {
    /// All sources in ingestion priority order.
    pub const ALL: [RecordSource; 4] = [
        RecordSource::OpenReview,
        RecordSource::Arxiv,
        RecordSource::OpenAlex,
        RecordSource::SemanticScholar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::OpenReview => "openreview",
            RecordSource::Arxiv => "arxiv",
            RecordSource::OpenAlex => "openalex",
            RecordSource::SemanticScholar => "s2",
        }
    }

    /// Whether the source itself guarantees venue correctness for the
    /// records it emits (OpenReview only lists accepted conference papers).
    pub fn is_venue_curated(&self) -> bool {
        matches!(self, RecordSource::OpenReview)
    }
}

/// Natural key of a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecordKey {
    pub source: RecordSource,
    pub source_id: String,
}

impl std::fmt::Display for RawRecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.source.as_str(), self.source_id)
    }
}

/// An as-fetched, source-specific description of a paper, prior to any
/// cleaning. The evidence fields (`venue_raw`, `journal_ref`, `comments`,
/// `categories`) feed venue attribution and domain classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub source: RecordSource,
    pub source_id: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue_raw: Option<String>,
    pub journal_ref: Option<String>,
    pub comments: Option<String>,
    pub categories: Option<String>,
    /// Opaque source payload preserved for audit; never parsed by the core.
    pub payload: Option<serde_json::Value>,
    pub ingested_at: DateTime<Utc>,
}

impl RawRecord {
    pub fn key(&self) -> RawRecordKey {
        RawRecordKey {
            source: self.source,
            source_id: self.source_id.clone(),
        }
    }
}

/// Research area taxonomy used for venue and paper classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    Cv,
    Nlp,
    Ml,
    Rl,
    Ai,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Cv => "CV",
            Domain::Nlp => "NLP",
            Domain::Ml => "ML",
            Domain::Rl => "RL",
            Domain::Ai => "AI",
        }
    }
}

/// Venue prestige tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueTier {
    A,
    B,
    C,
}

/// A publication venue, created lazily the first time a name resolves.
/// Aliases and the observed year range are unioned on rediscovery; venues
/// are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub canonical_name: String,
    pub domain: Option<Domain>,
    pub tier: VenueTier,
    pub aliases: Vec<String>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

/// Curation state of a canonical paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFlag {
    Accepted,
    Unknown,
    Filtered,
}

/// The deduplicated, cross-source-merged representation of one real paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalPaper {
    pub id: Uuid,
    /// Whitespace-collapsed title; the linkage key is its casefolded form.
    pub canonical_title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue_id: Option<Uuid>,
    pub domain: Option<Domain>,
    pub quality_flag: QualityFlag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which raw record contributed to a canonical paper. At most one link per
/// (paper, raw record); every canonical paper has at least one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceLink {
    pub paper_id: Uuid,
    pub source: RecordSource,
    pub source_id: String,
    /// Venue-attribution confidence computed from this record's evidence;
    /// 0.0 when the record carried no usable venue evidence.
    pub confidence: f64,
}

impl ProvenanceLink {
    pub fn raw_key(&self) -> RawRecordKey {
        RawRecordKey {
            source: self.source,
            source_id: self.source_id.clone(),
        }
    }
}

/// One curated keyword for one paper, unique per (paper, keyword, method).
/// The keyword is stored lower-cased, whitespace-normalized and
/// synonym-canonicalized; `method` is the opaque extractor label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordAssignment {
    pub paper_id: Uuid,
    pub keyword: String,
    pub method: String,
    pub score: f64,
}

/// Time-bucket granularity for trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Bucket key for a timestamp: `YYYY`, `YYYY-MM`, ISO-week `YYYY-Www`,
    /// or `YYYY-MM-DD`.
    pub fn key_for(&self, ts: &DateTime<Utc>) -> String {
        match self {
            Granularity::Year => format!("{:04}", ts.year()),
            Granularity::Month => ts.format("%Y-%m").to_string(),
            Granularity::Week => {
                let iso = ts.iso_week();
                format!("{:04}-W{:02}", iso.year(), iso.week())
            }
            Granularity::Day => ts.format("%Y-%m-%d").to_string(),
        }
    }

    /// Bucket key for a bare publication year.
    pub fn key_for_year(year: i32) -> String {
        format!("{year:04}")
    }
}

/// A keyword with its occurrence count inside one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Aggregate of paper/keyword counts for one time window and scope.
/// Derived cache: fully recomputable from papers, keyword assignments and
/// raw ingestion timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub scope: String,
    pub granularity: Granularity,
    pub bucket_key: String,
    pub paper_count: usize,
    pub top_keywords: Vec<KeywordCount>,
}

/// Trend classification relative to the historical baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Rising,
    Stable,
    Declining,
}

/// A keyword whose recent-window frequency substantially exceeds its
/// historical-window frequency. Recomputed per analysis run, replacing prior
/// rows for the same scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingTopic {
    pub scope: String,
    pub keyword: String,
    /// `f64::INFINITY` for keywords with no historical baseline.
    pub growth_rate: f64,
    pub first_seen_bucket: String,
    pub recent_count: usize,
    pub label: TrendLabel,
}

/// The TrendEngine's per-paper input: a canonical paper joined with its
/// curated keywords and the earliest ingestion timestamp among its
/// provenance links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperObservation {
    pub paper_id: Uuid,
    pub year: Option<i32>,
    pub ingested_at: DateTime<Utc>,
    pub domain: Option<Domain>,
    pub keywords: Vec<String>,
}

/// Filter for read-side catalog queries. All fields are conjunctive;
/// `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub venue_id: Option<Uuid>,
    pub year: Option<i32>,
    pub domain: Option<Domain>,
    pub method: Option<String>,
}

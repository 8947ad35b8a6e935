//! Repository traits.
//!
//! Three seams, one per layer: `RawStore` for as-fetched records,
//! `CatalogStore` for the structured catalog, `AnalysisStore` for keywords
//! and derived trend caches. Backends guarantee per-call atomicity and
//! idempotent upserts keyed on the natural keys named per method; nothing
//! here requires cross-call transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use papertrail_common::Result;
use uuid::Uuid;

use crate::entities::{
    CanonicalPaper, Domain, EmergingTopic, Granularity, KeywordAssignment, KeywordCount,
    PaperObservation, ProvenanceLink, QueryFilter, RawRecord, RawRecordKey, RecordSource,
    TrendBucket, Venue,
};

/// Storage for raw, source-specific records.
#[async_trait]
pub trait RawStore: Send + Sync {
    /// Insert or replace a record keyed on (source, source id).
    async fn upsert_record(&self, record: RawRecord) -> Result<()>;

    async fn record(&self, key: &RawRecordKey) -> Result<Option<RawRecord>>;

    async fn records_by_source(&self, source: RecordSource) -> Result<Vec<RawRecord>>;

    /// Records with no provenance link yet, optionally restricted to one
    /// source, ordered by (ingested_at, source, source id) so batch runs
    /// are deterministic.
    async fn unlinked_records(
        &self,
        source: Option<RecordSource>,
        limit: usize,
    ) -> Result<Vec<RawRecord>>;

    async fn record_count(&self) -> Result<usize>;

    /// Latest ingestion timestamp across all raw records, if any.
    async fn max_ingested_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Storage for the structured catalog: venues, canonical papers and the
/// provenance links tying papers back to raw records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a venue by canonical name or any alias (case-insensitive).
    async fn venue_by_name(&self, name: &str) -> Result<Option<Venue>>;

    /// Insert a venue, or merge into the existing one with the same
    /// canonical name: aliases are unioned, the year range is widened.
    /// Returns the stored venue.
    async fn upsert_venue(&self, venue: Venue) -> Result<Venue>;

    /// Widen an existing venue's observed year range.
    async fn extend_venue_years(&self, venue_id: Uuid, year: i32) -> Result<()>;

    async fn all_venues(&self) -> Result<Vec<Venue>>;

    /// Find a paper by linkage key: casefolded whitespace-collapsed title,
    /// plus year when both sides have one.
    async fn find_paper_by_title(
        &self,
        title_key: &str,
        year: Option<i32>,
    ) -> Result<Option<CanonicalPaper>>;

    /// Insert a new paper or replace the row with the same id.
    async fn insert_paper(&self, paper: CanonicalPaper) -> Result<()>;

    async fn paper(&self, id: Uuid) -> Result<Option<CanonicalPaper>>;

    /// Count of papers matching the filter (method is ignored here).
    async fn paper_count(&self, filter: &QueryFilter) -> Result<usize>;

    /// Distinct publication years present in the catalog, ascending.
    async fn all_years(&self) -> Result<Vec<i32>>;

    /// Record that a raw record contributed to a paper. Idempotent on
    /// (paper id, source, source id).
    async fn link_provenance(&self, link: ProvenanceLink) -> Result<()>;

    async fn provenance_links(&self, paper_id: Uuid) -> Result<Vec<ProvenanceLink>>;

    /// Papers with no keyword assignments from the given extraction method,
    /// ordered by creation time.
    async fn papers_missing_keywords(
        &self,
        method: &str,
        limit: usize,
    ) -> Result<Vec<CanonicalPaper>>;
}

/// Storage for curated keywords and the derived trend caches.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert or replace a keyword assignment keyed on
    /// (paper id, keyword, method).
    async fn upsert_keyword(&self, assignment: KeywordAssignment) -> Result<()>;

    async fn keywords_for_paper(&self, paper_id: Uuid) -> Result<Vec<KeywordAssignment>>;

    /// Most frequent keywords across papers matching the filter,
    /// count-descending then keyword-ascending.
    async fn top_keywords(&self, filter: &QueryFilter, limit: usize) -> Result<Vec<KeywordCount>>;

    /// Per-year counts of one keyword, optionally restricted to a venue,
    /// year ascending. Papers without a publication year are not counted.
    async fn keyword_trend(
        &self,
        keyword: &str,
        venue_id: Option<Uuid>,
    ) -> Result<Vec<(i32, usize)>>;

    /// Join of papers, their keywords and their earliest ingestion
    /// timestamp, optionally filtered by domain. The trend engine's input.
    async fn observations(&self, domain: Option<Domain>) -> Result<Vec<PaperObservation>>;

    /// Atomically replace all buckets for (scope, granularity).
    async fn replace_buckets(
        &self,
        scope: &str,
        granularity: Granularity,
        buckets: Vec<TrendBucket>,
    ) -> Result<()>;

    async fn buckets(&self, scope: &str, granularity: Granularity) -> Result<Vec<TrendBucket>>;

    /// Atomically replace the emerging-topic rows for a scope.
    async fn replace_emerging(&self, scope: &str, topics: Vec<EmergingTopic>) -> Result<()>;

    async fn emerging(&self, scope: &str) -> Result<Vec<EmergingTopic>>;

    /// Free-form metadata, used for analysis watermarks.
    async fn meta(&self, key: &str) -> Result<Option<String>>;

    async fn set_meta(&self, key: &str, value: &str) -> Result<()>;
}

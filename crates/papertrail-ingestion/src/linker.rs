//! Cross-source record linkage.
//!
//! Raw records from different sources describing the same real paper are
//! merged into one `CanonicalPaper` by exact match on (normalized title,
//! year). No fuzzy title matching: a near-duplicate title creates a second
//! paper rather than risking a wrong merge. The first record to arrive
//! decides the paper's venue, domain and quality flag; later records from
//! other sources only add provenance links.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use papertrail_common::{BatchReport, PapertrailError, Result};
use papertrail_store::{
    CanonicalPaper, CatalogStore, ProvenanceLink, QualityFlag, RawRecord, Venue,
};

use crate::domain;
use crate::venue::{VenueMatch, VenueResolver};

/// Casefold, collapse internal whitespace, trim. The linkage key.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-collapsed but case-preserving form stored on the paper.
fn canonical_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Venue-name → id cache for one linkage run. Owned by the linker rather
/// than shared process-wide, so concurrent runs against different stores
/// cannot poison each other.
#[derive(Debug, Default)]
pub struct VenueCache {
    by_name: HashMap<String, Uuid>,
}

impl VenueCache {
    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn insert(&mut self, name: &str, id: Uuid) {
        self.by_name.insert(name.to_lowercase(), id);
    }

    /// Drop all cached entries. Call when the underlying store may have
    /// changed outside this linker.
    pub fn reset(&mut self) {
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// What happened to one raw record during linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new canonical paper was created.
    Created(Uuid),
    /// The record was attached to an existing paper.
    Merged(Uuid),
    /// The record was unusable (empty title) and left unlinked.
    Skipped,
}

/// Result of one linkage batch.
#[derive(Debug, Default, Serialize)]
pub struct LinkageSummary {
    pub report: BatchReport,
    pub created: usize,
    pub merged: usize,
}

impl LinkageSummary {
    pub fn absorb(&mut self, other: LinkageSummary) {
        self.report.absorb(other.report);
        self.created += other.created;
        self.merged += other.merged;
    }
}

/// Links raw records into canonical papers against a catalog store.
pub struct RecordLinker<S> {
    store: Arc<S>,
    resolver: VenueResolver,
    venues: VenueCache,
}

impl<S: CatalogStore> RecordLinker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            resolver: VenueResolver::new(),
            venues: VenueCache::default(),
        }
    }

    pub fn venue_cache(&mut self) -> &mut VenueCache {
        &mut self.venues
    }

    /// Link one raw record. Store failures propagate; anything else is a
    /// per-record verdict.
    pub async fn link_record(&mut self, record: &RawRecord) -> Result<LinkOutcome> {
        let title_key = normalize_title(&record.title);
        if title_key.is_empty() {
            debug!(key = %record.key(), "skipping record with empty title");
            return Ok(LinkOutcome::Skipped);
        }

        let venue_match = self.resolver.resolve(record);
        let confidence = venue_match.as_ref().map_or(0.0, |m| m.confidence);
        let year = record
            .year
            .or_else(|| venue_match.as_ref().and_then(|m| m.year_hint));

        if let Some(existing) = self.store.find_paper_by_title(&title_key, year).await? {
            // First writer already decided venue/domain/quality; this record
            // only contributes provenance.
            self.store
                .link_provenance(ProvenanceLink {
                    paper_id: existing.id,
                    source: record.source,
                    source_id: record.source_id.clone(),
                    confidence,
                })
                .await?;
            return Ok(LinkOutcome::Merged(existing.id));
        }

        let venue_id = match &venue_match {
            Some(m) => Some(self.ensure_venue(m, year).await?),
            None => None,
        };

        let domain = venue_match
            .as_ref()
            .and_then(|m| m.domain)
            .or_else(|| {
                domain::classify(
                    record.categories.as_deref(),
                    &record.title,
                    record.abstract_text.as_deref().unwrap_or(""),
                )
            });

        let quality_flag = if record.source.is_venue_curated()
            || venue_match.as_ref().is_some_and(|m| m.accepted)
        {
            QualityFlag::Accepted
        } else {
            QualityFlag::Unknown
        };

        let now = chrono::Utc::now();
        let paper = CanonicalPaper {
            id: Uuid::new_v4(),
            canonical_title: canonical_title(&record.title),
            abstract_text: record.abstract_text.clone().unwrap_or_default(),
            authors: record.authors.clone(),
            year,
            venue_id,
            domain,
            quality_flag,
            created_at: now,
            updated_at: now,
        };
        let paper_id = paper.id;
        self.store.insert_paper(paper).await?;
        self.store
            .link_provenance(ProvenanceLink {
                paper_id,
                source: record.source,
                source_id: record.source_id.clone(),
                confidence,
            })
            .await?;
        Ok(LinkOutcome::Created(paper_id))
    }

    /// Process an ordered batch of raw records. Store errors abort the
    /// batch; per-record failures are collected and processing continues.
    pub async fn process_batch(&mut self, records: &[RawRecord]) -> Result<LinkageSummary> {
        let mut summary = LinkageSummary::default();
        for record in records {
            match self.link_record(record).await {
                Ok(LinkOutcome::Created(_)) => {
                    summary.created += 1;
                    summary.report.record_success();
                }
                Ok(LinkOutcome::Merged(_)) => {
                    summary.merged += 1;
                    summary.report.record_success();
                }
                Ok(LinkOutcome::Skipped) => summary.report.record_skip(),
                Err(err @ PapertrailError::Store(_)) => return Err(err),
                Err(err) => {
                    warn!(key = %record.key(), error = %err, "record linkage failed");
                    summary
                        .report
                        .record_failure(record.key().to_string(), err.to_string());
                }
            }
        }
        info!(
            processed = summary.report.processed,
            created = summary.created,
            merged = summary.merged,
            skipped = summary.report.skipped,
            failed = summary.report.failed,
            "linkage batch complete"
        );
        Ok(summary)
    }

    async fn ensure_venue(&mut self, venue_match: &VenueMatch, year: Option<i32>) -> Result<Uuid> {
        if let Some(id) = self.venues.get(&venue_match.name) {
            if let Some(year) = year {
                self.store.extend_venue_years(id, year).await?;
            }
            return Ok(id);
        }
        let stored = self
            .store
            .upsert_venue(Venue {
                id: Uuid::new_v4(),
                canonical_name: venue_match.name.clone(),
                domain: venue_match.domain,
                tier: venue_match.tier,
                aliases: venue_match.aliases.clone(),
                first_year: year,
                last_year: year,
            })
            .await?;
        self.venues.insert(&stored.canonical_name, stored.id);
        Ok(stored.id)
    }
}

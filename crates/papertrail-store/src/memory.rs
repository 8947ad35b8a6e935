//! In-memory backend.
//!
//! Single `tokio::sync::RwLock` around the whole dataset; good enough for
//! tests and single-process runs, and the reference semantics for any other
//! backend.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use papertrail_common::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::{
    CanonicalPaper, Domain, EmergingTopic, Granularity, KeywordAssignment, KeywordCount,
    PaperObservation, ProvenanceLink, QueryFilter, RawRecord, RawRecordKey, RecordSource,
    TrendBucket, Venue,
};
use crate::repository::{AnalysisStore, CatalogStore, RawStore};

#[derive(Default)]
struct Inner {
    raw: HashMap<RawRecordKey, RawRecord>,
    venues: HashMap<Uuid, Venue>,
    papers: HashMap<Uuid, CanonicalPaper>,
    links: Vec<ProvenanceLink>,
    linked_keys: HashSet<RawRecordKey>,
    keywords: HashMap<(Uuid, String, String), KeywordAssignment>,
    buckets: HashMap<(String, Granularity), Vec<TrendBucket>>,
    emerging: HashMap<String, Vec<EmergingTopic>>,
    meta: HashMap<String, String>,
}

/// In-memory implementation of all three repository traits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

#[async_trait]
impl RawStore for MemoryStore {
    async fn upsert_record(&self, record: RawRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.raw.insert(record.key(), record);
        Ok(())
    }

    async fn record(&self, key: &RawRecordKey) -> Result<Option<RawRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.raw.get(key).cloned())
    }

    async fn records_by_source(&self, source: RecordSource) -> Result<Vec<RawRecord>> {
        let inner = self.inner.read().await;
        let mut out: Vec<RawRecord> = inner
            .raw
            .values()
            .filter(|r| r.source == source)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        Ok(out)
    }

    async fn unlinked_records(
        &self,
        source: Option<RecordSource>,
        limit: usize,
    ) -> Result<Vec<RawRecord>> {
        let inner = self.inner.read().await;
        let mut out: Vec<RawRecord> = inner
            .raw
            .values()
            .filter(|r| source.map_or(true, |s| r.source == s))
            .filter(|r| !inner.linked_keys.contains(&r.key()))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (a.ingested_at, a.source.as_str(), &a.source_id)
                .cmp(&(b.ingested_at, b.source.as_str(), &b.source_id))
        });
        out.truncate(limit);
        Ok(out)
    }

    async fn record_count(&self) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner.raw.len())
    }

    async fn max_ingested_at(&self) -> Result<Option<DateTime<Utc>>> {
        let inner = self.inner.read().await;
        Ok(inner.raw.values().map(|r| r.ingested_at).max())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn venue_by_name(&self, name: &str) -> Result<Option<Venue>> {
        let needle = fold(name);
        let inner = self.inner.read().await;
        Ok(inner
            .venues
            .values()
            .find(|v| {
                fold(&v.canonical_name) == needle || v.aliases.iter().any(|a| fold(a) == needle)
            })
            .cloned())
    }

    async fn upsert_venue(&self, venue: Venue) -> Result<Venue> {
        let mut inner = self.inner.write().await;
        let existing_id = inner
            .venues
            .values()
            .find(|v| fold(&v.canonical_name) == fold(&venue.canonical_name))
            .map(|v| v.id);
        let stored = match existing_id {
            Some(id) => {
                let current = inner.venues.get_mut(&id).expect("venue indexed by id");
                for alias in venue.aliases {
                    if !current.aliases.iter().any(|a| fold(a) == fold(&alias)) {
                        current.aliases.push(alias);
                    }
                }
                current.first_year = match (current.first_year, venue.first_year) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                current.last_year = match (current.last_year, venue.last_year) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
                if current.domain.is_none() {
                    current.domain = venue.domain;
                }
                current.clone()
            }
            None => {
                inner.venues.insert(venue.id, venue.clone());
                venue
            }
        };
        Ok(stored)
    }

    async fn extend_venue_years(&self, venue_id: Uuid, year: i32) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(v) = inner.venues.get_mut(&venue_id) {
            v.first_year = Some(v.first_year.map_or(year, |y| y.min(year)));
            v.last_year = Some(v.last_year.map_or(year, |y| y.max(year)));
        }
        Ok(())
    }

    async fn all_venues(&self) -> Result<Vec<Venue>> {
        let inner = self.inner.read().await;
        let mut out: Vec<Venue> = inner.venues.values().cloned().collect();
        out.sort_by(|a, b| a.canonical_name.cmp(&b.canonical_name));
        Ok(out)
    }

    async fn find_paper_by_title(
        &self,
        title_key: &str,
        year: Option<i32>,
    ) -> Result<Option<CanonicalPaper>> {
        let inner = self.inner.read().await;
        Ok(inner
            .papers
            .values()
            .find(|p| {
                fold(&p.canonical_title) == title_key
                    && match (p.year, year) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
            })
            .cloned())
    }

    async fn insert_paper(&self, paper: CanonicalPaper) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.papers.insert(paper.id, paper);
        Ok(())
    }

    async fn paper(&self, id: Uuid) -> Result<Option<CanonicalPaper>> {
        let inner = self.inner.read().await;
        Ok(inner.papers.get(&id).cloned())
    }

    async fn paper_count(&self, filter: &QueryFilter) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .papers
            .values()
            .filter(|p| inner.paper_matches(p, filter))
            .count())
    }

    async fn all_years(&self) -> Result<Vec<i32>> {
        let inner = self.inner.read().await;
        let years: BTreeSet<i32> = inner.papers.values().filter_map(|p| p.year).collect();
        Ok(years.into_iter().collect())
    }

    async fn link_provenance(&self, link: ProvenanceLink) -> Result<()> {
        let mut inner = self.inner.write().await;
        let already = inner.links.iter().any(|l| {
            l.paper_id == link.paper_id && l.source == link.source && l.source_id == link.source_id
        });
        if !already {
            inner.linked_keys.insert(link.raw_key());
            inner.links.push(link);
        }
        Ok(())
    }

    async fn provenance_links(&self, paper_id: Uuid) -> Result<Vec<ProvenanceLink>> {
        let inner = self.inner.read().await;
        Ok(inner
            .links
            .iter()
            .filter(|l| l.paper_id == paper_id)
            .cloned()
            .collect())
    }

    async fn papers_missing_keywords(
        &self,
        method: &str,
        limit: usize,
    ) -> Result<Vec<CanonicalPaper>> {
        let inner = self.inner.read().await;
        let with_keywords: HashSet<Uuid> = inner
            .keywords
            .keys()
            .filter(|(_, _, m)| m == method)
            .map(|(id, _, _)| *id)
            .collect();
        let mut out: Vec<CanonicalPaper> = inner
            .papers
            .values()
            .filter(|p| !with_keywords.contains(&p.id))
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        out.truncate(limit);
        Ok(out)
    }
}

impl Inner {
    fn paper_matches(&self, paper: &CanonicalPaper, filter: &QueryFilter) -> bool {
        if let Some(venue_id) = filter.venue_id {
            if paper.venue_id != Some(venue_id) {
                return false;
            }
        }
        if let Some(year) = filter.year {
            if paper.year != Some(year) {
                return false;
            }
        }
        if let Some(domain) = filter.domain {
            if paper.domain != Some(domain) {
                return false;
            }
        }
        true
    }

    fn earliest_ingestion(&self, paper_id: Uuid) -> Option<DateTime<Utc>> {
        self.links
            .iter()
            .filter(|l| l.paper_id == paper_id)
            .filter_map(|l| self.raw.get(&l.raw_key()))
            .map(|r| r.ingested_at)
            .min()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn upsert_keyword(&self, assignment: KeywordAssignment) -> Result<()> {
        let mut inner = self.inner.write().await;
        let key = (
            assignment.paper_id,
            assignment.keyword.clone(),
            assignment.method.clone(),
        );
        inner.keywords.insert(key, assignment);
        Ok(())
    }

    async fn keywords_for_paper(&self, paper_id: Uuid) -> Result<Vec<KeywordAssignment>> {
        let inner = self.inner.read().await;
        let mut out: Vec<KeywordAssignment> = inner
            .keywords
            .values()
            .filter(|k| k.paper_id == paper_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        Ok(out)
    }

    async fn top_keywords(&self, filter: &QueryFilter, limit: usize) -> Result<Vec<KeywordCount>> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for assignment in inner.keywords.values() {
            if let Some(method) = &filter.method {
                if &assignment.method != method {
                    continue;
                }
            }
            let Some(paper) = inner.papers.get(&assignment.paper_id) else {
                continue;
            };
            if !inner.paper_matches(paper, filter) {
                continue;
            }
            *counts.entry(assignment.keyword.as_str()).or_default() += 1;
        }
        let mut out: Vec<KeywordCount> = counts
            .into_iter()
            .map(|(keyword, count)| KeywordCount {
                keyword: keyword.to_string(),
                count,
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
        out.truncate(limit);
        Ok(out)
    }

    async fn keyword_trend(
        &self,
        keyword: &str,
        venue_id: Option<Uuid>,
    ) -> Result<Vec<(i32, usize)>> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<i32, usize> = HashMap::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        for assignment in inner.keywords.values() {
            if assignment.keyword != keyword || !seen.insert(assignment.paper_id) {
                continue;
            }
            let Some(paper) = inner.papers.get(&assignment.paper_id) else {
                continue;
            };
            if let Some(vid) = venue_id {
                if paper.venue_id != Some(vid) {
                    continue;
                }
            }
            if let Some(year) = paper.year {
                *counts.entry(year).or_default() += 1;
            }
        }
        let mut out: Vec<(i32, usize)> = counts.into_iter().collect();
        out.sort();
        Ok(out)
    }

    async fn observations(&self, domain: Option<Domain>) -> Result<Vec<PaperObservation>> {
        let inner = self.inner.read().await;
        let mut out: Vec<PaperObservation> = inner
            .papers
            .values()
            .filter(|p| domain.map_or(true, |d| p.domain == Some(d)))
            .map(|paper| {
                let mut keywords: Vec<String> = inner
                    .keywords
                    .values()
                    .filter(|k| k.paper_id == paper.id)
                    .map(|k| k.keyword.clone())
                    .collect();
                keywords.sort();
                keywords.dedup();
                PaperObservation {
                    paper_id: paper.id,
                    year: paper.year,
                    ingested_at: inner
                        .earliest_ingestion(paper.id)
                        .unwrap_or(paper.created_at),
                    domain: paper.domain,
                    keywords,
                }
            })
            .collect();
        out.sort_by(|a, b| (a.ingested_at, a.paper_id).cmp(&(b.ingested_at, b.paper_id)));
        Ok(out)
    }

    async fn replace_buckets(
        &self,
        scope: &str,
        granularity: Granularity,
        buckets: Vec<TrendBucket>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.buckets.insert((scope.to_string(), granularity), buckets);
        Ok(())
    }

    async fn buckets(&self, scope: &str, granularity: Granularity) -> Result<Vec<TrendBucket>> {
        let inner = self.inner.read().await;
        let mut out = inner
            .buckets
            .get(&(scope.to_string(), granularity))
            .cloned()
            .unwrap_or_default();
        out.sort_by(|a, b| a.bucket_key.cmp(&b.bucket_key));
        Ok(out)
    }

    async fn replace_emerging(&self, scope: &str, topics: Vec<EmergingTopic>) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.emerging.insert(scope.to_string(), topics);
        Ok(())
    }

    async fn emerging(&self, scope: &str) -> Result<Vec<EmergingTopic>> {
        let inner = self.inner.read().await;
        Ok(inner.emerging.get(scope).cloned().unwrap_or_default())
    }

    async fn meta(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner.meta.get(key).cloned())
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

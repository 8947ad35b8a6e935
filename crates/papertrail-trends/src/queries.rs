//! Read-side catalog queries.
//!
//! Thin aggregation layer over the stores for consumers (CLI, dashboards).
//! Nothing here writes.

use std::sync::Arc;

use serde::Serialize;

use papertrail_common::Result;
use papertrail_store::{
    AnalysisStore, CatalogStore, EmergingTopic, KeywordCount, QueryFilter, Venue,
};

/// Per-year counts of one keyword plus the overall growth across the
/// observed range.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub keyword: String,
    /// (year, paper count), year ascending.
    pub points: Vec<(i32, usize)>,
    /// Last-year count over first-year count; `None` with fewer than two
    /// points.
    pub growth_rate: Option<f64>,
}

/// Aggregate view of one venue.
#[derive(Debug, Clone, Serialize)]
pub struct VenueStats {
    pub venue: Venue,
    pub paper_count: usize,
    pub top_keywords: Vec<KeywordCount>,
}

pub struct CatalogQueries<S> {
    store: Arc<S>,
}

impl<S> CatalogQueries<S>
where
    S: CatalogStore + AnalysisStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Most frequent curated keywords under the given filter.
    pub async fn top_keywords(
        &self,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<KeywordCount>> {
        self.store.top_keywords(filter, limit).await
    }

    /// Year-by-year usage of one keyword, optionally within a venue.
    pub async fn keyword_trend(
        &self,
        keyword: &str,
        venue_name: Option<&str>,
    ) -> Result<TrendSeries> {
        let venue_id = match venue_name {
            Some(name) => self.store.venue_by_name(name).await?.map(|v| v.id),
            None => None,
        };
        let points = self.store.keyword_trend(keyword, venue_id).await?;
        let growth_rate = match (points.first(), points.last()) {
            (Some((fy, first)), Some((ly, last))) if fy != ly && *first > 0 => {
                Some(*last as f64 / *first as f64)
            }
            _ => None,
        };
        Ok(TrendSeries {
            keyword: keyword.to_string(),
            points,
            growth_rate,
        })
    }

    /// Paper count and dominant keywords for one venue. `None` when the
    /// venue is unknown under that name or any alias.
    pub async fn venue_stats(&self, venue_name: &str, top_n: usize) -> Result<Option<VenueStats>> {
        let Some(venue) = self.store.venue_by_name(venue_name).await? else {
            return Ok(None);
        };
        let filter = QueryFilter {
            venue_id: Some(venue.id),
            ..Default::default()
        };
        let paper_count = self.store.paper_count(&filter).await?;
        let top_keywords = self.store.top_keywords(&filter, top_n).await?;
        Ok(Some(VenueStats {
            venue,
            paper_count,
            top_keywords,
        }))
    }

    /// Current emerging-topic list for a scope ("all" or a lowercased
    /// domain name).
    pub async fn emerging_topics(&self, scope: &str) -> Result<Vec<EmergingTopic>> {
        self.store.emerging(scope).await
    }
}

//! Trend recomputation engine.
//!
//! Both products (time buckets and emerging topics) are derived caches
//! rebuilt from scratch on each run. A watermark — the latest raw
//! ingestion timestamp at the time of the previous run — lets the engine
//! skip recomputation when nothing new has been ingested.

use std::sync::Arc;

use tracing::{info, instrument};

use papertrail_common::Result;
use papertrail_store::{AnalysisStore, Domain, Granularity, RawStore};

use crate::bucket::{bucketize, BUCKET_KEYWORD_POOL};
use crate::emerging::{detect_emerging, EmergingConfig};

/// Scope string for an optional domain filter.
pub fn scope_name(domain: Option<Domain>) -> String {
    domain.map_or_else(|| "all".to_string(), |d| d.as_str().to_lowercase())
}

/// Outcome of one refresh call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The watermark had not advanced; nothing was recomputed.
    Skipped,
    /// Caches were rebuilt.
    Recomputed {
        buckets: usize,
        /// Papers dated by ingestion timestamp instead of publication date.
        fallbacks: usize,
        emerging: usize,
    },
}

pub struct TrendEngine<S> {
    store: Arc<S>,
    config: EmergingConfig,
}

impl<S> TrendEngine<S>
where
    S: RawStore + AnalysisStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: EmergingConfig::default(),
        }
    }

    pub fn with_config(store: Arc<S>, config: EmergingConfig) -> Self {
        Self { store, config }
    }

    /// Rebuild the trend buckets for one (domain scope, granularity) and,
    /// at week granularity, the emerging-topic list for the scope.
    ///
    /// Skipped without touching the caches when no raw record has been
    /// ingested since the previous run, unless `force` is set.
    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        domain: Option<Domain>,
        granularity: Granularity,
        force: bool,
    ) -> Result<RefreshOutcome> {
        let scope = scope_name(domain);
        let watermark_key = format!("trend_watermark_{}_{}", scope, granularity.as_str());
        let current = self
            .store
            .max_ingested_at()
            .await?
            .map(|ts| ts.to_rfc3339());

        if !force {
            let stored = self.store.meta(&watermark_key).await?;
            if stored.is_some() && stored == current {
                info!(scope = %scope, granularity = granularity.as_str(), "watermark unchanged, skipping");
                return Ok(RefreshOutcome::Skipped);
            }
        }

        let observations = self.store.observations(domain).await?;
        let bucketing = bucketize(&observations, &scope, granularity, BUCKET_KEYWORD_POOL);
        let bucket_count = bucketing.buckets.len();
        let fallbacks = bucketing.fallback_count;
        self.store
            .replace_buckets(&scope, granularity, bucketing.buckets)
            .await?;

        let mut emerging_count = 0;
        if granularity == Granularity::Week {
            let weekly = self.store.buckets(&scope, Granularity::Week).await?;
            let topics = detect_emerging(&weekly, &scope, &self.config);
            emerging_count = topics.len();
            self.store.replace_emerging(&scope, topics).await?;
        }

        if let Some(current) = &current {
            self.store.set_meta(&watermark_key, current).await?;
        }
        info!(
            scope = %scope,
            granularity = granularity.as_str(),
            buckets = bucket_count,
            fallbacks,
            emerging = emerging_count,
            "trend caches rebuilt"
        );
        Ok(RefreshOutcome::Recomputed {
            buckets: bucket_count,
            fallbacks,
            emerging: emerging_count,
        })
    }

    /// Refresh every granularity for one domain scope.
    pub async fn refresh_all(&self, domain: Option<Domain>, force: bool) -> Result<()> {
        for granularity in [
            Granularity::Day,
            Granularity::Week,
            Granularity::Month,
            Granularity::Year,
        ] {
            self.refresh(domain, granularity, force).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_names() {
        assert_eq!(scope_name(None), "all");
        assert_eq!(scope_name(Some(Domain::Cv)), "cv");
        assert_eq!(scope_name(Some(Domain::Nlp)), "nlp");
    }
}

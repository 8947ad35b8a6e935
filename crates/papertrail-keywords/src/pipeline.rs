//! Curation batch.
//!
//! Pulls papers that have no keywords from the configured extraction
//! method yet, runs the extractor over "{title}. {abstract}", curates the
//! candidates and upserts the survivors. Safe to re-run at any time: the
//! (paper, keyword, method) upsert contract makes the whole batch
//! idempotent.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use papertrail_common::{BatchReport, PapertrailError, Result, Settings};
use papertrail_store::{AnalysisStore, CatalogStore, KeywordAssignment};

use crate::curator::KeywordCurator;
use crate::extractor::TermExtractor;

/// Texts shorter than this carry too little signal to extract from.
const MIN_TEXT_LEN: usize = 10;

/// Runs keyword extraction and curation over the catalog.
pub struct CurationPipeline<S, E> {
    store: Arc<S>,
    extractor: E,
    curator: KeywordCurator,
    extract_top_n: usize,
}

impl<S, E> CurationPipeline<S, E>
where
    S: CatalogStore + AnalysisStore,
    E: TermExtractor,
{
    pub fn new(store: Arc<S>, extractor: E, curator: KeywordCurator, settings: &Settings) -> Self {
        Self {
            store,
            extractor,
            curator,
            extract_top_n: settings.extract_top_n,
        }
    }

    /// Process one batch of papers. Extractor failures abort the batch
    /// (the collaborator is down, retrying per paper would not help);
    /// papers with too little text are skipped and will be retried once
    /// they gain an abstract.
    #[instrument(skip(self))]
    pub async fn run(&self, limit: usize) -> Result<BatchReport> {
        let method = self.extractor.method().to_string();
        let pending = self.store.papers_missing_keywords(&method, limit).await?;
        let mut report = BatchReport::new();

        for paper in pending {
            let text = format!("{}. {}", paper.canonical_title, paper.abstract_text);
            if text.trim().len() < MIN_TEXT_LEN {
                debug!(paper_id = %paper.id, "text too short, skipping");
                report.record_skip();
                continue;
            }

            let candidates = self
                .extractor
                .extract(&text, self.extract_top_n)
                .await
                .map_err(|e| PapertrailError::Extractor(e.to_string()))?;
            let curated = self.curator.curate(&candidates);
            if curated.is_empty() {
                report.record_skip();
                continue;
            }

            for term in &curated {
                self.store
                    .upsert_keyword(KeywordAssignment {
                        paper_id: paper.id,
                        keyword: term.term.clone(),
                        method: method.clone(),
                        score: term.score,
                    })
                    .await?;
            }
            report.record_success();
        }

        info!(
            method,
            processed = report.processed,
            succeeded = report.succeeded,
            skipped = report.skipped,
            "curation batch complete"
        );
        Ok(report)
    }
}

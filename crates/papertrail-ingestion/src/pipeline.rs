//! Ingestion orchestration.
//!
//! Two phases, runnable independently:
//!   1. `ingest_raw` — land fetched records in the raw store (idempotent
//!      upsert on (source, source id); re-fetching is always safe)
//!   2. `link_pending` — pull unlinked records per source and run the
//!      linker over them

use std::sync::Arc;

use tracing::{info, instrument};

use papertrail_common::{BatchReport, Result, Settings};
use papertrail_store::{CatalogStore, RawRecord, RawStore, RecordSource};

use crate::linker::{LinkageSummary, RecordLinker};

/// Land a batch of fetched records in the raw store.
///
/// Records with an empty source id are rejected per-record; everything else
/// is upserted as-is. Cleaning happens at linkage time, not here.
#[instrument(skip_all, fields(count = records.len()))]
pub async fn ingest_raw<R: RawStore>(store: &R, records: Vec<RawRecord>) -> Result<BatchReport> {
    let mut report = BatchReport::new();
    for record in records {
        if record.source_id.trim().is_empty() {
            report.record_failure(
                format!("{}/?", record.source.as_str()),
                "empty source id",
            );
            continue;
        }
        store.upsert_record(record).await?;
        report.record_success();
    }
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "raw ingestion complete"
    );
    Ok(report)
}

/// Link all pending raw records into canonical papers, one sub-batch per
/// source in priority order (curated sources first, so they win the
/// first-writer race for venue and quality).
#[instrument(skip_all)]
pub async fn link_pending<S>(store: Arc<S>, settings: &Settings) -> Result<LinkageSummary>
where
    S: RawStore + CatalogStore + 'static,
{
    let mut linker = RecordLinker::new(store.clone());
    let mut summary = LinkageSummary::default();
    for source in RecordSource::ALL {
        let pending = store
            .unlinked_records(Some(source), settings.link_batch_limit)
            .await?;
        if pending.is_empty() {
            continue;
        }
        info!(source = source.as_str(), count = pending.len(), "linking records");
        summary.absorb(linker.process_batch(&pending).await?);
    }
    Ok(summary)
}

//! End-to-end linkage over the in-memory store: raw ingestion, per-source
//! batching, cross-source merge, venue creation and provenance.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use papertrail_common::Settings;
use papertrail_ingestion::{ingest_raw, link_pending};
use papertrail_store::{
    AnalysisStore, CatalogStore, MemoryStore, QualityFlag, QueryFilter, RawRecord, RawStore,
    RecordSource,
};

fn record(source: RecordSource, id: &str, title: &str, hour: u32) -> RawRecord {
    RawRecord {
        source,
        source_id: id.to_string(),
        title: title.to_string(),
        abstract_text: Some("We study attention mechanisms.".to_string()),
        authors: vec!["A. Vaswani".to_string()],
        year: Some(2023),
        venue_raw: None,
        journal_ref: None,
        comments: None,
        categories: None,
        payload: None,
        ingested_at: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn cross_source_records_merge_into_one_paper() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();

    let mut openreview = record(RecordSource::OpenReview, "or-1", "Scaling  Attention", 1);
    openreview.venue_raw = Some("NeurIPS 2023".to_string());
    let mut arxiv = record(RecordSource::Arxiv, "2303.0001", "scaling attention", 2);
    arxiv.comments = Some("Accepted by NeurIPS'23".to_string());

    let report = ingest_raw(store.as_ref(), vec![openreview, arxiv])
        .await
        .unwrap();
    assert_eq!(report.succeeded, 2);

    let summary = link_pending(store.clone(), &settings).await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.merged, 1);

    assert_eq!(store.paper_count(&QueryFilter::default()).await.unwrap(), 1);
    let paper = store
        .find_paper_by_title("scaling attention", Some(2023))
        .await
        .unwrap()
        .expect("paper linked");
    // OpenReview is processed first and decides the paper's metadata.
    assert_eq!(paper.quality_flag, QualityFlag::Accepted);
    assert_eq!(paper.canonical_title, "Scaling Attention");
    let venue_id = paper.venue_id.expect("venue attributed");

    let venue = store.venue_by_name("NeurIPS").await.unwrap().unwrap();
    assert_eq!(venue.id, venue_id);
    assert!(venue.aliases.iter().any(|a| a == "NIPS"));
    assert_eq!(venue.first_year, Some(2023));

    let mut links = store.provenance_links(paper.id).await.unwrap();
    links.sort_by(|a, b| a.source.as_str().cmp(b.source.as_str()));
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].source, RecordSource::Arxiv);
    assert_eq!(links[0].confidence, 0.9);
    assert_eq!(links[1].source, RecordSource::OpenReview);
    assert_eq!(links[1].confidence, 1.0);

    // Nothing left pending.
    assert!(store.unlinked_records(None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_title_is_skipped_not_fatal() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();

    let blank = record(RecordSource::Arxiv, "2303.0002", "   ", 1);
    let fine = record(RecordSource::Arxiv, "2303.0003", "A Fine Paper", 2);
    ingest_raw(store.as_ref(), vec![blank, fine]).await.unwrap();

    let summary = link_pending(store.clone(), &settings).await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.report.skipped, 1);
    assert_eq!(summary.report.failed, 0);

    // The blank record stays pending rather than being dropped.
    let pending = store.unlinked_records(None, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].source_id, "2303.0002");
}

#[tokio::test]
async fn relinking_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();

    let mut r = record(RecordSource::Arxiv, "2303.0004", "Robust Widgets", 1);
    r.journal_ref = Some("ICML 2021".to_string());
    ingest_raw(store.as_ref(), vec![r.clone()]).await.unwrap();
    link_pending(store.clone(), &settings).await.unwrap();

    // Re-ingesting the same record and linking again adds nothing.
    ingest_raw(store.as_ref(), vec![r]).await.unwrap();
    let summary = link_pending(store.clone(), &settings).await.unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.merged, 0);
    assert_eq!(store.paper_count(&QueryFilter::default()).await.unwrap(), 1);
    assert_eq!(store.record_count().await.unwrap(), 1);
}

#[tokio::test]
async fn domain_falls_back_to_text_classification() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();

    let mut r = record(
        RecordSource::SemanticScholar,
        "s2-1",
        "Reward Shaping for Exploration",
        1,
    );
    r.abstract_text =
        Some("A reinforcement learning agent improves its policy from reward.".to_string());
    ingest_raw(store.as_ref(), vec![r]).await.unwrap();
    link_pending(store.clone(), &settings).await.unwrap();

    let paper = store
        .find_paper_by_title("reward shaping for exploration", Some(2023))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paper.domain, Some(papertrail_store::Domain::Rl));
    assert_eq!(paper.quality_flag, QualityFlag::Unknown);
    assert!(paper.venue_id.is_none());

    // No venue evidence means a zero-confidence provenance link.
    let links = store.provenance_links(paper.id).await.unwrap();
    assert_eq!(links[0].confidence, 0.0);
    let obs = store.observations(None).await.unwrap();
    assert_eq!(obs.len(), 1);
}

//! Full-stack flow: raw ingestion, linkage, curation, trend recomputation
//! with watermark skipping, and the read-side queries.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use papertrail_common::Settings;
use papertrail_ingestion::{ingest_raw, link_pending};
use papertrail_keywords::{CurationPipeline, FrequencyExtractor, KeywordCurator};
use papertrail_store::{
    AnalysisStore, Granularity, MemoryStore, QueryFilter, RawRecord, RecordSource,
};
use papertrail_trends::{CatalogQueries, RefreshOutcome, TrendEngine};

fn record(id: &str, title: &str, abstract_text: &str, year: i32, day: u32) -> RawRecord {
    RawRecord {
        source: RecordSource::Arxiv,
        source_id: id.to_string(),
        title: title.to_string(),
        abstract_text: Some(abstract_text.to_string()),
        authors: vec!["A. Author".to_string()],
        year: Some(year),
        venue_raw: None,
        journal_ref: Some(format!("ICML {year}")),
        comments: None,
        categories: Some("cs.LG".to_string()),
        payload: None,
        ingested_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
    }
}

async fn seed(store: &Arc<MemoryStore>, settings: &Settings) {
    let records = vec![
        record(
            "2403.0001",
            "Diffusion Policies for Control",
            "Diffusion policies improve control. Diffusion policies scale.",
            2023,
            1,
        ),
        record(
            "2403.0002",
            "Sampling in Diffusion Policies",
            "We accelerate diffusion policies with better sampling schedules.",
            2023,
            8,
        ),
        record(
            "2403.0003",
            "Contrastive Pretraining at Scale",
            "Contrastive pretraining of encoders with large batches of pairs.",
            2024,
            8,
        ),
    ];
    ingest_raw(store.as_ref(), records).await.unwrap();
    link_pending(store.clone(), settings).await.unwrap();
    CurationPipeline::new(
        store.clone(),
        FrequencyExtractor,
        KeywordCurator::default(),
        settings,
    )
    .run(100)
    .await
    .unwrap();
}

#[tokio::test]
async fn refresh_builds_buckets_and_respects_watermark() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();
    seed(&store, &settings).await;

    let engine = TrendEngine::new(store.clone());
    let outcome = engine.refresh(None, Granularity::Week, false).await.unwrap();
    let RefreshOutcome::Recomputed { buckets, fallbacks, .. } = outcome else {
        panic!("first refresh must recompute");
    };
    assert_eq!(buckets, 2);
    // Week buckets are always dated by ingestion time.
    assert_eq!(fallbacks, 3);

    let weekly = store.buckets("all", Granularity::Week).await.unwrap();
    assert_eq!(weekly[0].paper_count, 1);
    assert_eq!(weekly[1].paper_count, 2);

    // Nothing new ingested: the second run is skipped, forcing overrides.
    assert_eq!(
        engine.refresh(None, Granularity::Week, false).await.unwrap(),
        RefreshOutcome::Skipped
    );
    assert!(matches!(
        engine.refresh(None, Granularity::Week, true).await.unwrap(),
        RefreshOutcome::Recomputed { .. }
    ));

    // A new ingestion advances the watermark and re-enables recomputation.
    ingest_raw(
        store.as_ref(),
        vec![record(
            "2403.0004",
            "Diffusion Policies Revisited",
            "Diffusion policies revisited with fresh eyes and fresh samples.",
            2024,
            20,
        )],
    )
    .await
    .unwrap();
    link_pending(store.clone(), &settings).await.unwrap();
    assert!(matches!(
        engine.refresh(None, Granularity::Week, false).await.unwrap(),
        RefreshOutcome::Recomputed { .. }
    ));
}

#[tokio::test]
async fn forced_recomputation_is_byte_identical() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();
    seed(&store, &settings).await;

    let engine = TrendEngine::new(store.clone());
    engine.refresh(None, Granularity::Week, false).await.unwrap();
    let first = store.buckets("all", Granularity::Week).await.unwrap();
    let first_emerging = store.emerging("all").await.unwrap().len();

    // Same data, forced rebuild: every bucket and keyword ranking must
    // come out identical.
    engine.refresh(None, Granularity::Week, true).await.unwrap();
    let second = store.buckets("all", Granularity::Week).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.emerging("all").await.unwrap().len(), first_emerging);
}

#[tokio::test]
async fn year_buckets_use_publication_year() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();
    seed(&store, &settings).await;

    let engine = TrendEngine::new(store.clone());
    let RefreshOutcome::Recomputed { buckets, fallbacks, .. } = engine
        .refresh(None, Granularity::Year, false)
        .await
        .unwrap()
    else {
        panic!("must recompute");
    };
    assert_eq!(buckets, 2);
    assert_eq!(fallbacks, 0);

    let yearly = store.buckets("all", Granularity::Year).await.unwrap();
    assert_eq!(yearly[0].bucket_key, "2023");
    assert_eq!(yearly[0].paper_count, 2);
    assert_eq!(yearly[1].bucket_key, "2024");
}

#[tokio::test]
async fn queries_aggregate_the_catalog() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::default();
    seed(&store, &settings).await;

    let queries = CatalogQueries::new(store.clone());
    let top = queries
        .top_keywords(&QueryFilter::default(), 5)
        .await
        .unwrap();
    assert!(!top.is_empty());
    assert!(top.iter().any(|kc| kc.keyword.contains("diffusion")));

    // All three seed papers cite an ICML journal_ref.
    let stats = queries.venue_stats("ICML", 5).await.unwrap().unwrap();
    assert_eq!(stats.paper_count, 3);
    assert_eq!(stats.venue.canonical_name, "ICML");
    assert!(!stats.top_keywords.is_empty());

    assert!(queries.venue_stats("NoSuchConf", 5).await.unwrap().is_none());

    let series = queries
        .keyword_trend("diffusion policies", None)
        .await
        .unwrap();
    assert_eq!(series.points, vec![(2023, 2)]);
    assert!(series.growth_rate.is_none());
}

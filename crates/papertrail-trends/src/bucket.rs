//! Time bucketing of paper observations.

use std::collections::BTreeMap;

use papertrail_store::{Granularity, KeywordCount, PaperObservation, TrendBucket};

/// How many keywords each bucket retains. Large enough that emerging-topic
/// detection never loses a keyword to bucket truncation.
pub const BUCKET_KEYWORD_POOL: usize = 300;

/// Buckets plus how many papers were dated from their ingestion timestamp
/// rather than a publication date.
#[derive(Debug)]
pub struct Bucketing {
    pub buckets: Vec<TrendBucket>,
    pub fallback_count: usize,
}

/// Aggregate observations into one bucket per distinct time key.
///
/// At year granularity a paper is dated by its publication year, falling
/// back to the ingestion timestamp when the year is missing. Sub-year
/// granularities always date by ingestion timestamp — sources publish at
/// day precision only rarely, and a bare year cannot be placed in a week —
/// and every such paper counts toward `fallback_count` so callers can
/// judge how approximate the buckets are.
///
/// Bucket keyword lists are ranked count-descending with keyword-ascending
/// tie-break, so recomputing over the same data is byte-identical.
pub fn bucketize(
    observations: &[PaperObservation],
    scope: &str,
    granularity: Granularity,
    keyword_pool: usize,
) -> Bucketing {
    let mut fallback_count = 0usize;
    let mut papers_per_key: BTreeMap<String, usize> = BTreeMap::new();
    let mut keywords_per_key: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();

    for obs in observations {
        let key = match (granularity, obs.year) {
            (Granularity::Year, Some(year)) => Granularity::key_for_year(year),
            _ => {
                fallback_count += 1;
                granularity.key_for(&obs.ingested_at)
            }
        };
        *papers_per_key.entry(key.clone()).or_default() += 1;
        let counts = keywords_per_key.entry(key).or_default();
        for keyword in &obs.keywords {
            *counts.entry(keyword.as_str()).or_default() += 1;
        }
    }

    let buckets = papers_per_key
        .into_iter()
        .map(|(bucket_key, paper_count)| {
            let mut top_keywords: Vec<KeywordCount> = keywords_per_key
                .remove(&bucket_key)
                .unwrap_or_default()
                .into_iter()
                .map(|(keyword, count)| KeywordCount {
                    keyword: keyword.to_string(),
                    count,
                })
                .collect();
            top_keywords
                .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
            top_keywords.truncate(keyword_pool);
            TrendBucket {
                scope: scope.to_string(),
                granularity,
                bucket_key,
                paper_count,
                top_keywords,
            }
        })
        .collect();

    Bucketing {
        buckets,
        fallback_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn obs(year: Option<i32>, day: u32, keywords: &[&str]) -> PaperObservation {
        PaperObservation {
            paper_id: Uuid::new_v4(),
            year,
            ingested_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            domain: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn year_granularity_prefers_publication_year() {
        let observations = vec![
            obs(Some(2022), 1, &["transformer"]),
            obs(Some(2022), 2, &["transformer", "attention"]),
            obs(None, 3, &["attention"]),
        ];
        let out = bucketize(&observations, "all", Granularity::Year, 10);
        // Two papers land in 2022, the undated one in its ingestion year.
        assert_eq!(out.fallback_count, 1);
        assert_eq!(out.buckets.len(), 2);
        assert_eq!(out.buckets[0].bucket_key, "2022");
        assert_eq!(out.buckets[0].paper_count, 2);
        assert_eq!(out.buckets[0].top_keywords[0].keyword, "transformer");
        assert_eq!(out.buckets[1].bucket_key, "2024");
    }

    #[test]
    fn week_granularity_dates_by_ingestion() {
        let observations = vec![
            obs(Some(2022), 1, &["a"]),
            obs(Some(2022), 2, &["a"]),
            obs(Some(2022), 10, &["b"]),
        ];
        let out = bucketize(&observations, "all", Granularity::Week, 10);
        assert_eq!(out.fallback_count, 3);
        assert_eq!(out.buckets.len(), 2);
        assert_eq!(out.buckets[0].bucket_key, "2024-W01");
        assert_eq!(out.buckets[0].paper_count, 2);
        assert_eq!(out.buckets[1].bucket_key, "2024-W02");
    }

    #[test]
    fn keyword_ranking_is_deterministic() {
        let observations = vec![
            obs(Some(2022), 1, &["b", "a"]),
            obs(Some(2022), 2, &["a", "b", "c"]),
        ];
        let out = bucketize(&observations, "all", Granularity::Year, 2);
        let kws = &out.buckets[0].top_keywords;
        // a and b tie at 2; alphabetical order breaks the tie, c is cut.
        assert_eq!(kws.len(), 2);
        assert_eq!(kws[0].keyword, "a");
        assert_eq!(kws[1].keyword, "b");
    }

    #[test]
    fn empty_observations_yield_no_buckets() {
        let out = bucketize(&[], "all", Granularity::Month, 10);
        assert!(out.buckets.is_empty());
        assert_eq!(out.fallback_count, 0);
    }
}

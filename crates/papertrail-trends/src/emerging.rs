//! Emerging-topic detection over weekly buckets.
//!
//! Compares each keyword's average frequency in the most recent window of
//! buckets against the window before it. A keyword with essentially no
//! history that suddenly appears is "newly emerged" and reported with an
//! infinite growth rate, ahead of everything merely rising.

use serde::{Deserialize, Serialize};

use papertrail_store::{EmergingTopic, TrendBucket, TrendLabel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingConfig {
    /// Buckets per window.
    pub window: usize,
    /// Growth at or above this is rising.
    pub rising_threshold: f64,
    /// Growth at or below this is declining.
    pub declining_threshold: f64,
    /// Historical averages below this count as "no history".
    pub near_zero: f64,
}

impl Default for EmergingConfig {
    fn default() -> Self {
        Self {
            window: 4,
            rising_threshold: 1.5,
            declining_threshold: 0.7,
            near_zero: 0.1,
        }
    }
}

/// Classify a growth rate.
pub fn label_growth(growth: f64, config: &EmergingConfig) -> TrendLabel {
    if growth >= config.rising_threshold {
        TrendLabel::Rising
    } else if growth <= config.declining_threshold {
        TrendLabel::Declining
    } else {
        TrendLabel::Stable
    }
}

/// Detect emerging topics in time-ordered weekly buckets.
///
/// Only rising keywords are returned: newly emerged first, then by growth
/// rate, then by recent count, keyword as the final tie-break. Fewer than
/// two buckets means there is nothing to compare against.
pub fn detect_emerging(
    buckets: &[TrendBucket],
    scope: &str,
    config: &EmergingConfig,
) -> Vec<EmergingTopic> {
    if buckets.len() < 2 {
        return Vec::new();
    }
    let recent_start = buckets.len().saturating_sub(config.window);
    let hist_start = recent_start.saturating_sub(config.window);
    let recent = &buckets[recent_start..];
    let historical = &buckets[hist_start..recent_start];

    let mut keywords: Vec<&str> = recent
        .iter()
        .flat_map(|b| b.top_keywords.iter().map(|kc| kc.keyword.as_str()))
        .collect();
    keywords.sort();
    keywords.dedup();

    let count_in = |window: &[TrendBucket], keyword: &str| -> usize {
        window
            .iter()
            .flat_map(|b| b.top_keywords.iter())
            .filter(|kc| kc.keyword == keyword)
            .map(|kc| kc.count)
            .sum()
    };
    let first_seen = |keyword: &str| -> String {
        buckets
            .iter()
            .find(|b| b.top_keywords.iter().any(|kc| kc.keyword == keyword))
            .map(|b| b.bucket_key.clone())
            .unwrap_or_default()
    };

    let mut topics = Vec::new();
    for keyword in keywords {
        let recent_count = count_in(recent, keyword);
        if recent_count == 0 {
            continue;
        }
        let recent_avg = recent_count as f64 / recent.len() as f64;
        let historical_avg = if historical.is_empty() {
            0.0
        } else {
            count_in(historical, keyword) as f64 / historical.len() as f64
        };

        let growth_rate = if historical_avg < config.near_zero {
            f64::INFINITY
        } else {
            recent_avg / historical_avg
        };
        let label = label_growth(growth_rate, config);
        if label != TrendLabel::Rising {
            continue;
        }
        topics.push(EmergingTopic {
            scope: scope.to_string(),
            keyword: keyword.to_string(),
            growth_rate,
            first_seen_bucket: first_seen(keyword),
            recent_count,
            label,
        });
    }

    topics.sort_by(|a, b| {
        let a_new = a.growth_rate.is_infinite();
        let b_new = b.growth_rate.is_infinite();
        b_new
            .cmp(&a_new)
            .then_with(|| {
                b.growth_rate
                    .partial_cmp(&a.growth_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.recent_count.cmp(&a.recent_count))
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use papertrail_store::{Granularity, KeywordCount};

    fn bucket(key: &str, counts: &[(&str, usize)]) -> TrendBucket {
        TrendBucket {
            scope: "all".to_string(),
            granularity: Granularity::Week,
            bucket_key: key.to_string(),
            paper_count: counts.iter().map(|(_, c)| c).sum(),
            top_keywords: counts
                .iter()
                .map(|(k, c)| KeywordCount {
                    keyword: k.to_string(),
                    count: *c,
                })
                .collect(),
        }
    }

    fn weekly(counts_per_week: &[&[(&str, usize)]]) -> Vec<TrendBucket> {
        counts_per_week
            .iter()
            .enumerate()
            .map(|(i, counts)| bucket(&format!("2024-W{:02}", i + 1), counts))
            .collect()
    }

    #[test]
    fn steady_growth_is_rising() {
        let buckets = weekly(&[
            &[("mamba", 1)],
            &[("mamba", 1)],
            &[("mamba", 2)],
            &[("mamba", 2)],
            &[("mamba", 6)],
            &[("mamba", 7)],
            &[("mamba", 8)],
            &[("mamba", 9)],
        ]);
        let topics = detect_emerging(&buckets, "all", &EmergingConfig::default());
        assert_eq!(topics.len(), 1);
        let t = &topics[0];
        assert_eq!(t.keyword, "mamba");
        // recent avg 7.5 over historical avg 1.5.
        assert_eq!(t.growth_rate, 5.0);
        assert_eq!(t.label, TrendLabel::Rising);
        assert_eq!(t.recent_count, 30);
        assert_eq!(t.first_seen_bucket, "2024-W01");
    }

    #[test]
    fn no_history_means_newly_emerged() {
        let buckets = weekly(&[
            &[("old topic", 5)],
            &[("old topic", 5)],
            &[("old topic", 5)],
            &[("old topic", 5)],
            &[("old topic", 5), ("world models", 3)],
            &[("old topic", 5), ("world models", 4)],
            &[("old topic", 5), ("world models", 5)],
            &[("old topic", 5), ("world models", 6)],
        ]);
        let topics = detect_emerging(&buckets, "all", &EmergingConfig::default());
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].keyword, "world models");
        assert!(topics[0].growth_rate.is_infinite());
        assert_eq!(topics[0].first_seen_bucket, "2024-W05");
    }

    #[test]
    fn stable_and_declining_are_dropped() {
        let buckets = weekly(&[
            &[("steady", 5), ("fading", 10)],
            &[("steady", 5), ("fading", 10)],
            &[("steady", 5), ("fading", 10)],
            &[("steady", 5), ("fading", 10)],
            &[("steady", 5), ("fading", 2)],
            &[("steady", 5), ("fading", 2)],
            &[("steady", 6), ("fading", 2)],
            &[("steady", 5), ("fading", 1)],
        ]);
        let topics = detect_emerging(&buckets, "all", &EmergingConfig::default());
        assert!(topics.is_empty());
    }

    #[test]
    fn new_topics_sort_before_rising_ones() {
        let buckets = weekly(&[
            &[("rising", 2)],
            &[("rising", 2)],
            &[("rising", 2)],
            &[("rising", 2)],
            &[("rising", 8), ("brand new", 1)],
            &[("rising", 8), ("brand new", 1)],
            &[("rising", 8), ("brand new", 1)],
            &[("rising", 8), ("brand new", 1)],
        ]);
        let topics = detect_emerging(&buckets, "all", &EmergingConfig::default());
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].keyword, "brand new");
        assert_eq!(topics[1].keyword, "rising");
    }

    #[test]
    fn single_bucket_has_no_baseline() {
        let buckets = weekly(&[&[("anything", 100)]]);
        assert!(detect_emerging(&buckets, "all", &EmergingConfig::default()).is_empty());
    }
}

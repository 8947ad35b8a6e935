//! Term extraction seam.
//!
//! Extraction itself is a pluggable collaborator (an external model or
//! service in production); the catalog only fixes the trait. A simple
//! frequency-based extractor is provided as the default and as the test
//! backend.

use std::collections::HashMap;

use async_trait::async_trait;

use papertrail_common::Result;

use crate::curator::ScoredTerm;
use crate::vocab;

/// Produces candidate keywords with scores in [0, 1]. The `method` label
/// is stored on every assignment, so switching extractors never clobbers
/// another method's keywords.
#[async_trait]
pub trait TermExtractor: Send + Sync {
    fn method(&self) -> &str;

    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<ScoredTerm>>;
}

/// Unigram/bigram frequency extractor. Scores are counts normalized by the
/// most frequent candidate, so the top term always scores 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyExtractor;

#[async_trait]
impl TermExtractor for FrequencyExtractor {
    fn method(&self) -> &str {
        "freq"
    }

    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<ScoredTerm>> {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .map(|w| w.trim_matches('-').to_string())
            .filter(|w| w.len() >= 2)
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in &words {
            if !vocab::is_stopword(word) {
                *counts.entry(word.clone()).or_default() += 1;
            }
        }
        for pair in words.windows(2) {
            if vocab::is_stopword(&pair[0]) || vocab::is_stopword(&pair[1]) {
                continue;
            }
            *counts.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
        }

        let max = counts.values().copied().max().unwrap_or(1) as f64;
        let mut out: Vec<ScoredTerm> = counts
            .into_iter()
            .map(|(term, count)| ScoredTerm {
                term,
                score: count as f64 / max,
            })
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        out.truncate(top_n);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_terms_score_highest() {
        let text = "Diffusion models for images. Diffusion models learn to denoise images.";
        let out = FrequencyExtractor.extract(text, 5).await.unwrap();
        assert_eq!(out[0].score, 1.0);
        assert!(out.iter().any(|t| t.term == "diffusion models"));
    }

    #[tokio::test]
    async fn stopwords_never_become_candidates() {
        let out = FrequencyExtractor
            .extract("the quick the lazy the end", 10)
            .await
            .unwrap();
        assert!(out.iter().all(|t| t.term != "the"));
    }

    #[tokio::test]
    async fn empty_text_yields_nothing() {
        assert!(FrequencyExtractor.extract("", 10).await.unwrap().is_empty());
    }
}

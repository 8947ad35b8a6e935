//! Keyword curation pipeline.
//!
//! Pure function over scored terms: normalize, filter, canonicalize,
//! dedup (exact then fuzzy), cap. Deterministic and idempotent — running
//! the output through again yields the same list.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vocab;

/// A candidate keyword with its extractor score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f64,
}

impl ScoredTerm {
    pub fn new(term: impl Into<String>, score: f64) -> Self {
        Self {
            term: term.into(),
            score,
        }
    }
}

/// Curation tunables. Defaults match the catalog's storage contract
/// (at most ten keywords per paper).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorConfig {
    pub min_len: usize,
    pub max_len: usize,
    pub max_keywords: usize,
    pub fuzzy_dedup: bool,
    pub fuzzy_threshold: f64,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            min_len: 3,
            max_len: 60,
            max_keywords: 10,
            fuzzy_dedup: true,
            fuzzy_threshold: 0.85,
        }
    }
}

/// Stateless curator over the static vocabularies.
#[derive(Debug, Clone, Default)]
pub struct KeywordCurator {
    config: CuratorConfig,
}

fn punct_unify_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-_/]").unwrap())
}

fn trailing_punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[,;:.!?'")\]]+$"#).unwrap())
}

fn leading_punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^[(\['"]+"#).unwrap())
}

fn numeric_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s.,-]+$").unwrap())
}

fn url_email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(http|www|\.com|\.org|@)").unwrap())
}

impl KeywordCurator {
    pub fn new(config: CuratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    /// Lowercase, unify `-`/`_`/`/` to spaces, strip edge punctuation,
    /// collapse whitespace. `None` when nothing survives.
    pub fn normalize(&self, term: &str) -> Option<String> {
        let t = term.to_lowercase();
        let t = punct_unify_regex().replace_all(&t, " ");
        let t = trailing_punct_regex().replace(&t, "");
        let t = leading_punct_regex().replace(&t, "");
        let t = t.split_whitespace().collect::<Vec<_>>().join(" ");
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }

    /// True when a normalized term should be dropped: vocabulary hit or
    /// noise shape (length bounds, digit-heavy, URL/email fragment).
    pub fn should_filter(&self, term: &str) -> bool {
        if vocab::is_banned(term) || vocab::is_domain_noise(term) {
            return true;
        }
        // Stopwords only disqualify single-word terms; "state of the art"
        // style phrases are handled by the banned list instead.
        let single_word = !term.contains(' ');
        if single_word && vocab::is_stopword(term) {
            return true;
        }

        let len = term.chars().count();
        if len < self.config.min_len || len > self.config.max_len {
            return true;
        }
        if numeric_shape_regex().is_match(term) {
            return true;
        }
        let digits = term.chars().filter(|c| c.is_ascii_digit()).count();
        if digits * 2 > len {
            return true;
        }
        if url_email_regex().is_match(term) {
            return true;
        }
        false
    }

    /// Run the full pipeline. Output is score-descending (ties broken by
    /// term, ascending) and capped at `max_keywords`.
    pub fn curate(&self, terms: &[ScoredTerm]) -> Vec<ScoredTerm> {
        // Normalize, filter, canonicalize.
        let cleaned = terms.iter().filter_map(|t| {
            let normalized = self.normalize(&t.term)?;
            if self.should_filter(&normalized) {
                return None;
            }
            Some(ScoredTerm {
                term: vocab::canonicalize(&normalized).to_string(),
                score: t.score,
            })
        });

        // Exact dedup: keep the best score per canonical term.
        let mut best: HashMap<String, f64> = HashMap::new();
        for t in cleaned {
            let entry = best.entry(t.term).or_insert(f64::NEG_INFINITY);
            if t.score > *entry {
                *entry = t.score;
            }
        }
        let mut out: Vec<ScoredTerm> = best
            .into_iter()
            .map(|(term, score)| ScoredTerm { term, score })
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });

        if self.config.fuzzy_dedup {
            out = self.dedup_fuzzy(out);
        }
        out.truncate(self.config.max_keywords);
        out
    }

    /// Greedy fuzzy dedup over a score-descending list: a term is dropped
    /// when it is near-identical to an already accepted one, either by
    /// normalized Levenshtein similarity or by the trailing-"s" plural rule.
    fn dedup_fuzzy(&self, sorted: Vec<ScoredTerm>) -> Vec<ScoredTerm> {
        let mut accepted: Vec<ScoredTerm> = Vec::with_capacity(sorted.len());
        for candidate in sorted {
            let duplicate = accepted.iter().any(|kept| {
                strsim::normalized_levenshtein(&candidate.term, &kept.term)
                    >= self.config.fuzzy_threshold
                    || is_plural_variant(&candidate.term, &kept.term)
            });
            if !duplicate {
                accepted.push(candidate);
            }
        }
        accepted
    }
}

fn is_plural_variant(a: &str, b: &str) -> bool {
    a.strip_suffix('s') == Some(b) || b.strip_suffix('s') == Some(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curator() -> KeywordCurator {
        KeywordCurator::default()
    }

    fn terms(pairs: &[(&str, f64)]) -> Vec<ScoredTerm> {
        pairs.iter().map(|(t, s)| ScoredTerm::new(*t, *s)).collect()
    }

    #[test]
    fn normalize_unifies_punctuation() {
        let c = curator();
        assert_eq!(
            c.normalize("  Self-Supervised_Learning/Methods, ").as_deref(),
            Some("self supervised learning methods")
        );
        assert_eq!(c.normalize("(transformer)").as_deref(), Some("transformer"));
        assert_eq!(c.normalize(" -- "), None);
    }

    #[test]
    fn filters_vocabulary_and_noise_shapes() {
        let c = curator();
        assert!(c.should_filter("framework"));
        assert!(c.should_filter("the"));
        assert!(c.should_filter("ablation"));
        assert!(c.should_filter("2024 2025"));
        assert!(c.should_filter("ab"));
        assert!(c.should_filter("example.com page"));
        assert!(c.should_filter("2024 gpt4"));
        assert!(!c.should_filter("graph neural network"));
        // Stopword inside a phrase does not disqualify the phrase.
        assert!(!c.should_filter("out of distribution detection"));
    }

    #[test]
    fn synonym_variants_collapse_to_best_score() {
        let c = curator();
        let out = c.curate(&terms(&[
            ("Diffusion Models", 0.9),
            ("diffusion model", 0.8),
            ("GANs", 0.8),
        ]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].term, "diffusion model");
        assert_eq!(out[0].score, 0.9);
        assert_eq!(out[1].term, "generative adversarial network");
        assert_eq!(out[1].score, 0.8);
    }

    #[test]
    fn fuzzy_dedup_keeps_higher_scored_variant() {
        let c = curator();
        let out = c.curate(&terms(&[
            ("graph neural network", 0.7),
            ("graph neural networks", 0.9),
        ]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].term, "graph neural networks");
        assert_eq!(out[0].score, 0.9);
    }

    #[test]
    fn output_capped_and_sorted() {
        let c = curator();
        let input = terms(&[
            ("graph neural network", 0.95),
            ("diffusion model", 0.90),
            ("reinforcement learning", 0.89),
            ("object detection", 0.88),
            ("semantic segmentation", 0.87),
            ("machine translation", 0.86),
            ("question answering", 0.85),
            ("speech recognition", 0.84),
            ("federated learning", 0.83),
            ("meta learning", 0.82),
            ("knowledge distillation", 0.81),
            ("neural architecture search", 0.80),
        ]);
        let out = c.curate(&input);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].term, "graph neural network");
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        // The two lowest-scored distinct terms fall past the cap.
        assert!(!out.iter().any(|t| t.term == "neural architecture search"));
    }

    #[test]
    fn short_acronyms_expand_when_length_floor_allows() {
        // The default floor of 3 drops two-letter terms before the synonym
        // table sees them; lowering it makes the expansions reachable.
        let strict = curator().curate(&terms(&[("CV", 0.9)]));
        assert!(strict.is_empty());

        let lenient = KeywordCurator::new(CuratorConfig {
            min_len: 2,
            ..Default::default()
        });
        let out = lenient.curate(&terms(&[("CV", 0.9), ("RL", 0.8)]));
        assert_eq!(out[0].term, "computer vision");
        assert_eq!(out[1].term, "reinforcement learning");
    }

    #[test]
    fn fuzzy_dedup_never_lengthens_output() {
        let input = terms(&[
            ("graph neural network", 0.9),
            ("graph neural networks", 0.8),
            ("diffusion model", 0.7),
            ("diffusion  model", 0.65),
            ("contrastive learning", 0.6),
        ]);
        let with_fuzzy = curator().curate(&input);
        let without_fuzzy = KeywordCurator::new(CuratorConfig {
            fuzzy_dedup: false,
            ..Default::default()
        })
        .curate(&input);
        assert!(with_fuzzy.len() <= without_fuzzy.len());
        // The top-scoring term survives fuzzy dedup untouched.
        assert_eq!(with_fuzzy[0], without_fuzzy[0]);
        assert_eq!(with_fuzzy[0].term, "graph neural network");
    }

    #[test]
    fn curation_is_idempotent() {
        let c = curator();
        let once = c.curate(&terms(&[
            ("LLMs", 0.9),
            ("large language models", 0.85),
            ("prompt engineering", 0.6),
            ("model", 0.99),
        ]));
        let twice = c.curate(&once);
        assert_eq!(once, twice);
        assert_eq!(once[0].term, "large language model");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(curator().curate(&[]).is_empty());
    }
}

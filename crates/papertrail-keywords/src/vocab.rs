//! Static vocabularies for keyword curation.
//!
//! Three filter lists plus the synonym table. All are data, not code:
//! adding a term here is the whole change. Lookups go through lazily built
//! hash sets so the slices stay the single source of truth.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Low-information academic filler. Terms every paper uses, so they carry
/// no signal as keywords.
pub static BANNED_TERMS: &[&str] = &[
    // paper-writing boilerplate
    "method",
    "methods",
    "approach",
    "approaches",
    "technique",
    "techniques",
    "result",
    "results",
    "performance",
    "paper",
    "papers",
    "study",
    "studies",
    "novel",
    "new",
    "proposed",
    "propose",
    "present",
    "presents",
    "introduction",
    "conclusion",
    "abstract",
    "work",
    "works",
    "research",
    "analysis",
    "experiment",
    "experiments",
    "evaluation",
    "evaluations",
    // over-generic technical terms
    "model",
    "models",
    "network",
    "networks",
    "system",
    "systems",
    "algorithm",
    "algorithms",
    "framework",
    "frameworks",
    "data",
    "dataset",
    "datasets",
    "benchmark",
    "benchmarks",
    "training",
    "testing",
    "learning",
    "task",
    "tasks",
    // qualifiers
    "based",
    "using",
    "via",
    "improved",
    "better",
    "best",
    "efficient",
    "effective",
    "simple",
    "complex",
    "large",
    "small",
    "high",
    "low",
    "state",
    "art",
    "end",
    "end to end",
    // claim verbs
    "show",
    "shows",
    "demonstrate",
    "demonstrates",
    "achieve",
    "achieves",
    "outperform",
    "outperforms",
    "improve",
    "improves",
];

/// English stopwords, checked against single-word terms only.
pub static STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "when", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "once", "here", "there", "all", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "can", "will", "just", "should", "now", "also", "however", "thus", "therefore", "hence",
    "although", "whereas", "while", "since", "because", "as", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would",
    "could", "might", "may", "must", "shall", "i", "you", "he", "she", "it", "we", "they",
    "what", "which", "who", "whom", "this", "that", "these", "those", "am",
];

/// Terms that are meaningful in running text but noise as extracted
/// keywords (experiment mechanics, reporting vocabulary).
pub static DOMAIN_NOISE: &[&str] = &[
    "experiments",
    "experimental",
    "ablation",
    "ablations",
    "comparison",
    "comparisons",
    "baseline",
    "baselines",
    "dataset",
    "datasets",
    "benchmark",
    "benchmarks",
    "samples",
    "sample",
    "examples",
    "example",
    "accuracy",
    "loss",
    "metrics",
    "metric",
    "score",
    "scores",
    "table",
    "tables",
    "figure",
    "figures",
    "problem",
    "problems",
    "solution",
    "solutions",
    "challenge",
    "challenges",
    "issue",
    "issues",
    "application",
    "applications",
];

/// Acronym and variant unification. Applied after normalization and before
/// dedup, so variants collapse onto one canonical spelling.
///
/// Filtering runs before expansion, so two-letter sources ("cv", "ml",
/// "dl", "ai", "rl") only take effect when the curator's length floor is
/// lowered below the default of 3.
pub static SYNONYMS: &[(&str, &str)] = &[
    ("llm", "large language model"),
    ("llms", "large language model"),
    ("large language models", "large language model"),
    ("diffusion models", "diffusion model"),
    ("diffusion based", "diffusion model"),
    ("transformers", "transformer"),
    ("vision transformers", "vision transformer"),
    ("vit", "vision transformer"),
    ("vits", "vision transformer"),
    ("gan", "generative adversarial network"),
    ("gans", "generative adversarial network"),
    ("generative adversarial networks", "generative adversarial network"),
    ("cnn", "convolutional neural network"),
    ("cnns", "convolutional neural network"),
    ("convolutional neural networks", "convolutional neural network"),
    ("rnn", "recurrent neural network"),
    ("rnns", "recurrent neural network"),
    ("recurrent neural networks", "recurrent neural network"),
    ("lstm", "long short term memory"),
    ("lstms", "long short term memory"),
    ("rl", "reinforcement learning"),
    ("drl", "deep reinforcement learning"),
    ("self supervised", "self supervised learning"),
    ("self supervision", "self supervised learning"),
    ("contrastive", "contrastive learning"),
    ("nlp", "natural language processing"),
    ("cv", "computer vision"),
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("ai", "artificial intelligence"),
];

pub fn is_banned(term: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| BANNED_TERMS.iter().copied().collect())
        .contains(term)
}

pub fn is_stopword(term: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
        .contains(term)
}

pub fn is_domain_noise(term: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| DOMAIN_NOISE.iter().copied().collect())
        .contains(term)
}

/// Canonical form of a term, or the term itself when no synonym applies.
pub fn canonicalize(term: &str) -> &str {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| SYNONYMS.iter().copied().collect())
        .get(term)
        .copied()
        .unwrap_or(term)
}

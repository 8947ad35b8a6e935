//! Domain classification for papers with no curated venue metadata.
//!
//! Two passes: the arXiv category string is authoritative when present and
//! recognized; otherwise the title and abstract are scored against per-domain
//! cue lists and the highest-scoring domain wins. Ties resolve to the
//! earliest entry in the taxonomy table.

use papertrail_store::Domain;

/// arXiv primary categories mapped to the taxonomy. Substring match against
/// the lowercased category string, in table order.
static CATEGORY_MAP: &[(&str, Domain)] = &[
    ("cs.cv", Domain::Cv),
    ("cs.cl", Domain::Nlp),
    ("cs.lg", Domain::Ml),
    ("stat.ml", Domain::Ml),
    ("cs.ne", Domain::Ml),
    ("cs.ro", Domain::Rl),
    ("cs.ai", Domain::Ai),
];

/// Cue terms per domain, matched as substrings of the lowercased
/// title + abstract. Order doubles as the tie-break.
static DOMAIN_CUES: &[(Domain, &[&str])] = &[
    (
        Domain::Cv,
        &[
            "image",
            "vision",
            "visual",
            "object detection",
            "segmentation",
            "video",
            "depth estimation",
            "pose estimation",
            "scene",
        ],
    ),
    (
        Domain::Nlp,
        &[
            "language model",
            "language",
            "text",
            "translation",
            "question answering",
            "summarization",
            "dialogue",
            "speech",
            "token",
        ],
    ),
    (
        Domain::Ml,
        &[
            "neural network",
            "optimization",
            "generalization",
            "gradient",
            "training",
            "classifier",
            "regression",
            "representation learning",
        ],
    ),
    (
        Domain::Rl,
        &[
            "reinforcement learning",
            "reward",
            "policy",
            "agent",
            "q-learning",
            "exploration",
            "environment",
            "robot",
        ],
    ),
    (
        Domain::Ai,
        &[
            "reasoning",
            "planning",
            "knowledge graph",
            "symbolic",
            "search",
            "inference",
        ],
    ),
];

/// Classify a paper into the domain taxonomy.
///
/// Returns `None` when neither the categories nor the text carry any signal.
pub fn classify(categories: Option<&str>, title: &str, abstract_text: &str) -> Option<Domain> {
    if let Some(categories) = categories {
        let folded = categories.to_lowercase();
        for (needle, domain) in CATEGORY_MAP {
            if folded.contains(needle) {
                return Some(*domain);
            }
        }
    }

    let text = format!("{} {}", title, abstract_text).to_lowercase();
    let mut best: Option<(Domain, usize)> = None;
    for (domain, cues) in DOMAIN_CUES {
        let score = cues.iter().filter(|cue| text.contains(*cue)).count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((*domain, score));
        }
    }
    best.map(|(domain, _)| domain)
}

//! Venue attribution from free-text evidence.
//!
//! Raw records rarely state their venue cleanly: arXiv carries it (if at
//! all) inside `comments` ("Accepted by NeurIPS'23") or `journal_ref`,
//! OpenAlex and Semantic Scholar put inconsistent spellings in `venue_raw`.
//! The resolver turns that evidence into a venue name plus a confidence
//! score via a fixed, short-circuiting priority order.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use papertrail_store::{Domain, RawRecord, VenueTier};

/// One regex over evidence text. `acceptance` marks patterns that require
/// an accepted/to-appear cue, which earns a higher confidence when matching
/// inside `comments`.
struct PatternSpec {
    pattern: &'static str,
    acceptance: bool,
}

/// Static description of one known venue.
struct VenueRule {
    name: &'static str,
    aliases: &'static [&'static str],
    domain: Domain,
    tier: VenueTier,
    patterns: &'static [PatternSpec],
}

// Acceptance patterns come before bare mentions within each venue, and
// rules are matched in declaration order. Ambiguous text resolves to the
// first rule that matches; this tie-break is deliberate and relied upon
// by callers, so reordering entries is a behavior change.
macro_rules! venue_patterns {
    ($alts:literal) => {
        &[
            PatternSpec {
                pattern: concat!(
                    r"(?i)\b(?:accepted|to appear|appearing|camera[- ]ready|published)\b",
                    r"[^.;]{0,40}?\b",
                    $alts,
                    r"\b[\s'’]*((?:19|20)\d{2}|\d{2})?"
                ),
                acceptance: true,
            },
            PatternSpec {
                pattern: concat!(r"(?i)\b", $alts, r"\b[\s'’]*((?:19|20)\d{2}|\d{2})?"),
                acceptance: false,
            },
        ]
    };
}

static VENUE_RULES: &[VenueRule] = &[
    VenueRule {
        name: "ICML",
        aliases: &["International Conference on Machine Learning"],
        domain: Domain::Ml,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:ICML|International Conference on Machine Learning)"),
    },
    VenueRule {
        name: "NeurIPS",
        aliases: &["NIPS", "Neural Information Processing Systems"],
        domain: Domain::Ml,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:NeurIPS|NIPS|Neural Information Processing Systems)"),
    },
    VenueRule {
        name: "ICLR",
        aliases: &["International Conference on Learning Representations"],
        domain: Domain::Ml,
        tier: VenueTier::A,
        patterns: venue_patterns!(
            r"(?:ICLR|International Conference on Learning Representations)"
        ),
    },
    VenueRule {
        name: "CVPR",
        aliases: &["Conference on Computer Vision and Pattern Recognition"],
        domain: Domain::Cv,
        tier: VenueTier::A,
        patterns: venue_patterns!(
            r"(?:CVPR|(?:Conference on )?Computer Vision and Pattern Recognition)"
        ),
    },
    VenueRule {
        name: "ICCV",
        aliases: &["International Conference on Computer Vision"],
        domain: Domain::Cv,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:ICCV|International Conference on Computer Vision)"),
    },
    VenueRule {
        name: "ECCV",
        aliases: &["European Conference on Computer Vision"],
        domain: Domain::Cv,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:ECCV|European Conference on Computer Vision)"),
    },
    VenueRule {
        name: "ACL",
        aliases: &["Association for Computational Linguistics"],
        domain: Domain::Nlp,
        tier: VenueTier::A,
        patterns: venue_patterns!(
            r"(?:ACL|Annual Meeting of the Association for Computational Linguistics)"
        ),
    },
    VenueRule {
        name: "EMNLP",
        aliases: &["Empirical Methods in Natural Language Processing"],
        domain: Domain::Nlp,
        tier: VenueTier::A,
        patterns: venue_patterns!(
            r"(?:EMNLP|Empirical Methods in Natural Language Processing)"
        ),
    },
    VenueRule {
        name: "NAACL",
        aliases: &["North American Chapter of the Association for Computational Linguistics"],
        domain: Domain::Nlp,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:NAACL)"),
    },
    VenueRule {
        name: "AAAI",
        aliases: &["AAAI Conference on Artificial Intelligence"],
        domain: Domain::Ai,
        tier: VenueTier::A,
        patterns: venue_patterns!(r"(?:AAAI)"),
    },
    VenueRule {
        name: "IJCAI",
        aliases: &["International Joint Conference on Artificial Intelligence"],
        domain: Domain::Ai,
        tier: VenueTier::A,
        patterns: venue_patterns!(
            r"(?:IJCAI|International Joint Conference on Artificial Intelligence)"
        ),
    },
    VenueRule {
        name: "CoRL",
        aliases: &["Conference on Robot Learning"],
        domain: Domain::Rl,
        tier: VenueTier::B,
        patterns: venue_patterns!(r"(?:CoRL|Conference on Robot Learning)"),
    },
    VenueRule {
        name: "AISTATS",
        aliases: &["International Conference on Artificial Intelligence and Statistics"],
        domain: Domain::Ml,
        tier: VenueTier::B,
        patterns: venue_patterns!(r"(?:AISTATS)"),
    },
];

struct CompiledRule {
    rule: &'static VenueRule,
    patterns: Vec<(Regex, bool)>,
}

fn compiled_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        VENUE_RULES
            .iter()
            .map(|rule| CompiledRule {
                rule,
                patterns: rule
                    .patterns
                    .iter()
                    .map(|p| (Regex::new(p.pattern).unwrap(), p.acceptance))
                    .collect(),
            })
            .collect()
    })
}

/// A successful venue attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueMatch {
    /// Canonical venue name to store (verbatim for curated sources with no
    /// table match).
    pub name: String,
    pub domain: Option<Domain>,
    pub tier: VenueTier,
    pub aliases: Vec<String>,
    pub confidence: f64,
    /// Year captured from the evidence text, where the pattern found one.
    pub year_hint: Option<i32>,
    /// True when the source vouches for acceptance (curated source) or the
    /// evidence carried an accepted/to-appear cue.
    pub accepted: bool,
}

struct TableHit {
    rule: &'static VenueRule,
    acceptance: bool,
    year: Option<i32>,
}

fn parse_year(token: &str) -> Option<i32> {
    let n: i32 = token.parse().ok()?;
    // Two-digit years are conference shorthand ('23 means 2023).
    Some(if token.len() == 2 { 2000 + n } else { n })
}

fn match_table(text: &str) -> Option<TableHit> {
    for compiled in compiled_rules() {
        for (regex, acceptance) in &compiled.patterns {
            if let Some(caps) = regex.captures(text) {
                let year = caps.get(1).and_then(|m| parse_year(m.as_str()));
                return Some(TableHit {
                    rule: compiled.rule,
                    acceptance: *acceptance,
                    year,
                });
            }
        }
    }
    None
}

fn match_from(hit: TableHit, confidence: f64) -> VenueMatch {
    VenueMatch {
        name: hit.rule.name.to_string(),
        domain: Some(hit.rule.domain),
        tier: hit.rule.tier,
        aliases: hit.rule.aliases.iter().map(|s| s.to_string()).collect(),
        confidence,
        year_hint: hit.year,
        accepted: hit.acceptance,
    }
}

/// Stateless venue resolver over the static rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct VenueResolver;

impl VenueResolver {
    pub fn new() -> Self {
        Self
    }

    /// Attribute a venue to a raw record. `None` means no usable evidence
    /// (confidence 0.0).
    ///
    /// Priority, first hit wins:
    /// 1. venue-curated source with non-empty `venue_raw` → verbatim, 1.0
    /// 2. `venue_raw` matches the rule table → 0.9
    /// 3. `comments` matches → 0.9 with an acceptance cue, else 0.7
    /// 4. `journal_ref` matches → 0.8
    pub fn resolve(&self, record: &RawRecord) -> Option<VenueMatch> {
        if record.source.is_venue_curated() {
            if let Some(raw) = record.venue_raw.as_deref() {
                let raw = raw.trim();
                if !raw.is_empty() {
                    // The source vouches for the name; the table only adds
                    // canonical spelling and metadata when it knows it.
                    let resolved = match match_table(raw) {
                        Some(hit) => VenueMatch {
                            accepted: true,
                            ..match_from(hit, 1.0)
                        },
                        None => VenueMatch {
                            name: raw.to_string(),
                            domain: None,
                            tier: VenueTier::C,
                            aliases: Vec::new(),
                            confidence: 1.0,
                            year_hint: None,
                            accepted: true,
                        },
                    };
                    return Some(resolved);
                }
            }
        }

        if let Some(raw) = non_empty(record.venue_raw.as_deref()) {
            if let Some(hit) = match_table(raw) {
                return Some(match_from(hit, 0.9));
            }
        }

        if let Some(comments) = non_empty(record.comments.as_deref()) {
            if let Some(hit) = match_table(comments) {
                let confidence = if hit.acceptance { 0.9 } else { 0.7 };
                debug!(
                    source_id = %record.source_id,
                    confidence,
                    "venue attributed from comments"
                );
                return Some(match_from(hit, confidence));
            }
        }

        if let Some(journal_ref) = non_empty(record.journal_ref.as_deref()) {
            if let Some(hit) = match_table(journal_ref) {
                return Some(match_from(hit, 0.8));
            }
        }

        None
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

//! Runtime tunables.
//!
//! All settings have sensible defaults and can be overridden through
//! `PAPERTRAIL_*` environment variables (a `.env` file is honoured via
//! dotenvy). None of them are required.

use serde::Serialize;

/// Batch-processing settings shared by the pipelines.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Maximum raw records pulled per linkage batch.
    pub link_batch_limit: usize,
    /// Maximum papers pulled per curation batch.
    pub curation_batch_limit: usize,
    /// Candidate terms requested from the extractor per paper
    /// (more than kept, so filtering has room to work).
    pub extract_top_n: usize,
    /// Curated keywords kept per paper.
    pub max_keywords: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            link_batch_limit: 1000,
            curation_batch_limit: 1000,
            extract_top_n: 15,
            max_keywords: 10,
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            link_batch_limit: env_usize("PAPERTRAIL_LINK_BATCH_LIMIT", defaults.link_batch_limit),
            curation_batch_limit: env_usize(
                "PAPERTRAIL_CURATION_BATCH_LIMIT",
                defaults.curation_batch_limit,
            ),
            extract_top_n: env_usize("PAPERTRAIL_EXTRACT_TOP_N", defaults.extract_top_n),
            max_keywords: env_usize("PAPERTRAIL_MAX_KEYWORDS", defaults.max_keywords),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.max_keywords, 10);
        assert_eq!(s.extract_top_n, 15);
        assert!(s.extract_top_n >= s.max_keywords);
    }

    #[test]
    fn unset_env_falls_back() {
        assert_eq!(env_usize("PAPERTRAIL_DOES_NOT_EXIST", 42), 42);
    }
}

//! papertrail-keywords — Keyword vocabularies, the curation pipeline and
//! the term-extraction seam.

pub mod curator;
pub mod extractor;
pub mod pipeline;
pub mod vocab;

pub use curator::{CuratorConfig, KeywordCurator, ScoredTerm};
pub use extractor::{FrequencyExtractor, TermExtractor};
pub use pipeline::CurationPipeline;

//! papertrail-ingestion — Turns raw, source-specific records into the
//! structured catalog: venue attribution from free-text evidence, domain
//! classification, and cross-source record linkage into canonical papers.

pub mod domain;
pub mod linker;
pub mod pipeline;
pub mod venue;

pub use linker::{normalize_title, LinkOutcome, LinkageSummary, RecordLinker, VenueCache};
pub use pipeline::{ingest_raw, link_pending};
pub use venue::{VenueMatch, VenueResolver};

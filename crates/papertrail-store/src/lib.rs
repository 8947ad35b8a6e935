//! papertrail-store — Typed catalog entities, the repository traits through
//! which the core talks to persistence, and an in-memory store used by tests
//! and single-process runs.
//!
//! The core never assumes more of the backend than per-call atomicity and
//! idempotent natural-key upserts; see the trait docs in `repository`.

pub mod entities;
pub mod memory;
pub mod repository;

pub use entities::{
    CanonicalPaper, Domain, EmergingTopic, Granularity, KeywordAssignment, KeywordCount,
    PaperObservation, ProvenanceLink, QualityFlag, QueryFilter, RawRecord, RawRecordKey,
    RecordSource, TrendBucket, TrendLabel, Venue, VenueTier,
};
pub use memory::MemoryStore;
pub use repository::{AnalysisStore, CatalogStore, RawStore};

//! papertrail-trends — Time bucketing, emerging-topic detection, the
//! watermark-driven recomputation engine and the read-side query layer.

pub mod bucket;
pub mod emerging;
pub mod engine;
pub mod queries;

pub use bucket::{bucketize, Bucketing, BUCKET_KEYWORD_POOL};
pub use emerging::{detect_emerging, label_growth, EmergingConfig};
pub use engine::{scope_name, RefreshOutcome, TrendEngine};
pub use queries::{CatalogQueries, TrendSeries, VenueStats};

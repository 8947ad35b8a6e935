//! papertrail-common — Shared error type, batch reporting, and settings used
//! across all Papertrail crates.

pub mod batch;
pub mod error;
pub mod logging;
pub mod settings;

pub use batch::{BatchError, BatchReport};
pub use error::{PapertrailError, Result};
pub use settings::Settings;

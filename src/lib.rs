// Library interface for bodycomp modules
// The binary and the integration tests both build on it

pub mod classification;
pub mod composition;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ffmi;
pub mod import;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod range;
pub mod reference;
pub mod report;
pub mod segmental;

// Re-export commonly used types for convenience
pub use models::*;
pub use classification::{Classification, ClassificationEngine};
pub use composition::CompositionCalculator;
pub use engine::{compute_view, AnalyzedMeasurement, DerivedView, Engine};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, TomlPreferenceStore};
pub use range::TimeRange;
pub use report::{Assessment, ChangeSummary, CompositionReport};
pub use segmental::{Segment, SegmentalBreakdown, SegmentalEstimator};
pub use error::{BodyCompError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};

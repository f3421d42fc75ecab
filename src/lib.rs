//! Feed-forward classifiers on `ndarray`: a 2-feature / 4-class "simple"
//! model and a 64-feature / 10-class "digits" model, sharing cross-entropy
//! loss, accuracy, arg-max prediction and an Adam optimizer.

pub mod core;
pub mod error;
pub mod metrics;
pub mod models;
pub mod prelude;

// Re-export types
pub use crate::core::{Activation, Adam, Batch, Dense, OptimizerConfig, Preprocessor};
pub use error::{NNError, Result};
pub use metrics::{CsvMetricsWriter, MetricsLog, MetricsSink, TracingSink};
pub use models::{Classifier, ClassifierConfig};

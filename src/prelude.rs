pub use serde::{Deserialize, Serialize};

pub use ndarray::*;
pub use ndarray_rand::rand_distr::Uniform;
pub use ndarray_rand::RandomExt;

pub use crate::error::*;
pub use crate::metrics::{CsvMetricsWriter, MetricsLog, MetricsSink, TracingSink};
pub use crate::models::{
    Classifier, ClassifierConfig, Phase, TestOutput, TrainingLoss, ValidationOutput, Variant,
};

pub use crate::core::losses::{accuracy, argmax_rows, cross_entropy};

// Internal re-exports
pub use crate::core::{
    Activation,
    Adam,
    Batch,
    Dense,
    LayerGradient,
    OptimizerConfig,
    Preprocessor,
};

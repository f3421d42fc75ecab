use crate::core::batch::Batch;
use crate::core::normalization::Normalization;
use crate::prelude::*;

/// Input transform applied by a classifier variant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Preprocessor {
    /// Returns the batch unchanged.
    Identity,
    /// `(x - mean) / std` over the whole feature tensor.
    GlobalStandardize,
    /// Per feature: values with `(x - median) > threshold * median` are
    /// replaced by the median, then each column is standardized.
    MedianClipStandardize { threshold: f64 },
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::MedianClipStandardize { threshold: 4.0 }
    }
}

impl Preprocessor {
    pub fn apply(&self, batch: &Batch) -> Result<Batch> {
        match self {
            Self::Identity => Ok(batch.clone()),
            Self::GlobalStandardize => {
                let mut features = batch.features.clone();
                features.standardize_global();
                Batch::new(features, batch.labels.clone())
            }
            Self::MedianClipStandardize { threshold } => {
                if batch.is_empty() {
                    return Err(NNError::InvalidBatch(
                        "median of an empty batch".to_string(),
                    ));
                }
                let mut features = batch.features.clone();
                features.clip_to_column_median(*threshold);
                features.standardize_columns();
                Batch::new(features, batch.labels.clone())
            }
        }
    }
}

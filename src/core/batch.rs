use crate::prelude::*;

/// Features `(B, d)` paired with one integer label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
}

impl Batch {
    pub fn new(features: Array2<f64>, labels: Array1<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(NNError::InvalidBatch(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Splits a dataset into consecutive batches of at most `batch_size` rows.
    pub fn chunks(
        features: &Array2<f64>,
        labels: &Array1<usize>,
        batch_size: usize,
    ) -> Result<Vec<Batch>> {
        if batch_size == 0 {
            return Err(NNError::InvalidBatch("batch size must be > 0".to_string()));
        }
        if features.nrows() != labels.len() {
            return Err(NNError::InvalidBatch(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(features
            .axis_chunks_iter(Axis(0), batch_size)
            .zip(labels.axis_chunks_iter(Axis(0), batch_size))
            .map(|(x, y)| Batch {
                features: x.to_owned(),
                labels: y.to_owned(),
            })
            .collect())
    }
}

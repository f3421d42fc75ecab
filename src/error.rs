use thiserror::Error;

#[derive(Debug, Error)]
pub enum NNError {
    // Model related errors
    #[error("Invalid layer configuration: {0}")]
    InvalidLayerConfiguration(String),

    // Batch related errors
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    // Metric sinks
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, NNError>;

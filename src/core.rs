// src/core.rs
pub mod activations;
pub mod batch;
pub mod layers;
pub mod losses;
pub mod normalization;
pub mod optimizers;
pub mod preprocess;

// Re-export commonly used items
pub use activations::Activation;
pub use batch::Batch;
pub use layers::{Dense, LayerGradient};
pub use losses::{accuracy, argmax_rows, cross_entropy, softmax_rows};
pub use normalization::Normalization;
pub use optimizers::{Adam, OptimizerConfig};
pub use preprocess::Preprocessor;

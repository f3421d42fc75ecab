#[allow(unused)]
use crate::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Relu,
}

impl Activation {
    pub fn forward(&self, z: Array2<f64>) -> Array2<f64> {
        match self {
            Self::Linear => z,
            Self::Relu => relu_forward(z),
        }
    }

    /// Chain rule through the activation: `da` is the gradient w.r.t. the
    /// activation output, `z` the cached pre-activation.
    pub fn backward(&self, z: &Array2<f64>, da: Array2<f64>) -> Array2<f64> {
        match self {
            Self::Linear => da,
            Self::Relu => da * relu_backward(z),
        }
    }
}

fn relu_forward(z: Array2<f64>) -> Array2<f64> {
    z.mapv(|z| if z > 0.0 { z } else { 0.0 })
}

// zero at the kink
fn relu_backward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|z| if z > 0.0 { 1.0 } else { 0.0 })
}

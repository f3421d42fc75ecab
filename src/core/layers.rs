use crate::core::activations::Activation;
use crate::prelude::*;
use rand::Rng;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Dense {
    pub w: Array2<f64>,
    pub b: Array2<f64>,
    pub activation: Activation,
}

/// Parameter gradients of a single [`Dense`] layer.
#[derive(Debug, Clone)]
pub struct LayerGradient {
    pub dw: Array2<f64>,
    pub db: Array2<f64>,
}

impl Dense {
    /// Weights and biases are drawn from U(-1/sqrt(inputs), 1/sqrt(inputs)).
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if inputs == 0 || outputs == 0 {
            return Err(NNError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        let bound = 1.0 / (inputs as f64).sqrt();
        let dist = Uniform::new(-bound, bound);
        Ok(Self {
            w: Array2::random_using((inputs, outputs), dist, rng),
            b: Array2::random_using((1, outputs), dist, rng),
            activation,
        })
    }

    pub fn typ(&self) -> String {
        "Dense".into()
    }

    pub fn inputs(&self) -> usize {
        self.w.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.w.ncols()
    }

    pub fn param_count(&self) -> usize {
        self.w.len() + self.b.len()
    }

    /// Returns `(z, a)`: the pre-activation and the activation output.
    pub fn forward(&self, a: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        if a.ncols() != self.inputs() {
            return Err(NNError::ShapeMismatch(format!(
                "layer expects {} inputs, got {}",
                self.inputs(),
                a.ncols()
            )));
        }
        let z = a.dot(&self.w) + &self.b;
        let a = self.activation.forward(z.clone());
        Ok((z, a))
    }

    /// Back-propagates `da` (gradient w.r.t. this layer's output).
    /// `a_prev` is the input the layer saw on the forward pass.
    /// Returns the parameter gradients and the gradient w.r.t. `a_prev`.
    pub fn backward(
        &self,
        z: &Array2<f64>,
        a_prev: &Array2<f64>,
        da: Array2<f64>,
    ) -> (LayerGradient, Array2<f64>) {
        let dz = self.activation.backward(z, da);
        let dw = a_prev.t().dot(&dz);
        let db = dz.sum_axis(Axis(0)).insert_axis(Axis(0));
        let da_prev = dz.dot(&self.w.t());
        (LayerGradient { dw, db }, da_prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_width_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = Dense::new(0, 4, Activation::Relu, &mut rng).unwrap_err();
        assert!(matches!(err, NNError::InvalidLayerConfiguration(_)));
    }

    #[test]
    fn init_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Dense::new(16, 8, Activation::Relu, &mut rng).unwrap();
        assert_eq!(layer.w.dim(), (16, 8));
        assert_eq!(layer.b.dim(), (1, 8));
        assert!(layer.w.iter().chain(layer.b.iter()).all(|v| v.abs() <= 0.25));
        assert_eq!(layer.param_count(), 16 * 8 + 8);
    }

    #[test]
    fn forward_rejects_wrong_width() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Dense::new(2, 3, Activation::Linear, &mut rng).unwrap();
        let err = layer.forward(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, NNError::ShapeMismatch(_)));
    }

    #[test]
    fn forward_is_affine() {
        let layer = Dense {
            w: array![[1.0, -1.0], [2.0, 0.5]],
            b: array![[0.5, -3.0]],
            activation: Activation::Relu,
        };
        let (z, a) = layer.forward(&array![[1.0, 2.0]]).unwrap();
        assert_eq!(z, array![[5.5, -3.0]]);
        assert_eq!(a, array![[5.5, 0.0]]);
    }

    #[test]
    fn backward_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Dense::new(3, 5, Activation::Relu, &mut rng).unwrap();
        let x = Array2::from_elem((4, 3), 0.5);
        let (z, _) = layer.forward(&x).unwrap();
        let (grad, da_prev) = layer.backward(&z, &x, Array2::ones((4, 5)));
        assert_eq!(grad.dw.dim(), (3, 5));
        assert_eq!(grad.db.dim(), (1, 5));
        assert_eq!(da_prev.dim(), (4, 3));
    }
}

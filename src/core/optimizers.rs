use crate::core::layers::{Dense, LayerGradient};
use crate::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    /// L2 penalty added to every parameter's gradient before the update.
    pub weight_decay: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.0,
        }
    }
}

impl OptimizerConfig {
    pub fn new(lr: f64, weight_decay: f64) -> Self {
        Self {
            lr,
            weight_decay,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Moments {
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array2<f64>,
    v_b: Array2<f64>,
}

impl Moments {
    fn zeros_like(layer: &Dense) -> Self {
        Self {
            m_w: Array2::zeros(layer.w.raw_dim()),
            v_w: Array2::zeros(layer.w.raw_dim()),
            m_b: Array2::zeros(layer.b.raw_dim()),
            v_b: Array2::zeros(layer.b.raw_dim()),
        }
    }
}

/// Adam with coupled weight decay and bias-corrected moments.
#[derive(Debug, Clone)]
pub struct Adam {
    pub config: OptimizerConfig,
    step: u32,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            step: 0,
            moments: Vec::new(),
        }
    }

    pub fn steps_taken(&self) -> u32 {
        self.step
    }

    /// Applies one update to `layers` from the matching `grads`.
    pub fn step(&mut self, layers: &mut [Dense], grads: &[LayerGradient]) -> Result<()> {
        if layers.len() != grads.len() {
            return Err(NNError::ShapeMismatch(format!(
                "{} gradients for {} layers",
                grads.len(),
                layers.len()
            )));
        }
        for (i, (layer, grad)) in layers.iter().zip(grads).enumerate() {
            if layer.w.dim() != grad.dw.dim() || layer.b.dim() != grad.db.dim() {
                return Err(NNError::ShapeMismatch(format!(
                    "layer {}: parameters {:?}/{:?}, gradients {:?}/{:?}",
                    i,
                    layer.w.dim(),
                    layer.b.dim(),
                    grad.dw.dim(),
                    grad.db.dim()
                )));
            }
        }
        if self.moments.len() != layers.len() {
            self.moments = layers.iter().map(Moments::zeros_like).collect();
        }

        self.step += 1;
        let c = &self.config;
        let t = self.step as i32;
        let bias1 = 1.0 - c.beta1.powi(t);
        let bias2 = 1.0 - c.beta2.powi(t);

        for ((layer, grad), state) in layers.iter_mut().zip(grads).zip(self.moments.iter_mut()) {
            adam_update(&mut layer.w, &grad.dw, &mut state.m_w, &mut state.v_w, c, bias1, bias2);
            adam_update(&mut layer.b, &grad.db, &mut state.m_b, &mut state.v_b, c, bias1, bias2);
        }
        tracing::debug!(step = self.step, lr = c.lr, "adam update applied");
        Ok(())
    }
}

fn adam_update(
    param: &mut Array2<f64>,
    grad: &Array2<f64>,
    m: &mut Array2<f64>,
    v: &mut Array2<f64>,
    c: &OptimizerConfig,
    bias1: f64,
    bias2: f64,
) {
    let g = grad + &(c.weight_decay * &*param);
    *m = c.beta1 * &*m + (1.0 - c.beta1) * &g;
    *v = c.beta2 * &*v + (1.0 - c.beta2) * g.mapv(|x| x * x);
    Zip::from(param).and(&*m).and(&*v).for_each(|p, &m, &v| {
        let m_hat = m / bias1;
        let v_hat = v / bias2;
        *p -= c.lr * m_hat / (v_hat.sqrt() + c.epsilon);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activations::Activation;
    use approx::assert_relative_eq;

    fn layer() -> Dense {
        Dense {
            w: array![[1.0, -2.0]],
            b: array![[0.5, 0.0]],
            activation: Activation::Linear,
        }
    }

    #[test]
    fn first_step_moves_by_lr() {
        // bias correction makes the first step exactly lr * sign(g)
        let mut layers = vec![layer()];
        let grads = vec![LayerGradient {
            dw: array![[0.3, -4.0]],
            db: array![[1.0, 0.0]],
        }];
        let mut adam = Adam::new(OptimizerConfig::new(0.1, 0.0));
        adam.step(&mut layers, &grads).unwrap();
        assert_relative_eq!(layers[0].w[[0, 0]], 0.9, epsilon = 1e-6);
        assert_relative_eq!(layers[0].w[[0, 1]], -1.9, epsilon = 1e-6);
        assert_relative_eq!(layers[0].b[[0, 0]], 0.4, epsilon = 1e-6);
        assert_relative_eq!(layers[0].b[[0, 1]], 0.0, epsilon = 1e-12);
        assert_eq!(adam.steps_taken(), 1);
    }

    #[test]
    fn weight_decay_reaches_biases() {
        let mut layers = vec![layer()];
        let grads = vec![LayerGradient {
            dw: Array2::zeros((1, 2)),
            db: Array2::zeros((1, 2)),
        }];
        let mut adam = Adam::new(OptimizerConfig::new(0.01, 1e-5));
        adam.step(&mut layers, &grads).unwrap();
        assert!(layers[0].b[[0, 0]] < 0.5);
        assert!(layers[0].w[[0, 1]] > -2.0);
        // zero parameter with zero gradient stays put
        assert_eq!(layers[0].b[[0, 1]], 0.0);
    }

    #[test]
    fn mismatched_gradients() {
        let mut layers = vec![layer()];
        let mut adam = Adam::new(OptimizerConfig::default());
        assert!(matches!(
            adam.step(&mut layers, &[]),
            Err(NNError::ShapeMismatch(_))
        ));
        let bad = vec![LayerGradient {
            dw: Array2::zeros((2, 2)),
            db: Array2::zeros((1, 2)),
        }];
        assert!(matches!(
            adam.step(&mut layers, &bad),
            Err(NNError::ShapeMismatch(_))
        ));
        assert_eq!(adam.steps_taken(), 0);
    }
}

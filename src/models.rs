use crate::core::batch::Batch;
use crate::core::layers::{Dense, LayerGradient};
use crate::core::losses::{accuracy, argmax_rows, cross_entropy};
use crate::core::optimizers::{Adam, OptimizerConfig};
use crate::core::preprocess::Preprocessor;
use crate::metrics::MetricsSink;
use crate::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_WEIGHT_DECAY: f64 = 1e-5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// 2 features, 4 classes.
    Simple,
    /// 64 features (8x8 digit images), 10 classes.
    Digits,
    Custom,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub variant: Variant,
    /// Input width, hidden widths, then the number of classes.
    pub layer_sizes: Vec<usize>,
    pub preprocessor: Preprocessor,
    pub lr: f64,
    pub weight_decay: f64,
    pub seed: u64,
}

impl ClassifierConfig {
    pub fn simple(lr: f64) -> Self {
        Self {
            variant: Variant::Simple,
            layer_sizes: vec![2, 32, 64, 4],
            preprocessor: Preprocessor::Identity,
            lr,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            seed: 0,
        }
    }

    pub fn digits(lr: f64) -> Self {
        Self {
            variant: Variant::Digits,
            layer_sizes: vec![64, 512, 128, 64, 10],
            preprocessor: Preprocessor::GlobalStandardize,
            lr,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            seed: 0,
        }
    }

    /// Arbitrary widths with the median-clip preprocessor.
    pub fn custom(layer_sizes: &[usize], lr: f64) -> Self {
        Self {
            variant: Variant::Custom,
            layer_sizes: layer_sizes.to_vec(),
            preprocessor: Preprocessor::default(),
            lr,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn optimizer(&self) -> OptimizerConfig {
        OptimizerConfig::new(self.lr, self.weight_decay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Valid,
    Test,
}

impl Phase {
    pub fn loss_key(&self) -> &'static str {
        match self {
            Phase::Train => "train_loss",
            Phase::Valid => "valid_loss",
            Phase::Test => "test_loss",
        }
    }

    pub fn acc_key(&self) -> &'static str {
        match self {
            Phase::Train => "train_acc",
            Phase::Valid => "valid_acc",
            Phase::Test => "test_acc",
        }
    }
}

/// Training loss for one batch and the gradient of every layer.
#[derive(Debug, Clone)]
pub struct TrainingLoss {
    pub value: f64,
    pub gradients: Vec<LayerGradient>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOutput {
    pub valid_loss: f64,
    pub valid_acc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutput {
    pub test_loss: f64,
    pub test_acc: f64,
}

/// Feed-forward classifier: ReLU after every hidden layer, raw logits out.
#[derive(Debug, Clone)]
pub struct Classifier {
    pub config: ClassifierConfig,
    pub layers: Vec<Dense>,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.layer_sizes.len() < 2 {
            return Err(NNError::InvalidLayerConfiguration(format!(
                "need an input and an output width, got {:?}",
                config.layer_sizes
            )));
        }
        let mut rng = StdRng::seed_from_u64(config.seed);
        let last = config.layer_sizes.len() - 2;
        let layers = config
            .layer_sizes
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let activation = if i == last {
                    Activation::Linear
                } else {
                    Activation::Relu
                };
                Dense::new(w[0], w[1], activation, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            variant = ?config.variant,
            sizes = ?config.layer_sizes,
            seed = config.seed,
            "classifier initialized"
        );
        Ok(Self { config, layers })
    }

    pub fn simple(lr: f64) -> Result<Self> {
        Self::new(ClassifierConfig::simple(lr))
    }

    pub fn digits(lr: f64) -> Result<Self> {
        Self::new(ClassifierConfig::digits(lr))
    }

    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, Dense::inputs)
    }

    pub fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, Dense::outputs)
    }

    pub fn count_parameters(&self) -> usize {
        self.layers.iter().map(Dense::param_count).sum()
    }

    pub fn summary(&self) -> String {
        let mut res = format!("\nModel {:?}\n", self.config.variant);
        res.push_str("-------------------------------------------------------------\n");
        res.push_str("Layer (Type)\t\t Output shape\t\t No.of params\n");
        for layer in self.layers.iter() {
            res.push_str(&format!(
                "{}\t\t\t  (None, {})\t\t  {}\n",
                layer.typ(),
                layer.outputs(),
                layer.param_count()
            ));
        }
        res.push_str("-------------------------------------------------------------\n");
        res.push_str(&format!("Total params: {}\n", self.count_parameters()));
        res
    }

    /// Logits of shape `(B, C)`.
    pub fn forward(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut a = x.clone();
        for layer in self.layers.iter() {
            (_, a) = layer.forward(&a)?;
        }
        Ok(a)
    }

    // pre-activations per layer, and every layer input plus the final output
    fn forward_cached(&self, x: &Array2<f64>) -> Result<(Vec<Array2<f64>>, Vec<Array2<f64>>)> {
        let mut z_cache = Vec::with_capacity(self.layers.len());
        let mut a_cache = Vec::with_capacity(self.layers.len() + 1);
        a_cache.push(x.clone());
        for layer in self.layers.iter() {
            let (z, a) = layer.forward(&a_cache[a_cache.len() - 1])?;
            z_cache.push(z);
            a_cache.push(a);
        }
        Ok((z_cache, a_cache))
    }

    fn backward(
        &self,
        z_cache: &[Array2<f64>],
        a_cache: &[Array2<f64>],
        dlogits: Array2<f64>,
    ) -> Vec<LayerGradient> {
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut da = dlogits;
        for ((layer, z), a_prev) in self.layers.iter().zip(z_cache).zip(a_cache).rev() {
            let (grad, da_prev) = layer.backward(z, a_prev, da);
            grads.push(grad);
            da = da_prev;
        }
        grads.reverse();
        grads
    }

    pub fn transform_input(&self, batch: &Batch) -> Result<Batch> {
        self.config.preprocessor.apply(batch)
    }

    // Steps run the transform for its failure modes only; loss and accuracy
    // are computed on the batch as given.
    fn discard_transform(&self, batch: &Batch) -> Result<()> {
        let _transformed = self.transform_input(batch)?;
        Ok(())
    }

    fn evaluate<S: MetricsSink + ?Sized>(
        &self,
        batch: &Batch,
        phase: Phase,
        sink: &mut S,
    ) -> Result<(f64, f64)> {
        self.discard_transform(batch)?;
        let logits = self.forward(&batch.features)?;
        let acc = accuracy(&logits, &batch.labels)?;
        let (loss, _) = cross_entropy(&logits, &batch.labels)?;
        sink.log(phase.loss_key(), loss);
        sink.log(phase.acc_key(), acc);
        tracing::trace!(?phase, loss, acc, "evaluated batch");
        Ok((loss, acc))
    }

    pub fn training_step<S: MetricsSink + ?Sized>(
        &self,
        batch: &Batch,
        sink: &mut S,
    ) -> Result<TrainingLoss> {
        self.discard_transform(batch)?;
        let (z_cache, a_cache) = self.forward_cached(&batch.features)?;
        let logits = &a_cache[a_cache.len() - 1];
        let acc = accuracy(logits, &batch.labels)?;
        let (loss, dlogits) = cross_entropy(logits, &batch.labels)?;
        let gradients = self.backward(&z_cache, &a_cache[..self.layers.len()], dlogits);

        sink.log(Phase::Train.loss_key(), loss);
        sink.log(Phase::Train.acc_key(), acc);
        tracing::trace!(loss, acc, batch = batch.len(), "training step");
        Ok(TrainingLoss {
            value: loss,
            gradients,
        })
    }

    pub fn validation_step<S: MetricsSink + ?Sized>(
        &self,
        batch: &Batch,
        sink: &mut S,
    ) -> Result<ValidationOutput> {
        let (valid_loss, valid_acc) = self.evaluate(batch, Phase::Valid, sink)?;
        Ok(ValidationOutput {
            valid_loss,
            valid_acc,
        })
    }

    pub fn test_step<S: MetricsSink + ?Sized>(
        &self,
        batch: &Batch,
        sink: &mut S,
    ) -> Result<TestOutput> {
        let (test_loss, test_acc) = self.evaluate(batch, Phase::Test, sink)?;
        Ok(TestOutput {
            test_loss,
            test_acc,
        })
    }

    /// Arg-max class of every row. No preprocessing is applied.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.forward(x)?))
    }

    pub fn configure_optimizers(&self) -> Adam {
        Adam::new(self.config.optimizer())
    }

    /// Applies `optimizer` to this model's parameters.
    pub fn apply_gradients(&mut self, optimizer: &mut Adam, loss: &TrainingLoss) -> Result<()> {
        optimizer.step(&mut self.layers, &loss.gradients)
    }
}

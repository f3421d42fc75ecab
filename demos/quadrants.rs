use ndarray_rand::rand_distr::Normal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rklc::prelude::*;
use tracing_subscriber::EnvFilter;

const EPOCHS: usize = 20;
const BATCH_SIZE: usize = 32;

// Gaussian blobs centred in each quadrant; the label is the quadrant index.
fn quadrant_data(n: usize, rng: &mut StdRng) -> (Array2<f64>, Array1<usize>) {
    let centers = [(2.0, 2.0), (-2.0, 2.0), (-2.0, -2.0), (2.0, -2.0)];
    let mut x = Array2::random_using((n, 2), Normal::new(0.0, 0.8).unwrap(), rng);
    let labels: Array1<usize> = (0..n).map(|_| rng.gen_range(0..4)).collect();
    for (mut row, &label) in x.outer_iter_mut().zip(labels.iter()) {
        row[0] += centers[label].0;
        row[1] += centers[label].1;
    }
    (x, labels)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut rng = StdRng::seed_from_u64(2024);
    let (x_train, y_train) = quadrant_data(512, &mut rng);
    let (x_valid, y_valid) = quadrant_data(128, &mut rng);
    let train = Batch::chunks(&x_train, &y_train, BATCH_SIZE)?;
    let valid = Batch::chunks(&x_valid, &y_valid, BATCH_SIZE)?;

    let mut model = Classifier::new(ClassifierConfig::simple(1e-3).with_seed(7))?;
    tracing::info!("{}", model.summary());
    let mut optimizer = model.configure_optimizers();

    let mut csv = CsvMetricsWriter::create("quadrants_metrics.csv")?;
    let mut log = MetricsLog::new();
    for epoch in 0..EPOCHS {
        log.clear();
        for batch in &train {
            let loss = model.training_step(batch, &mut (&mut log, &mut csv))?;
            model.apply_gradients(&mut optimizer, &loss)?;
        }
        for batch in &valid {
            model.validation_step(batch, &mut (&mut log, &mut csv))?;
        }
        tracing::info!(
            epoch,
            train_loss = log.mean("train_loss"),
            train_acc = log.mean("train_acc"),
            valid_loss = log.mean("valid_loss"),
            valid_acc = log.mean("valid_acc"),
            "epoch done"
        );
    }
    csv.flush()?;

    let test = Batch::new(x_valid, y_valid)?;
    let out = model.test_step(&test, &mut TracingSink)?;
    println!("test loss: {:.4}  test acc: {:.3}", out.test_loss, out.test_acc);

    Ok(())
}

use ndarray::{Array2, ArrayView1, Axis};

/// Statistics used by the preprocessors. Standard deviations are the
/// unbiased (n - 1) estimate and nothing guards against a zero divisor.
pub trait Normalization {
    fn standardize_global(&mut self);
    fn standardize_columns(&mut self);
    fn clip_to_column_median(&mut self, threshold: f64);
}

fn mean_std<'a>(values: impl Iterator<Item = &'a f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Lower median: the `(n - 1) / 2`-th smallest value. `None` when empty.
pub fn lower_median(column: ArrayView1<f64>) -> Option<f64> {
    if column.is_empty() {
        return None;
    }
    let mut sorted = column.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[(sorted.len() - 1) / 2])
}

impl Normalization for Array2<f64> {
    fn standardize_global(&mut self) {
        let (mean, std) = mean_std(self.iter());
        self.mapv_inplace(|v| (v - mean) / std);
    }

    fn standardize_columns(&mut self) {
        for mut col in self.axis_iter_mut(Axis(1)) {
            let (mean, std) = mean_std(col.iter());
            col.mapv_inplace(|v| (v - mean) / std);
        }
    }

    // an element is an outlier when (x - median) > threshold * median
    fn clip_to_column_median(&mut self, threshold: f64) {
        for mut col in self.axis_iter_mut(Axis(1)) {
            let Some(median) = lower_median(col.view()) else {
                continue;
            };
            col.mapv_inplace(|v| {
                if v - median > threshold * median {
                    median
                } else {
                    v
                }
            });
        }
    }
}

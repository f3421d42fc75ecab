use crate::prelude::*;

fn check_targets(logits: &Array2<f64>, labels: &Array1<usize>) -> Result<()> {
    if logits.nrows() != labels.len() {
        return Err(NNError::InvalidBatch(format!(
            "{} logit rows for {} labels",
            logits.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(NNError::InvalidBatch("batch is empty".to_string()));
    }
    let classes = logits.ncols();
    if let Some(bad) = labels.iter().find(|&&y| y >= classes) {
        return Err(NNError::InvalidBatch(format!(
            "label {} outside [0, {})",
            bad, classes
        )));
    }
    Ok(())
}

/// Index of the largest value in each row; ties go to the lowest index.
/// A NaN counts as the maximum, so the first NaN in a row wins.
pub fn argmax_rows(logits: &Array2<f64>) -> Array1<usize> {
    logits
        .outer_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if row[best].is_nan() {
                    break;
                }
                if v.is_nan() || v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

pub fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut out = logits.clone();
    for mut row in out.outer_iter_mut() {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Mean categorical cross-entropy of `logits` against integer `labels`.
///
/// Returns the loss together with its gradient w.r.t. the logits,
/// `(softmax - onehot) / B`.
pub fn cross_entropy(
    logits: &Array2<f64>,
    labels: &Array1<usize>,
) -> Result<(f64, Array2<f64>)> {
    check_targets(logits, labels)?;
    let n = labels.len() as f64;

    let mut loss = 0.0;
    for (row, &y) in logits.outer_iter().zip(labels.iter()) {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let lse = max + row.mapv(|v| (v - max).exp()).sum().ln();
        loss += lse - row[y];
    }

    let mut grad = softmax_rows(logits);
    for (mut row, &y) in grad.outer_iter_mut().zip(labels.iter()) {
        row[y] -= 1.0;
    }
    grad.mapv_inplace(|g| g / n);

    Ok((loss / n, grad))
}

/// Fraction of rows whose arg-max equals the label.
pub fn accuracy(logits: &Array2<f64>, labels: &Array1<usize>) -> Result<f64> {
    if logits.nrows() != labels.len() {
        return Err(NNError::InvalidBatch(format!(
            "{} logit rows for {} labels",
            logits.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(NNError::InvalidBatch(
            "accuracy of an empty batch".to_string(),
        ));
    }
    let correct = argmax_rows(logits)
        .iter()
        .zip(labels.iter())
        .filter(|(p, y)| p == y)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

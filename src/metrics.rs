//! Destinations for the per-step scalars reported by the classifier.
//!
//! Every step calls [`MetricsSink::log`] twice, once for the loss and once
//! for the accuracy, with the name prefixed by its phase (`train_`,
//! `valid_` or `test_`).

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::error::Result;

pub trait MetricsSink {
    fn log(&mut self, name: &str, value: f64);
}

/// Discards everything.
impl MetricsSink for () {
    fn log(&mut self, _name: &str, _value: f64) {}
}

impl<S: MetricsSink + ?Sized> MetricsSink for &mut S {
    fn log(&mut self, name: &str, value: f64) {
        (**self).log(name, value);
    }
}

/// Fans every value out to both sinks.
impl<A: MetricsSink, B: MetricsSink> MetricsSink for (A, B) {
    fn log(&mut self, name: &str, value: f64) {
        self.0.log(name, value);
        self.1.log(name, value);
    }
}

/// In-memory history of every logged value, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsLog {
    values: BTreeMap<String, Vec<f64>>,
}

impl MetricsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self, name: &str) -> &[f64] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last(&self, name: &str) -> Option<f64> {
        self.history(name).last().copied()
    }

    /// Mean over everything logged under `name`, `None` if nothing was.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let h = self.history(name);
        if h.is_empty() {
            None
        } else {
            Some(h.iter().sum::<f64>() / h.len() as f64)
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl MetricsSink for MetricsLog {
    fn log(&mut self, name: &str, value: f64) {
        self.values.entry(name.to_string()).or_default().push(value);
    }
}

#[derive(Serialize)]
struct MetricRecord<'a> {
    step: u64,
    name: &'a str,
    value: f64,
}

/// Writes one `step,name,value` row per logged value.
///
/// `step` counts calls to [`MetricsSink::log`]. Write failures are kept
/// and surfaced by the next [`CsvMetricsWriter::flush`].
pub struct CsvMetricsWriter<W: Write> {
    writer: csv::Writer<W>,
    step: u64,
    error: Option<csv::Error>,
}

impl CsvMetricsWriter<std::fs::File> {
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::File::create(path)?))
    }
}

impl<W: Write> CsvMetricsWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            step: 0,
            error: None,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| crate::error::NNError::IoError(e.into_error()))
    }
}

impl<W: Write> MetricsSink for CsvMetricsWriter<W> {
    fn log(&mut self, name: &str, value: f64) {
        let record = MetricRecord {
            step: self.step,
            name,
            value,
        };
        self.step += 1;
        if let Err(err) = self.writer.serialize(record) {
            tracing::warn!(metric = name, error = %err, "failed to write metric");
            self.error.get_or_insert(err);
        }
    }
}

/// Emits each metric as a `tracing` info event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn log(&mut self, name: &str, value: f64) {
        tracing::info!(metric = name, value, "metric");
    }
}

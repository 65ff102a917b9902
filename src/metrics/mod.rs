//! Scalar metric logging
//!
//! Append-only time-series sink for training observability: the trainer
//! writes `Loss/train` per step and `Accuracy/train` / `Accuracy/validation`
//! per epoch. Logging is observational only and never affects control flow.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// One logged scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    /// Series name, e.g. "Loss/train"
    pub series: String,
    /// Step or epoch index within the series
    pub step: usize,
    /// Recorded value
    pub value: f32,
}

/// Append-only sink for named scalar time series
pub trait MetricSink {
    /// Append one scalar keyed by (series, step)
    fn log_scalar(&mut self, series: &str, step: usize, value: f32) -> Result<()>;
}

/// JSON-lines file sink, one record per line
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Open (or create) an append-mode log file, creating parent directories
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl MetricSink for JsonlSink {
    fn log_scalar(&mut self, series: &str, step: usize, value: f32) -> Result<()> {
        let record = ScalarRecord {
            series: series.to_string(),
            step,
            value,
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| crate::Error::Serialization(format!("metric record failed: {e}")))?;
        writeln!(self.file, "{line}")?;
        Ok(())
    }
}

/// In-memory sink retaining records in append order (test backend)
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ScalarRecord>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in append order
    pub fn records(&self) -> &[ScalarRecord] {
        &self.records
    }

    /// Values of one series, in append order
    pub fn series(&self, name: &str) -> Vec<(usize, f32)> {
        self.records
            .iter()
            .filter(|r| r.series == name)
            .map(|r| (r.step, r.value))
            .collect()
    }
}

impl MetricSink for MemorySink {
    fn log_scalar(&mut self, series: &str, step: usize, value: f32) -> Result<()> {
        self.records.push(ScalarRecord {
            series: series.to_string(),
            step,
            value,
        });
        Ok(())
    }
}

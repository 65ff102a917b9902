//! Datasets, batching, and the FFHQ split loader

pub mod ffhq;
mod loader;

pub use loader::{Batch, DataLoader};

use crate::error::{Error, Result};

/// One labeled example: flattened image pixels plus an integer class label
#[derive(Debug, Clone)]
pub struct Example {
    /// Flattened image data, row-major
    pub pixels: Vec<f32>,
    /// Class index in `0..num_classes`
    pub label: usize,
}

/// An ordered, immutable collection of labeled examples
///
/// Splits are constructed once from external data and never mutated; the
/// three splits of a run (train/validation/test) are disjoint by
/// construction in the manifest.
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<Example>,
    num_classes: usize,
    feature_len: usize,
}

impl Dataset {
    /// Build a dataset, validating label range and feature-length consistency
    pub fn from_examples(examples: Vec<Example>, num_classes: usize) -> Result<Self> {
        if num_classes < 2 {
            return Err(Error::Config(format!(
                "a classification dataset needs at least 2 classes, got {num_classes}"
            )));
        }

        let feature_len = examples.first().map_or(0, |e| e.pixels.len());
        for (i, example) in examples.iter().enumerate() {
            if example.pixels.len() != feature_len {
                return Err(Error::Config(format!(
                    "example {i} has {} features, expected {feature_len}",
                    example.pixels.len()
                )));
            }
            if example.label >= num_classes {
                return Err(Error::Config(format!(
                    "example {i} has label {} outside 0..{num_classes}",
                    example.label
                )));
            }
        }

        Ok(Self {
            examples,
            num_classes,
            feature_len,
        })
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the split holds no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Example at `index`
    pub fn get(&self, index: usize) -> &Example {
        &self.examples[index]
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Flattened feature length per example
    pub fn feature_len(&self) -> usize {
        self.feature_len
    }
}

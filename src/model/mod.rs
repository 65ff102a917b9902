//! Classifier model and pretrained-model registry

mod classifier;
pub mod registry;

pub use classifier::{ImageClassifier, Mode};

//! FFHQ-Aging split loader
//!
//! Reads an `index.json` manifest at the dataset root. The manifest names
//! the label categories (each an ordered list of class names) and one entry
//! per example carrying its split, its per-category integer labels, and the
//! relative path of its raw image file (little-endian f32 pixels). The
//! train/valid/test splits are disjoint because every example belongs to
//! exactly one split.

use super::{Dataset, Example};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Manifest file name expected at the dataset root
pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    dataset: String,
    label_categories: HashMap<String, Vec<String>>,
    examples: Vec<ManifestExample>,
}

#[derive(Debug, Deserialize)]
struct ManifestExample {
    image: String,
    split: Split,
    labels: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Split {
    Train,
    Valid,
    Test,
}

/// Load the train, validation, and test splits for one label category
pub fn load_splits(root: &Path, category: &str) -> Result<(Dataset, Dataset, Dataset)> {
    let index_path = root.join(INDEX_FILE);
    let content = fs::read_to_string(&index_path)?;
    let manifest: Manifest = serde_json::from_str(&content)
        .map_err(|e| Error::Serialization(format!("manifest parsing failed: {e}")))?;

    let classes = manifest.label_categories.get(category).ok_or_else(|| {
        Error::Config(format!(
            "label category '{category}' not present in dataset '{}'",
            manifest.dataset
        ))
    })?;
    let num_classes = classes.len();

    let mut train = Vec::new();
    let mut valid = Vec::new();
    let mut test = Vec::new();

    for entry in &manifest.examples {
        let label = *entry.labels.get(category).ok_or_else(|| {
            Error::Config(format!(
                "example '{}' carries no '{category}' label",
                entry.image
            ))
        })?;
        let pixels = read_image(&root.join(&entry.image))?;
        let example = Example { pixels, label };

        match entry.split {
            Split::Train => train.push(example),
            Split::Valid => valid.push(example),
            Split::Test => test.push(example),
        }
    }

    Ok((
        Dataset::from_examples(train, num_classes)?,
        Dataset::from_examples(valid, num_classes)?,
        Dataset::from_examples(test, num_classes)?,
    ))
}

/// Read a raw little-endian f32 image file
fn read_image(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(Error::Serialization(format!(
            "image file {} is not a whole number of f32 values",
            path.display()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

//! Top-1 accuracy over a data loader

use crate::data::DataLoader;
use crate::error::{Error, Result};
use crate::model::ImageClassifier;

/// Fraction of examples whose argmax prediction matches the label
///
/// Runs every batch of the loader through the model's inference path; no
/// parameters are updated and no gradients are tracked. Deterministic for a
/// fixed model and loader order, and always in [0, 1]. An empty loader is a
/// configuration error, rejected before any division.
pub fn evaluate(model: &mut ImageClassifier, loader: &mut DataLoader) -> Result<f32> {
    if loader.num_examples() == 0 {
        return Err(Error::EmptySplit(
            "evaluation split yields zero examples".to_string(),
        ));
    }

    let num_classes = model.num_classes();
    let mut correct = 0usize;
    let mut total = 0usize;

    loader.reset();
    while let Some(batch) = loader.next_batch() {
        let logits = model.forward(&batch.inputs, batch.size());
        let data = logits.data();

        for (b, &target) in batch.targets.iter().enumerate() {
            let row = &data.as_slice().unwrap()[b * num_classes..(b + 1) * num_classes];
            let predicted = argmax(row);
            if predicted == target {
                correct += 1;
            }
        }
        total += batch.size();
    }

    Ok(correct as f32 / total as f32)
}

/// Index of the largest value; first index wins ties
fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

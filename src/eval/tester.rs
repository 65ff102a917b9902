//! Seeded held-out test evaluation

use super::evaluate;
use crate::data::{DataLoader, Dataset};
use crate::error::Result;
use crate::model::{ImageClassifier, Mode};
use crate::seed::RunSeeds;
use std::collections::HashMap;

/// Metric name the test accuracy is reported under
pub const ACCURACY_KEY: &str = "accuracy";

/// Result record of a held-out evaluation: metric name -> scalar score
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    /// Named scalar results
    pub metrics: HashMap<String, f32>,
}

impl TestReport {
    /// The test accuracy
    pub fn accuracy(&self) -> f32 {
        self.metrics[ACCURACY_KEY]
    }
}

/// Evaluate the model once on the held-out test split
///
/// Re-derives every random stream from `seed` so test-time shuffling and
/// any stochastic layers are independent of how much training preceded the
/// call. The model runs in inference mode and is restored to training mode
/// before returning.
pub fn test_model(
    model: &mut ImageClassifier,
    batch_size: usize,
    seed: u64,
    test_split: &Dataset,
) -> Result<TestReport> {
    let seeds = RunSeeds::derive(seed);
    model.reseed_dropout(seeds.dropout_rng());
    model.set_mode(Mode::Eval);

    let mut loader = DataLoader::shuffled(test_split, batch_size, &mut seeds.shuffle_rng())?;
    let accuracy = evaluate(model, &mut loader)?;

    println!("Test accuracy: {accuracy:.4}");

    let mut metrics = HashMap::new();
    metrics.insert(ACCURACY_KEY.to_string(), accuracy);

    model.set_mode(Mode::Train);
    Ok(TestReport { metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Example;
    use crate::model::registry;

    fn split(n: usize) -> Dataset {
        let examples = (0..n)
            .map(|i| Example {
                pixels: vec![i as f32 * 0.1; 4],
                label: i % 2,
            })
            .collect();
        Dataset::from_examples(examples, 2).unwrap()
    }

    #[test]
    fn test_report_has_fixed_accuracy_key() {
        let mut model = registry::fetch("tinynet", "0.1.0").unwrap();
        let report = test_model(&mut model, 4, 42, &split(6)).unwrap();

        assert_eq!(report.metrics.len(), 1);
        assert!(report.metrics.contains_key(ACCURACY_KEY));
        let acc = report.accuracy();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn test_model_restored_to_train_mode() {
        let mut model = registry::fetch("tinynet", "0.1.0").unwrap();
        model.set_mode(Mode::Eval);
        test_model(&mut model, 4, 42, &split(4)).unwrap();
        assert_eq!(model.mode(), Mode::Train);
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut model = registry::fetch("tinynet", "0.1.0").unwrap();
        let a = test_model(&mut model, 2, 7, &split(8)).unwrap();
        let b = test_model(&mut model, 2, 7, &split(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_test_split_rejected() {
        let mut model = registry::fetch("tinynet", "0.1.0").unwrap();
        let empty = Dataset::from_examples(vec![], 2).unwrap();
        assert!(test_model(&mut model, 4, 42, &empty).is_err());
    }
}

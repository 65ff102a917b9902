//! Deterministic mini-batch loader

use super::Dataset;
use crate::autograd::Tensor;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A mini-batch: flattened inputs plus integer targets
pub struct Batch {
    /// Flattened inputs, row-major (batch x feature_len)
    pub inputs: Tensor,
    /// One class index per example
    pub targets: Vec<usize>,
}

impl Batch {
    /// Number of examples in the batch
    pub fn size(&self) -> usize {
        self.targets.len()
    }
}

/// Yields fixed-size batches over a dataset in a deterministic order
///
/// The order is fixed at construction: sequential, or shuffled once from a
/// caller-supplied seeded RNG. Iteration is restartable via [`reset`], and
/// repeated passes visit the same order, which keeps evaluation
/// deterministic. The final batch may be short.
///
/// [`reset`]: DataLoader::reset
pub struct DataLoader<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    order: Vec<usize>,
    cursor: usize,
}

impl<'a> DataLoader<'a> {
    /// Loader visiting examples in dataset order
    pub fn sequential(dataset: &'a Dataset, batch_size: usize) -> Result<Self> {
        Self::with_order(dataset, batch_size, (0..dataset.len()).collect())
    }

    /// Loader visiting examples in an order shuffled from `rng`
    pub fn shuffled(dataset: &'a Dataset, batch_size: usize, rng: &mut StdRng) -> Result<Self> {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(rng);
        Self::with_order(dataset, batch_size, order)
    }

    fn with_order(dataset: &'a Dataset, batch_size: usize, order: Vec<usize>) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        Ok(Self {
            dataset,
            batch_size,
            order,
            cursor: 0,
        })
    }

    /// Total number of examples the loader yields per pass
    pub fn num_examples(&self) -> usize {
        self.order.len()
    }

    /// Number of batches per pass (last one may be short)
    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }

    /// Restart iteration from the first batch, same order
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Next batch, or `None` at the end of the pass
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;

        let feature_len = self.dataset.feature_len();
        let mut inputs = Vec::with_capacity(indices.len() * feature_len);
        let mut targets = Vec::with_capacity(indices.len());
        for &i in indices {
            let example = self.dataset.get(i);
            inputs.extend_from_slice(&example.pixels);
            targets.push(example.label);
        }

        Some(Batch {
            inputs: Tensor::from_vec(inputs, false),
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Example;
    use rand::SeedableRng;

    fn dataset(n: usize) -> Dataset {
        let examples = (0..n)
            .map(|i| Example {
                pixels: vec![i as f32, -(i as f32)],
                label: i % 2,
            })
            .collect();
        Dataset::from_examples(examples, 2).unwrap()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let ds = dataset(4);
        assert!(DataLoader::sequential(&ds, 0).is_err());
    }

    #[test]
    fn test_sequential_batching_with_short_tail() {
        let ds = dataset(5);
        let mut loader = DataLoader::sequential(&ds, 2).unwrap();
        assert_eq!(loader.num_batches(), 3);

        let sizes: Vec<usize> = std::iter::from_fn(|| loader.next_batch())
            .map(|b| b.size())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_reset_replays_same_order() {
        let ds = dataset(6);
        let mut rng = StdRng::seed_from_u64(3);
        let mut loader = DataLoader::shuffled(&ds, 4, &mut rng).unwrap();

        let first: Vec<Vec<usize>> =
            std::iter::from_fn(|| loader.next_batch()).map(|b| b.targets).collect();
        loader.reset();
        let second: Vec<Vec<usize>> =
            std::iter::from_fn(|| loader.next_batch()).map(|b| b.targets).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffled_order_deterministic_given_seed() {
        let ds = dataset(8);
        let order = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut loader = DataLoader::shuffled(&ds, 8, &mut rng).unwrap();
            loader.next_batch().unwrap().inputs.to_vec()
        };
        assert_eq!(order(7), order(7));
        assert_ne!(order(7), order(8));
    }

    #[test]
    fn test_batch_inputs_are_flattened_row_major() {
        let ds = dataset(2);
        let mut loader = DataLoader::sequential(&ds, 2).unwrap();
        let batch = loader.next_batch().unwrap();
        assert_eq!(batch.inputs.to_vec(), vec![0.0, 0.0, 1.0, -1.0]);
        assert_eq!(batch.targets, vec![0, 1]);
    }

    #[test]
    fn test_empty_dataset_yields_no_batches() {
        let ds = Dataset::from_examples(vec![], 2).unwrap();
        let mut loader = DataLoader::sequential(&ds, 4).unwrap();
        assert_eq!(loader.num_examples(), 0);
        assert!(loader.next_batch().is_none());
    }
}

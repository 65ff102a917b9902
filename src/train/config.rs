//! Training configuration

use std::path::PathBuf;

/// Hyperparameters and run settings for the trainer
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Optimizer learning rate (fixed; no schedule is applied)
    pub lr: f32,
    /// Mini-batch size
    pub batch_size: usize,
    /// Number of epochs, must be at least 1
    pub epochs: usize,
    /// Master seed for every random stream of the run
    pub seed: u64,
    /// Checkpoint file name for the best model on validation
    pub checkpoint_name: String,
    /// Directory checkpoints are stored under
    pub checkpoint_dir: PathBuf,
    /// Print running loss every N batches, must be at least 1
    pub log_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lr: 0.01,
            batch_size: 128,
            epochs: 50,
            seed: 42,
            checkpoint_name: "FFHQ-Gender.json".to_string(),
            checkpoint_dir: PathBuf::from(crate::checkpoint::CHECKPOINT_DIR),
            log_interval: 100,
        }
    }
}

impl TrainConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the learning rate
    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the run seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the checkpoint file name
    pub fn with_checkpoint_name(mut self, name: impl Into<String>) -> Self {
        self.checkpoint_name = name.into();
        self
    }

    /// Set the checkpoint directory
    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    /// Set the progress-print interval
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }
}

//! Training loop: configuration, loss, model selection, and the epoch driver

mod best;
mod config;
mod loss;
mod trainer;

pub use best::BestTracker;
pub use config::TrainConfig;
pub use loss::CrossEntropyLoss;
pub use trainer::{train_model, TrainReport};

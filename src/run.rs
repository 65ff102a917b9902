//! Command-line surface and entry-point wiring

use crate::checkpoint;
use crate::data::{ffhq, Dataset};
use crate::error::{Error, Result};
use crate::eval::{test_model, TestReport};
use crate::metrics::JsonlSink;
use crate::model::{registry, ImageClassifier};
use crate::train::{train_model, TrainConfig};
use clap::Parser;
use std::path::PathBuf;

/// Backbone pulled from the registry, mirroring the published
/// pytorch/vision mobilenet_v2 the pipeline was tuned against
const BACKBONE_NAME: &str = "mobilenet_v2";
const BACKBONE_VERSION: &str = "0.10.0";

/// Train a face-attribute classifier and evaluate it on the held-out test split
#[derive(Debug, Parser)]
#[command(name = "clasificar", version)]
pub struct Cli {
    /// Dataset to train on
    #[arg(long, default_value = "FFHQ-Aging")]
    pub dataset: String,

    /// Label category to train on
    #[arg(long, default_value = "gender")]
    pub labels: String,

    /// Learning rate to use
    #[arg(long, default_value_t = 0.01)]
    pub lr: f32,

    /// Minibatch size
    #[arg(long = "batch_size", default_value_t = 128)]
    pub batch_size: usize,

    /// Max number of epochs
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Seed to use for reproducing results
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Name of the model checkpoint
    #[arg(long = "checkpoint_name", default_value = "FFHQ-Gender.json")]
    pub checkpoint_name: String,

    /// Dataset root directory (holds index.json and the image files)
    #[arg(long = "data_dir", default_value = "data/ffhq-aging")]
    pub data_dir: PathBuf,

    /// Directory metric logs are appended under
    #[arg(long = "log_dir", default_value = "metric_logs")]
    pub log_dir: PathBuf,
}

/// Full pipeline: load splits, fetch the backbone, train or load, then test
///
/// Training only happens when no checkpoint of the configured name exists;
/// otherwise the stored parameters are loaded. Either way the run finishes
/// with one seeded evaluation of the test split.
pub fn run(args: &Cli) -> Result<TestReport> {
    let (train_split, valid_split, test_split) = load_dataset(args)?;

    let mut model = registry::fetch(BACKBONE_NAME, BACKBONE_VERSION)?;
    if model.in_features() != train_split.feature_len() {
        return Err(Error::Config(format!(
            "dataset examples carry {} features but the backbone expects {}",
            train_split.feature_len(),
            model.in_features()
        )));
    }

    if checkpoint::exists(&args.checkpoint_name) {
        checkpoint::load(&mut model, &args.checkpoint_name)?;
    } else {
        train(args, &mut model, &train_split, &valid_split)?;
    }

    test_model(&mut model, args.batch_size, args.seed, &test_split)
}

fn load_dataset(args: &Cli) -> Result<(Dataset, Dataset, Dataset)> {
    match args.dataset.as_str() {
        "FFHQ-Aging" => ffhq::load_splits(&args.data_dir, &args.labels),
        other => Err(Error::UnsupportedDataset(other.to_string())),
    }
}

fn train(
    args: &Cli,
    model: &mut ImageClassifier,
    train_split: &Dataset,
    valid_split: &Dataset,
) -> Result<()> {
    let cfg = TrainConfig::new()
        .with_lr(args.lr)
        .with_batch_size(args.batch_size)
        .with_epochs(args.epochs)
        .with_seed(args.seed)
        .with_checkpoint_name(&args.checkpoint_name);

    let mut sink = JsonlSink::create(&args.log_dir.join("run.jsonl"))?;
    let report = train_model(model, &cfg, train_split, valid_split, &mut sink)?;
    println!(
        "Training finished: {} epochs, best validation accuracy {:.4}, {} checkpoint save(s), {:.1}s",
        report.epochs,
        report.best_validation_accuracy,
        report.checkpoints_saved,
        report.elapsed_secs
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("clasificar").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        let args = cli(&[]);
        assert_eq!(args.dataset, "FFHQ-Aging");
        assert_eq!(args.labels, "gender");
        assert_eq!(args.lr, 0.01);
        assert_eq!(args.batch_size, 128);
        assert_eq!(args.epochs, 50);
        assert_eq!(args.seed, 42);
        assert_eq!(args.checkpoint_name, "FFHQ-Gender.json");
    }

    #[test]
    fn test_cli_overrides_use_underscore_flags() {
        let args = cli(&[
            "--dataset",
            "FFHQ-Aging",
            "--batch_size",
            "4",
            "--checkpoint_name",
            "tiny.json",
            "--lr",
            "0.1",
            "--epochs",
            "3",
        ]);
        assert_eq!(args.batch_size, 4);
        assert_eq!(args.checkpoint_name, "tiny.json");
        assert_eq!(args.lr, 0.1);
        assert_eq!(args.epochs, 3);
    }

    #[test]
    fn test_unsupported_dataset_fails_fast() {
        let args = cli(&["--dataset", "CIFAR-10"]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDataset(_)));
    }
}

//! Epoch-level training driver

use super::{BestTracker, CrossEntropyLoss, TrainConfig};
use crate::checkpoint;
use crate::data::{DataLoader, Dataset};
use crate::error::{Error, Result};
use crate::eval::evaluate;
use crate::metrics::MetricSink;
use crate::model::{ImageClassifier, Mode};
use crate::optim::{Adam, Optimizer};
use crate::seed::RunSeeds;
use std::io::Write;
use std::time::Instant;

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Epochs completed
    pub epochs: usize,
    /// Average training loss of the final epoch
    pub final_train_loss: f32,
    /// Best validation accuracy observed
    pub best_validation_accuracy: f32,
    /// Number of best-checkpoint saves
    pub checkpoints_saved: usize,
    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,
}

/// Train the model, keeping the checkpoint that performed best on validation
///
/// Runs `cfg.epochs` passes over the training split with Adam at a fixed
/// learning rate; no schedule is applied. Each epoch ends with a train-
/// and validation-split evaluation in
/// inference mode; a strictly improved validation accuracy persists a
/// checkpoint. After the final epoch the best checkpoint is reloaded into
/// the model. If no epoch ever improved on 0.0 the reload is skipped with a
/// warning and the in-memory end-of-training model is kept.
///
/// Per-batch loss is logged to `sink` as `Loss/train` keyed by global step;
/// per-epoch accuracies as `Accuracy/train` and `Accuracy/validation` keyed
/// by epoch.
///
/// Every random stream of the run is derived from `cfg.seed`: the batch
/// shuffling order and the model's dropout stream, which is reseeded here
/// before the first epoch.
pub fn train_model(
    model: &mut ImageClassifier,
    cfg: &TrainConfig,
    train_split: &Dataset,
    val_split: &Dataset,
    sink: &mut dyn MetricSink,
) -> Result<TrainReport> {
    if cfg.epochs == 0 {
        return Err(Error::Config(
            "training requires at least 1 epoch".to_string(),
        ));
    }
    if cfg.log_interval == 0 {
        return Err(Error::Config(
            "log_interval must be at least 1".to_string(),
        ));
    }

    let start = Instant::now();
    let seeds = RunSeeds::derive(cfg.seed);
    model.reseed_dropout(seeds.dropout_rng());

    let mut train_loader =
        DataLoader::shuffled(train_split, cfg.batch_size, &mut seeds.shuffle_rng())?;
    let mut val_loader = DataLoader::sequential(val_split, cfg.batch_size)?;

    let mut optimizer = Adam::default_params(cfg.lr);
    let loss_fn = CrossEntropyLoss;
    let mut best = BestTracker::new();
    let num_classes = model.num_classes();
    let steps_per_epoch = train_loader.num_batches();
    let mut final_train_loss = 0.0;

    for epoch in 0..cfg.epochs {
        model.set_mode(Mode::Train);
        train_loader.reset();

        let mut epoch_losses: Vec<f32> = Vec::with_capacity(steps_per_epoch);
        let mut step = 0;
        while let Some(batch) = train_loader.next_batch() {
            let logits = model.forward(&batch.inputs, batch.size());
            let loss = loss_fn.forward(&logits, &batch.targets, num_classes);
            let loss_val = loss.data()[0];
            epoch_losses.push(loss_val);

            sink.log_scalar("Loss/train", epoch * steps_per_epoch + step, loss_val)?;

            if step % cfg.log_interval == 0 || step + 1 == steps_per_epoch {
                let running = epoch_losses.iter().sum::<f32>() / epoch_losses.len() as f32;
                print!(
                    "\rEpoch {epoch}: batch {}/{steps_per_epoch}, running loss: {running:.4}",
                    step + 1
                );
                std::io::stdout().flush().ok();
            }

            optimizer.zero_grad_refs(&mut model.parameters_mut());
            if let Some(op) = loss.backward_op() {
                op.backward();
            }
            optimizer.step_refs(&mut model.parameters_mut());

            step += 1;
        }

        final_train_loss = if epoch_losses.is_empty() {
            0.0
        } else {
            epoch_losses.iter().sum::<f32>() / epoch_losses.len() as f32
        };

        // Per-epoch accuracy on both splits, in inference mode
        model.set_mode(Mode::Eval);
        let train_accuracy = evaluate(model, &mut train_loader)?;
        let val_accuracy = evaluate(model, &mut val_loader)?;
        println!(", train accuracy: {train_accuracy:.4}, validation accuracy: {val_accuracy:.4}");

        if best.observe(val_accuracy) {
            checkpoint::save_in(model, &cfg.checkpoint_name, &cfg.checkpoint_dir)?;
        }

        sink.log_scalar("Accuracy/train", epoch, train_accuracy)?;
        sink.log_scalar("Accuracy/validation", epoch, val_accuracy)?;

        model.set_mode(Mode::Train);
    }

    if best.improvements() > 0 {
        checkpoint::load_in(model, &cfg.checkpoint_name, &cfg.checkpoint_dir)?;
    } else {
        eprintln!(
            "warning: validation accuracy never improved on 0.0; no checkpoint was saved, \
             keeping the end-of-training weights"
        );
    }

    Ok(TrainReport {
        epochs: cfg.epochs,
        final_train_loss,
        best_validation_accuracy: best.best(),
        checkpoints_saved: best.improvements(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

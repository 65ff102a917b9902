//! Face-attribute classifier training and evaluation
//!
//! Trains a gender classifier over FFHQ-Aging face images with a pretrained
//! backbone, keeping the checkpoint that performs best on validation, and
//! evaluates it reproducibly on the held-out test split.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use clasificar::{run, Cli};
//!
//! let args = Cli::parse_from(["clasificar", "--epochs", "3", "--batch_size", "4"]);
//! let report = run(&args).expect("run failed");
//! println!("test accuracy: {:.4}", report.accuracy());
//! ```

pub mod autograd;
pub mod checkpoint;
pub mod data;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod model;
pub mod optim;
pub mod run;
pub mod seed;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
pub use run::{run, Cli};

//! clasificar CLI
//!
//! Single-command entry point: trains the classifier when no checkpoint of
//! the configured name exists, loads it otherwise, and always finishes with
//! a seeded evaluation of the held-out test split.
//!
//! # Usage
//!
//! ```bash
//! # Train with defaults and evaluate
//! clasificar
//!
//! # Short reproducibility run
//! clasificar --epochs 3 --batch_size 4 --seed 42
//!
//! # Re-evaluate an existing checkpoint
//! clasificar --checkpoint_name FFHQ-Gender.json
//! ```

use clap::Parser;
use clasificar::{run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            for (name, value) in &report.metrics {
                println!("{name}: {value:.4}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

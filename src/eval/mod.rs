//! Evaluation: accuracy over a loader, and the seeded held-out test

mod evaluate;
mod tester;

pub use evaluate::evaluate;
pub use tester::{test_model, TestReport};

//! Cross-entropy loss over integer class labels

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Mean cross-entropy between class-score logits and integer labels
///
/// L = -(1/B) * Σ_b ln(softmax(logits_b)[target_b])
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Numerically stable softmax over one row of logits
    pub(crate) fn softmax(row: &[f32]) -> Vec<f32> {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
        let sum: f32 = exp.iter().sum();
        exp.into_iter().map(|v| v / sum).collect()
    }

    /// Compute the batch loss
    ///
    /// `logits` is (batch x num_classes) row-major; `targets` holds one
    /// class index per row. The backward op sets the analytic gradient
    /// d(CE)/d(logits) = (softmax - onehot) / batch and chains into the
    /// logits' producer.
    pub fn forward(&self, logits: &Tensor, targets: &[usize], num_classes: usize) -> Tensor {
        let batch = targets.len();
        assert!(batch > 0, "cross-entropy needs at least one example");
        assert_eq!(
            logits.len(),
            batch * num_classes,
            "logits length must be batch * num_classes"
        );

        let data = logits.data().as_slice().unwrap();
        let mut total = 0.0f32;
        let mut grad = vec![0.0f32; logits.len()];

        for (b, &target) in targets.iter().enumerate() {
            debug_assert!(target < num_classes);
            let row = &data[b * num_classes..(b + 1) * num_classes];
            let probs = Self::softmax(row);

            total -= (probs[target] + 1e-10).max(f32::MIN_POSITIVE).ln();

            for (c, &p) in probs.iter().enumerate() {
                let onehot = if c == target { 1.0 } else { 0.0 };
                grad[b * num_classes + c] = (p - onehot) / batch as f32;
            }
        }

        let mut loss = Tensor::from_vec(vec![total / batch as f32], true);

        if logits.requires_grad() {
            loss.set_backward_op(Rc::new(CrossEntropyBackward {
                logits: logits.clone(),
                logits_grad: logits.grad_cell(),
                grad: Array1::from(grad),
            }));
        }

        loss
    }
}

struct CrossEntropyBackward {
    logits: Tensor,
    logits_grad: Rc<RefCell<Option<Array1<f32>>>>,
    grad: Array1<f32>,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self) {
        {
            let mut cell = self.logits_grad.borrow_mut();
            match cell.as_mut() {
                Some(existing) => *existing = &*existing + &self.grad,
                None => *cell = Some(self.grad.clone()),
            }
        }

        if let Some(op) = self.logits.backward_op() {
            op.backward();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = CrossEntropyLoss::softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let probs = CrossEntropyLoss::softmax(&[1000.0, 1001.0, 1002.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_uniform_logits_give_ln_classes() {
        let logits = Tensor::from_vec(vec![0.0, 0.0], false);
        let loss = CrossEntropyLoss.forward(&logits, &[0], 2);
        assert_relative_eq!(loss.data()[0], 2.0f32.ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_confident_correct_prediction_has_low_loss() {
        let logits = Tensor::from_vec(vec![10.0, -10.0], false);
        let loss = CrossEntropyLoss.forward(&logits, &[0], 2);
        assert!(loss.data()[0] < 1e-3);
    }

    #[test]
    fn test_gradient_is_softmax_minus_onehot_over_batch() {
        let logits = Tensor::from_vec(vec![0.0, 0.0, 0.0, 0.0], true);
        let loss = CrossEntropyLoss.forward(&logits, &[0, 1], 2);

        loss.backward_op().unwrap().backward();
        let grad = logits.grad().unwrap();

        // Per row: softmax = [0.5, 0.5]; batch of 2 halves it again.
        assert_relative_eq!(grad[0], -0.25, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 0.25, epsilon = 1e-6);
        assert_relative_eq!(grad[2], 0.25, epsilon = 1e-6);
        assert_relative_eq!(grad[3], -0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_no_grad_logits_build_no_op() {
        let logits = Tensor::from_vec(vec![1.0, 0.0], false);
        let loss = CrossEntropyLoss.forward(&logits, &[0], 2);
        assert!(loss.backward_op().is_none());
        assert!(loss.data()[0] > 0.0);
    }

    #[test]
    #[should_panic(expected = "batch * num_classes")]
    fn test_mismatched_lengths_panic() {
        let logits = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        CrossEntropyLoss.forward(&logits, &[0, 1], 2);
    }
}

//! Optimizer trait

use crate::autograd::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the model per step, so the update methods
/// take mutable references rather than owned parameter lists.
pub trait Optimizer {
    /// Apply one update step to the referenced parameters
    fn step_refs(&mut self, params: &mut [&mut Tensor]);

    /// Clear accumulated gradients on the referenced parameters
    fn zero_grad_refs(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate (the seam a future schedule would drive)
    fn set_lr(&mut self, lr: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    struct TestOptimizer {
        learning_rate: f32,
    }

    impl Optimizer for TestOptimizer {
        fn step_refs(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad() {
                    let update = &grad * self.learning_rate;
                    *param.data_mut() = param.data() - &update;
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn test_default_zero_grad_refs() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut p = Tensor::from_vec(vec![1.0, 2.0], true);
        p.accumulate_grad(arr1(&[1.0, 1.0]));

        opt.zero_grad_refs(&mut [&mut p]);
        assert!(p.grad().is_none());
    }

    #[test]
    fn test_step_applies_update() {
        let mut opt = TestOptimizer { learning_rate: 0.5 };
        let mut p = Tensor::from_vec(vec![1.0], true);
        p.accumulate_grad(arr1(&[2.0]));

        opt.step_refs(&mut [&mut p]);
        assert_eq!(p.data()[0], 0.0);
    }
}

//! Stochastic gradient descent

use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::Array1;

/// SGD with optional momentum
pub struct Sgd {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl Sgd {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    fn ensure_velocities(&mut self, count: usize) {
        if self.velocities.is_empty() {
            self.velocities = (0..count).map(|_| None).collect();
        }
    }
}

impl Optimizer for Sgd {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        self.ensure_velocities(params.len());

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else {
                continue;
            };

            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - &grad * self.lr,
                    None => &grad * (-self.lr),
                };
                *param.data_mut() = param.data() + &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                *param.data_mut() = param.data() - &(&grad * self.lr);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

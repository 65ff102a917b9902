//! Adam optimizer

use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::Array1;

/// Adam with bias-corrected first and second moments
///
/// m_t = β1·m_{t-1} + (1-β1)·g,  v_t = β2·v_{t-1} + (1-β2)·g²
/// θ_t = θ_{t-1} - lr · m̂_t / (√v̂_t + ε)
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>,
    v: Vec<Option<Array1<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Adam with the standard 0.9 / 0.999 / 1e-8 hyperparameters
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    fn ensure_moments(&mut self, count: usize) {
        if self.m.is_empty() {
            self.m = (0..count).map(|_| None).collect();
            self.v = (0..count).map(|_| None).collect();
        }
    }
}

impl Optimizer for Adam {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        self.ensure_moments(params.len());
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else {
                continue;
            };

            if self.m[i].is_none() {
                self.m[i] = Some(Array1::zeros(grad.len()));
                self.v[i] = Some(Array1::zeros(grad.len()));
            }
            let m = self.m[i].as_mut().unwrap();
            let v = self.v[i].as_mut().unwrap();

            *m = &*m * self.beta1 + &grad * (1.0 - self.beta1);
            *v = &*v * self.beta2 + &grad.mapv(|g| g * g) * (1.0 - self.beta2);

            let m_hat = m.mapv(|x| x / bias1);
            let v_hat = v.mapv(|x| x / bias2);

            let update = m_hat
                .iter()
                .zip(v_hat.iter())
                .map(|(&mh, &vh)| self.lr * mh / (vh.sqrt() + self.epsilon))
                .collect::<Vec<f32>>();
            *param.data_mut() = param.data() - &Array1::from(update);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_first_step_moves_by_lr() {
        // With bias correction, the very first Adam step is ~lr in magnitude.
        let mut opt = Adam::default_params(0.1);
        let mut p = Tensor::from_vec(vec![1.0], true);
        p.accumulate_grad(arr1(&[10.0]));

        opt.step_refs(&mut [&mut p]);
        assert!((p.data()[0] - 0.9).abs() < 1e-3);
    }

    #[test]
    fn test_converges_on_quadratic() {
        // Minimize f(x) = x^2; grad = 2x.
        let mut opt = Adam::default_params(0.1);
        let mut x = Tensor::from_vec(vec![5.0], true);

        for _ in 0..300 {
            let grad = arr1(&[2.0 * x.data()[0]]);
            x.zero_grad();
            x.accumulate_grad(grad);
            opt.step_refs(&mut [&mut x]);
        }

        assert!(x.data()[0].abs() < 0.1);
    }

    #[test]
    fn test_skips_params_without_grad() {
        let mut opt = Adam::default_params(0.1);
        let mut p = Tensor::from_vec(vec![3.0], true);
        opt.step_refs(&mut [&mut p]);
        assert_eq!(p.data()[0], 3.0);
    }

    #[test]
    fn test_set_lr() {
        let mut opt = Adam::default_params(0.01);
        assert_eq!(opt.lr(), 0.01);
        opt.set_lr(0.001);
        assert_eq!(opt.lr(), 0.001);
    }
}

//! Forward/backward ops for the classifier: linear, relu, dropout
//!
//! Matrices are flattened row-major; each op carries the explicit
//! `(rows, cols)` bookkeeping for its inputs.

use super::{BackwardOp, Tensor};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
///
/// Uses a cache-blocked transpose for large matrices.
#[inline]
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut transposed = vec![0.0f32; rows * cols];

    const BLOCK_SIZE: usize = 32;
    if rows >= BLOCK_SIZE && cols >= BLOCK_SIZE {
        transpose_blocked(data, &mut transposed, rows, cols, BLOCK_SIZE);
    } else {
        transpose_simple(data, &mut transposed, rows, cols);
    }

    transposed
}

#[inline]
fn transpose_blocked(src: &[f32], dst: &mut [f32], rows: usize, cols: usize, block: usize) {
    for r_block in (0..rows).step_by(block) {
        for c_block in (0..cols).step_by(block) {
            let r_end = (r_block + block).min(rows);
            let c_end = (c_block + block).min(cols);
            for r in r_block..r_end {
                for c in c_block..c_end {
                    dst[c * rows + r] = src[r * cols + c];
                }
            }
        }
    }
}

#[inline]
fn transpose_simple(src: &[f32], dst: &mut [f32], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

/// Row-major matrix multiply: a (m x k) * b (k x n) -> (m x n)
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

/// Affine layer: inputs (batch x in_features) * weight^T (in x out) + bias
///
/// `weight` is (out_features x in_features) row-major, `bias` is
/// (out_features). Gradients accumulate into `weight`, `bias`, and `input`
/// (when tracked) on backward.
pub fn linear(
    input: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    batch: usize,
    in_features: usize,
    out_features: usize,
) -> Tensor {
    debug_assert_eq!(input.len(), batch * in_features);
    debug_assert_eq!(weight.len(), out_features * in_features);
    debug_assert_eq!(bias.len(), out_features);

    let data = linear_compute(
        input.data().as_slice().unwrap(),
        weight.data().as_slice().unwrap(),
        bias.data().as_slice().unwrap(),
        batch,
        in_features,
        out_features,
    );

    let requires_grad = input.requires_grad() || weight.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            input: input.clone(),
            weight: weight.clone(),
            bias: bias.clone(),
            batch,
            in_features,
            out_features,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

/// Plain affine forward used by both the tape op and the inference path
pub(crate) fn linear_compute(
    input: &[f32],
    weight: &[f32],
    bias: &[f32],
    batch: usize,
    in_features: usize,
    out_features: usize,
) -> Vec<f32> {
    let weight_t = transpose(weight, out_features, in_features);
    let mut out = matmul_compute(input, &weight_t, batch, in_features, out_features);
    for b in 0..batch {
        for o in 0..out_features {
            out[b * out_features + o] += bias[o];
        }
    }
    out
}

/// Inference-path affine forward (no tape)
pub fn linear_infer(
    input: &[f32],
    weight: &[f32],
    bias: &[f32],
    batch: usize,
    in_features: usize,
    out_features: usize,
) -> Vec<f32> {
    linear_compute(input, weight, bias, batch, in_features, out_features)
}

/// Inference-path affine + ReLU forward (no tape)
pub fn matmul_relu_infer(
    input: &[f32],
    weight: &[f32],
    bias: &[f32],
    batch: usize,
    in_features: usize,
    out_features: usize,
) -> Vec<f32> {
    let mut out = linear_compute(input, weight, bias, batch, in_features, out_features);
    for v in &mut out {
        *v = v.max(0.0);
    }
    out
}

struct LinearBackward {
    input: Tensor,
    weight: Tensor,
    bias: Tensor,
    batch: usize,
    in_features: usize,
    out_features: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        let Some(grad) = self.result_grad.borrow().as_ref().cloned() else {
            return;
        };
        let grad_out = grad.as_slice().unwrap();

        if self.weight.requires_grad() {
            // dL/dW = grad_out^T (out x batch) * input (batch x in)
            let grad_out_t = transpose(grad_out, self.batch, self.out_features);
            let grad_w = matmul_compute(
                &grad_out_t,
                self.input.data().as_slice().unwrap(),
                self.out_features,
                self.batch,
                self.in_features,
            );
            self.weight.accumulate_grad(Array1::from(grad_w));
        }

        if self.bias.requires_grad() {
            // dL/db = column sums of grad_out
            let mut grad_b = vec![0.0f32; self.out_features];
            for b in 0..self.batch {
                for o in 0..self.out_features {
                    grad_b[o] += grad_out[b * self.out_features + o];
                }
            }
            self.bias.accumulate_grad(Array1::from(grad_b));
        }

        if self.input.requires_grad() {
            // dL/dx = grad_out (batch x out) * W (out x in)
            let grad_x = matmul_compute(
                grad_out,
                self.weight.data().as_slice().unwrap(),
                self.batch,
                self.out_features,
                self.in_features,
            );
            self.input.accumulate_grad(Array1::from(grad_x));
        }

        if let Some(op) = self.input.backward_op() {
            op.backward();
        }
    }
}

/// Rectified linear unit
pub fn relu(input: &Tensor) -> Tensor {
    let data = input.data().mapv(|v| v.max(0.0));
    let requires_grad = input.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let mask = input.data().mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        let backward_op = Rc::new(ReluBackward {
            input: input.clone(),
            mask,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReluBackward {
    input: Tensor,
    mask: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad_in = grad * &self.mask;
            self.input.accumulate_grad(grad_in);
        }

        if let Some(op) = self.input.backward_op() {
            op.backward();
        }
    }
}

/// Inverted dropout: zero each element with probability `p`, scale the
/// survivors by 1/(1-p) so activations keep their expected magnitude
///
/// Only called on the training path; inference skips the op entirely.
pub fn dropout(input: &Tensor, p: f32, rng: &mut StdRng) -> Tensor {
    assert!((0.0..1.0).contains(&p), "dropout probability must be in [0, 1)");

    if p == 0.0 {
        return input.clone();
    }

    let scale = 1.0 / (1.0 - p);
    let mask: Array1<f32> = Array1::from(
        (0..input.len())
            .map(|_| if rng.gen::<f32>() < p { 0.0 } else { scale })
            .collect::<Vec<f32>>(),
    );

    let data = input.data() * &mask;
    let requires_grad = input.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(DropoutBackward {
            input: input.clone(),
            mask,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct DropoutBackward {
    input: Tensor,
    mask: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad_in = grad * &self.mask;
            self.input.accumulate_grad(grad_in);
        }

        if let Some(op) = self.input.backward_op() {
            op.backward();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_transpose_round_trip() {
        let m = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let t = transpose(&m, 2, 3); // 3x2
        assert_eq!(t, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let back = transpose(&t, 3, 2);
        assert_eq!(back, m);
    }

    #[test]
    fn test_matmul_identity() {
        let a = vec![1.0, 2.0, 3.0, 4.0]; // 2x2
        let i = vec![1.0, 0.0, 0.0, 1.0];
        let c = matmul_compute(&a, &i, 2, 2, 2);
        assert_eq!(c, a);
    }

    #[test]
    fn test_linear_forward() {
        // batch=1, in=2, out=2: W = [[1, 0], [0, 1]], b = [1, -1]
        let x = Tensor::from_vec(vec![2.0, 3.0], false);
        let w = Tensor::from_vec(vec![1.0, 0.0, 0.0, 1.0], true);
        let b = Tensor::from_vec(vec![1.0, -1.0], true);

        let out = linear(&x, &w, &b, 1, 2, 2);
        assert_eq!(out.to_vec(), vec![3.0, 2.0]);
    }

    #[test]
    fn test_linear_backward_grads() {
        // batch=2, in=2, out=1: out[b] = w0*x0 + w1*x1 + bias
        let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], false);
        let w = Tensor::from_vec(vec![0.5, -0.5], true);
        let b = Tensor::from_vec(vec![0.0], true);

        let mut out = linear(&x, &w, &b, 2, 2, 1);
        backward(&mut out, None);

        // dL/dW = sum over batch of x rows = [1+3, 2+4]
        let grad_w = w.grad().unwrap();
        assert_relative_eq!(grad_w[0], 4.0);
        assert_relative_eq!(grad_w[1], 6.0);

        // dL/db = batch size
        let grad_b = b.grad().unwrap();
        assert_relative_eq!(grad_b[0], 2.0);
    }

    #[test]
    fn test_linear_backward_input_grad_chains() {
        let x = Tensor::from_vec(vec![1.0, 1.0], true);
        let w = Tensor::from_vec(vec![2.0, 3.0], true);
        let b = Tensor::from_vec(vec![0.0], true);

        let mut out = linear(&x, &w, &b, 1, 2, 1);
        backward(&mut out, None);

        // dL/dx = W row
        let grad_x = x.grad().unwrap();
        assert_relative_eq!(grad_x[0], 2.0);
        assert_relative_eq!(grad_x[1], 3.0);
    }

    #[test]
    fn test_relu_forward_and_backward() {
        let x = Tensor::from_vec(vec![-1.0, 0.0, 2.0], true);
        let mut out = relu(&x);
        assert_eq!(out.to_vec(), vec![0.0, 0.0, 2.0]);

        backward(&mut out, Some(ndarray::arr1(&[1.0, 1.0, 1.0])));
        let grad = x.grad().unwrap();
        assert_eq!(grad.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_dropout_zero_probability_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        let out = dropout(&x, 0.0, &mut rng);
        assert_eq!(out.to_vec(), x.to_vec());
    }

    #[test]
    fn test_dropout_scales_survivors() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = Tensor::from_vec(vec![1.0; 1000], false);
        let out = dropout(&x, 0.5, &mut rng);

        // Every element is either dropped or scaled by exactly 2
        for &v in out.data() {
            assert!(v == 0.0 || v == 2.0);
        }
        // Expected survivor mass stays around the input mass
        let sum: f32 = out.data().sum();
        assert!((sum - 1000.0).abs() < 150.0);
    }

    #[test]
    fn test_dropout_deterministic_given_seed() {
        let x = Tensor::from_vec(vec![1.0; 64], false);
        let a = dropout(&x, 0.3, &mut StdRng::seed_from_u64(11)).to_vec();
        let b = dropout(&x, 0.3, &mut StdRng::seed_from_u64(11)).to_vec();
        assert_eq!(a, b);
    }
}

//! Tape-based autograd engine
//!
//! Provides automatic differentiation for the classifier's forward pass
//! using backward-op objects chained through shared gradient cells.

mod backward;
mod ops;
mod tensor;

pub use backward::BackwardOp;
pub use ops::{
    dropout, linear, linear_infer, matmul_compute, matmul_relu_infer, relu, transpose,
};
pub use tensor::Tensor;

/// Perform backward pass on a tensor
///
/// Seeds the gradient with ones when none is supplied, which is the correct
/// seed for a scalar loss.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        let ones = ndarray::Array1::ones(tensor.data().len());
        tensor.set_grad(ones);
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}

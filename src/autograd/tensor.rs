//! Gradient-carrying tensor over `ndarray`

use super::BackwardOp;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// A 1-D f32 tensor with optional gradient tracking
///
/// Data is owned per tensor; the gradient cell is shared across clones, so a
/// backward op holding a clone of a parameter accumulates into the same
/// gradient the optimizer later reads. Multi-dimensional values (batched
/// inputs, weight matrices) are stored flattened row-major with shape
/// bookkeeping kept by the op that consumes them.
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    requires_grad: bool,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    backward_op: Option<Rc<dyn BackwardOp>>,
}

impl Tensor {
    /// Create a tensor from an ndarray
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data,
            requires_grad,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
        }
    }

    /// Create a tensor from a Vec
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the underlying data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutably borrow the underlying data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Copy the data out as a Vec
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.to_vec()
    }

    /// Whether this tensor tracks gradients
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Current gradient, if any has been accumulated
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Shared gradient cell (used by backward ops)
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// Overwrite the gradient
    pub fn set_grad(&mut self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, initializing it if absent
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing = &*existing + &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient
    pub fn zero_grad(&mut self) {
        *self.grad.borrow_mut() = None;
    }

    /// Backward op producing this tensor, if it came from a tracked op
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the backward op for this tensor
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.data.len())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_tensor_creation() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        assert_eq!(t.len(), 3);
        assert!(t.requires_grad());
        assert!(t.grad().is_none());

        let z = Tensor::zeros(4, false);
        assert_eq!(z.to_vec(), vec![0.0; 4]);
        assert!(!z.requires_grad());
    }

    #[test]
    fn test_grad_accumulation() {
        let t = Tensor::from_vec(vec![1.0, 2.0], true);
        t.accumulate_grad(arr1(&[0.5, 0.5]));
        t.accumulate_grad(arr1(&[1.0, 2.0]));

        let grad = t.grad().unwrap();
        assert_eq!(grad[0], 1.5);
        assert_eq!(grad[1], 2.5);
    }

    #[test]
    fn test_clone_shares_grad_cell() {
        let t = Tensor::from_vec(vec![1.0], true);
        let clone = t.clone();
        clone.accumulate_grad(arr1(&[3.0]));
        assert_eq!(t.grad().unwrap()[0], 3.0);
    }

    #[test]
    fn test_zero_grad() {
        let mut t = Tensor::from_vec(vec![1.0], true);
        t.accumulate_grad(arr1(&[2.0]));
        t.zero_grad();
        assert!(t.grad().is_none());
    }
}

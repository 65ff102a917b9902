//! Backward operation trait

/// A node in the backward graph
///
/// Implementations capture their input tensors and the output gradient cell
/// at forward time, accumulate input gradients when invoked, and recurse
/// into their inputs' backward ops.
pub trait BackwardOp {
    /// Propagate gradients from the output cell into the inputs
    fn backward(&self);
}

//! Additional operations for the Burn deep learning framework
//!
//! This crate provides operations that are commonly used in deep learning but are not
//! yet available in the core Burn framework.

use burn::prelude::*;

mod gram;
mod window;

// Convenient re-exports
pub use gram::gram_matrix;
pub use window::{window, Window};

/// Additional operations for Burn tensors
pub trait TensorExtraOps<B: Backend, const D: usize> {
    /// Extract a rectangular sub-region of the tensor
    fn window(self, window: Window<D>) -> Self;

    /// Difference between the region `window` and the same region moved by one
    /// element along `axis`
    fn neighbour_difference(self, window: Window<D>, axis: usize) -> Self;
}

impl<B: Backend, const D: usize> TensorExtraOps<B, D> for Tensor<B, D> {
    fn window(self, region: Window<D>) -> Self {
        window(self, region)
    }

    fn neighbour_difference(self, region: Window<D>, axis: usize) -> Self {
        window(self.clone(), region) - window(self, region.shifted(axis, 1))
    }
}

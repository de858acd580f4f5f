//! # Tensor Windowing Helper
//!
//! Provides a `Window` struct describing a rectangular sub-region of an N-D tensor
//! as an origin plus an extent per axis.

use burn::prelude::*;
use core::ops::Range;

/// A rectangular region of a tensor: `offset[i]..offset[i] + extent[i]` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<const D: usize> {
    offset: [usize; D],
    extent: [usize; D],
}

impl<const D: usize> Window<D> {
    /// Creates a new `Window`.
    pub const fn new(offset: [usize; D], extent: [usize; D]) -> Self {
        Self { offset, extent }
    }

    /// A window anchored at the origin.
    pub const fn from_extent(extent: [usize; D]) -> Self {
        Self {
            offset: [0; D],
            extent,
        }
    }

    /// Returns the same window moved by `by` elements along `axis`.
    pub fn shifted(mut self, axis: usize, by: usize) -> Self {
        self.offset[axis] += by;
        self
    }

    pub const fn extent(&self) -> [usize; D] {
        self.extent
    }

    /// Converts the window into one range per axis.
    pub fn to_ranges(&self) -> [Range<usize>; D] {
        core::array::from_fn(|axis| self.offset[axis]..self.offset[axis] + self.extent[axis])
    }

    /// Whether the window lies entirely inside a tensor of shape `dims`.
    pub fn fits(&self, dims: [usize; D]) -> bool {
        self.to_ranges()
            .iter()
            .zip(dims)
            .all(|(range, len)| range.end <= len)
    }
}

/// Extracts `window` from `tensor`.
///
/// # Panics
///
/// Panics if the window reaches past the end of any axis.
pub fn window<B: Backend, const D: usize>(tensor: Tensor<B, D>, window: Window<D>) -> Tensor<B, D> {
    let dims = tensor.dims();
    assert!(
        window.fits(dims),
        "Window {:?} does not fit in tensor of shape {dims:?}",
        window.to_ranges()
    );
    tensor.slice(window.to_ranges())
}

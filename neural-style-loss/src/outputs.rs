//! Layer outputs handed to a regularizer, and the trait regularizers implement.

use burn::prelude::*;

use crate::{RegularizerError, RegularizerResult};

/// The ordered outputs of the layer a regularizer is attached to.
///
/// Each regularizer documents the semantic role of every position it reads, e.g.
/// `(generated, content)` for feature reconstruction.
#[derive(Debug, Clone)]
pub struct LayerOutputs<B: Backend, const D: usize> {
    outputs: Vec<Tensor<B, D>>,
}

impl<B: Backend, const D: usize> LayerOutputs<B, D> {
    pub const fn new(outputs: Vec<Tensor<B, D>>) -> Self {
        Self { outputs }
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Returns the output at `index`, naming its `role` in the error when absent.
    pub fn get(&self, index: usize, role: &'static str) -> RegularizerResult<Tensor<B, D>> {
        self.outputs
            .get(index)
            .cloned()
            .ok_or(RegularizerError::MissingOutput {
                role,
                index,
                available: self.outputs.len(),
            })
    }
}

impl<B: Backend> LayerOutputs<B, 3> {
    /// Splits a batched activation `[N, ...]` into `N` single feature maps.
    pub fn from_batch(batch: Tensor<B, 4>) -> Self {
        let [batch_size, ..] = batch.dims();
        if batch_size == 0 {
            return Self::new(Vec::new());
        }

        let outputs = batch
            .chunk(batch_size, 0)
            .into_iter()
            .map(|item| item.squeeze::<3>(0))
            .collect();

        Self::new(outputs)
    }
}

impl<B: Backend, const D: usize> From<Vec<Tensor<B, D>>> for LayerOutputs<B, D> {
    fn from(outputs: Vec<Tensor<B, D>>) -> Self {
        Self::new(outputs)
    }
}

/// A loss term computed from the outputs of one layer.
pub trait Regularizer<B: Backend, const D: usize> {
    /// Number of leading outputs the regularizer consumes.
    fn arity(&self) -> usize;

    /// Computes the scalar loss contribution, reporting missing outputs and shape
    /// mismatches as errors instead of panicking.
    fn regularize(&self, outputs: &LayerOutputs<B, D>) -> RegularizerResult<Tensor<B, 1>>;
}

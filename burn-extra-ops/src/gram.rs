//! Gram product of a feature matrix.

use burn::prelude::*;

/// Computes the matrix of pairwise inner products between the rows of `features`.
///
/// For an input of shape `[rows, len]` the result has shape `[rows, rows]` with
/// `out[i][j] = <features[i], features[j]>`.
pub fn gram_matrix<B: Backend>(features: Tensor<B, 2>) -> Tensor<B, 2> {
    features.clone().matmul(features.transpose())
}

//! Gram matrix of a feature map, the style signature shared by the style terms.

use burn::prelude::*;

use crate::DataLayout;

/// Scaling applied to a Gram matrix before it is compared.
#[derive(Config, Debug, Copy, PartialEq, Eq, Hash)]
pub enum GramNormalization {
    /// Raw inner products.
    Raw,
    /// Inner products divided by `C * H * W`, as in Johnson et al.
    Elements,
}

impl Default for GramNormalization {
    fn default() -> Self {
        Self::Raw
    }
}

/// Computes the channel-by-channel Gram matrix of a single feature map.
///
/// The batch axis must already be stripped: `features` is `[C, H, W]` or `[H, W, C]`
/// depending on `layout`. Each channel is flattened into a row vector and the result
/// is the `[C, C]` matrix of dot products between those rows.
pub fn gram_matrix<B: Backend>(features: Tensor<B, 3>, layout: DataLayout) -> Tensor<B, 2> {
    let features = layout.to_channels_first(features);
    let [channels, height, width] = features.dims();

    burn_extra_ops::gram_matrix(features.reshape([channels, height * width]))
}

/// [`gram_matrix`] followed by the requested normalization.
pub fn normalized_gram_matrix<B: Backend>(
    features: Tensor<B, 3>,
    layout: DataLayout,
    normalization: GramNormalization,
) -> Tensor<B, 2> {
    let elements = features.shape().num_elements();
    let gram = gram_matrix(features, layout);

    match normalization {
        GramNormalization::Raw => gram,
        GramNormalization::Elements => gram.div_scalar(elements as f64),
    }
}

//! Loss functions for training fast neural style transfer networks.
//!
//! This crate provides the perceptual losses of Johnson et al. 2015
//! (<https://arxiv.org/abs/1603.08155>) using the Burn deep learning framework.
//! Every loss takes Burn tensors and returns a `[1]`-shaped tensor that takes part
//! in the autodiff graph of whatever backend it runs on.
//!
//! ## Regularizers
//!
//! - **[`StyleReconstructionRegularizer`]**: squared distance between the Gram matrices
//!   of generated and style-target activations at one layer
//! - **[`FeatureReconstructionRegularizer`]**: squared activation distance between the
//!   generated and content images at one layer
//! - **[`TotalVariationRegularizer`]**: smoothness prior on the generated image
//!
//! Each regularizer has a typed `forward` whose arguments name their roles, and
//! implements [`Regularizer`] for invocation on the ordered [`LayerOutputs`] of the
//! layer it is attached to.
//!
//! ## Other losses
//!
//! - **[`DummyLoss`]** / [`dummy_loss`]: constant zero, for the network output when
//!   all the training signal comes from regularizers
//! - **[`StyleTransferLoss`]**: weighted sum of all three regularizers with a
//!   per-term breakdown
//!
//! ## Data layout
//!
//! Tensors are interpreted according to an explicit [`DataLayout`] carried by every
//! config. Nothing checks that the layout matches the data: passing channel-last
//! tensors to a channel-first regularizer silently computes the loss over the wrong
//! axes.
//!
//! ## Usage Example
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::prelude::*;
//! use neural_style_loss::{
//!     FeatureReconstructionRegularizerConfig, StyleReconstructionRegularizerConfig,
//!     TotalVariationRegularizerConfig,
//! };
//!
//! let device = Default::default();
//! let style_target = Tensor::<NdArray, 3>::ones([8, 16, 16], &device);
//!
//! let style = StyleReconstructionRegularizerConfig::new()
//!     .with_weight(5.0)
//!     .init(style_target.clone());
//! let content = FeatureReconstructionRegularizerConfig::new().init();
//! let tv = TotalVariationRegularizerConfig::new(64, 64)
//!     .with_weight(1e-4)
//!     .init();
//!
//! let loss = style.forward(style_target.clone())
//!     + content.forward(style_target.clone(), style_target)
//!     + tv.forward(Tensor::<NdArray, 4>::zeros([1, 3, 64, 64], &device));
//! assert_eq!(loss.dims(), [1]);
//! ```

mod combined;
mod dummy;
mod error;
mod feature;
mod gram;
mod layout;
mod outputs;
mod style;
mod total_variation;

pub use combined::{StyleTransferInput, StyleTransferLoss, StyleTransferLossConfig};
pub use dummy::{dummy_loss, DummyLoss};
pub use error::{RegularizerError, RegularizerResult};
pub use feature::{FeatureReconstructionRegularizer, FeatureReconstructionRegularizerConfig};
pub use gram::{gram_matrix, normalized_gram_matrix, GramNormalization};
pub use layout::DataLayout;
pub use outputs::{LayerOutputs, Regularizer};
pub use style::{StyleReconstructionRegularizer, StyleReconstructionRegularizerConfig};
pub use total_variation::{
    TotalVariationRegularizer, TotalVariationRegularizerConfig, TV_EXPONENT,
};

#[cfg(test)]
mod tests {
    use burn::{
        backend::{Autodiff, NdArray},
        tensor::ops::FloatElem,
    };

    pub type TestBackend = NdArray;
    pub type TestAutodiffBackend = Autodiff<NdArray>;
    pub type FT = FloatElem<TestBackend>;
}

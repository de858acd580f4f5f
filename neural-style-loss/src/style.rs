//! Style reconstruction loss (Johnson et al. 2015, <https://arxiv.org/abs/1603.08155>).
//!
//! Penalizes the squared difference between the Gram matrix of the generated
//! image's activations at one layer and the Gram matrix of a fixed style target:
//!
//! ```text
//! L = weight * mean(sum((G(generated) - G(target))²))
//! ```

use burn::{
    config::Config,
    module::{Ignored, Module},
    tensor::{backend::Backend, Tensor},
};

use crate::{
    gram::normalized_gram_matrix, DataLayout, GramNormalization, LayerOutputs, Regularizer,
    RegularizerError, RegularizerResult,
};

/// Configuration for creating a [style reconstruction regularizer](StyleReconstructionRegularizer).
#[derive(Config, Debug)]
pub struct StyleReconstructionRegularizerConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
    /// Channel ordering of the feature maps. Default: channels first
    #[config(default = "DataLayout::ChannelsFirst")]
    pub layout: DataLayout,
    /// Scaling of both Gram matrices. Default: raw inner products
    #[config(default = "GramNormalization::Raw")]
    pub normalization: GramNormalization,
}

impl StyleReconstructionRegularizerConfig {
    /// Initialize the regularizer against the style image's activations at this layer.
    ///
    /// `target_features` is a single feature map (batch axis stripped) in this
    /// config's layout. Its Gram matrix is computed once here.
    pub fn init<B: Backend>(
        &self,
        target_features: Tensor<B, 3>,
    ) -> StyleReconstructionRegularizer<B> {
        self.assertions();
        let target_gram = normalized_gram_matrix(target_features, self.layout, self.normalization);

        StyleReconstructionRegularizer {
            target_gram,
            weight: self.weight,
            layout: Ignored(self.layout),
            normalization: Ignored(self.normalization),
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight.is_finite() && self.weight >= 0.0,
            "Weight for StyleReconstructionRegularizer must be non-negative, got {}",
            self.weight
        );
    }
}

/// Style reconstruction regularizer for one layer of the loss network.
#[derive(Module, Debug)]
pub struct StyleReconstructionRegularizer<B: Backend> {
    /// Gram matrix of the style target, `[C, C]`.
    pub target_gram: Tensor<B, 2>,
    /// Weight factor applied to the loss.
    pub weight: f64,
    layout: Ignored<DataLayout>,
    normalization: Ignored<GramNormalization>,
}

impl<B: Backend> StyleReconstructionRegularizer<B> {
    /// Channel count of the style target.
    pub fn channels(&self) -> usize {
        self.target_gram.dims()[0]
    }

    /// Compute the style loss of the generated activations.
    ///
    /// # Shapes
    ///
    /// - generated: `[C, H, W]` or `[H, W, C]`, any spatial size, same `C` as the target
    /// - output: `[1]`
    ///
    /// # Panics
    ///
    /// Panics if the channel count differs from the target's.
    pub fn forward(&self, generated: Tensor<B, 3>) -> Tensor<B, 1> {
        if let Err(err) = self.check_channels(&generated) {
            panic!("{err}");
        }

        let generated_gram = normalized_gram_matrix(generated, *self.layout, *self.normalization);

        (generated_gram - self.target_gram.clone())
            .powi_scalar(2)
            .sum()
            .mean()
            .mul_scalar(self.weight)
    }

    fn check_channels(&self, generated: &Tensor<B, 3>) -> RegularizerResult<()> {
        let dims = generated.dims();
        let channels = self.layout.channels(dims);
        if channels == self.channels() {
            return Ok(());
        }

        Err(RegularizerError::InvalidTensorShape {
            expected: format!("feature map with {} channels ({:?})", self.channels(), *self.layout),
            actual: format!("{dims:?}"),
        })
    }
}

/// Output 0: generated-image features at this layer.
impl<B: Backend> Regularizer<B, 3> for StyleReconstructionRegularizer<B> {
    fn arity(&self) -> usize {
        1
    }

    fn regularize(&self, outputs: &LayerOutputs<B, 3>) -> RegularizerResult<Tensor<B, 1>> {
        let generated = outputs.get(0, "generated")?;
        self.check_channels(&generated)?;
        Ok(self.forward(generated))
    }
}

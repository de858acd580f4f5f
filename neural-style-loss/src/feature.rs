//! Feature reconstruction (content / perceptual) loss.
//!
//! Penalizes the squared activation-wise difference between the generated image
//! and the content image at one layer of the loss network:
//!
//! ```text
//! L = weight * mean(sum((content - generated)²)) / (channels * size * size)
//! ```
//!
//! `size` is read from axis 1 of the feature map in both layouts, so the
//! normalization assumes square feature maps. Non-square maps are normalized by
//! the square of that one axis, not by their area.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Ignored, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor},
};

use crate::{DataLayout, LayerOutputs, Regularizer, RegularizerError, RegularizerResult};

/// Configuration for creating a
/// [feature reconstruction regularizer](FeatureReconstructionRegularizer).
#[derive(Config, Debug)]
pub struct FeatureReconstructionRegularizerConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
    /// Channel ordering of the feature maps. Default: channels first
    #[config(default = "DataLayout::ChannelsFirst")]
    pub layout: DataLayout,
}

impl FeatureReconstructionRegularizerConfig {
    /// Initialize [feature reconstruction regularizer](FeatureReconstructionRegularizer).
    pub fn init(&self) -> FeatureReconstructionRegularizer {
        self.assertions();
        FeatureReconstructionRegularizer {
            weight: self.weight,
            layout: Ignored(self.layout),
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight.is_finite() && self.weight >= 0.0,
            "Weight for FeatureReconstructionRegularizer must be non-negative, got {}",
            self.weight
        );
    }
}

/// Feature reconstruction regularizer for one layer of the loss network.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct FeatureReconstructionRegularizer {
    /// Weight factor applied to the loss.
    pub weight: f64,
    layout: Ignored<DataLayout>,
}

impl Default for FeatureReconstructionRegularizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for FeatureReconstructionRegularizer {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl FeatureReconstructionRegularizer {
    /// Create a new feature reconstruction regularizer with default configuration.
    pub fn new() -> Self {
        FeatureReconstructionRegularizerConfig::new().init()
    }

    /// Channel ordering the feature maps are read with.
    pub fn layout(&self) -> DataLayout {
        *self.layout
    }

    /// Compute the feature reconstruction loss.
    ///
    /// # Shapes
    ///
    /// - generated: `[C, H, W]` or `[H, W, C]`
    /// - content: same shape as `generated`
    /// - output: `[1]`
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ or the feature map is empty.
    pub fn forward<B: Backend>(
        &self,
        generated: Tensor<B, 3>,
        content: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        if let Err(err) = self.check_shapes(&generated, &content) {
            panic!("{err}");
        }

        let dims = generated.dims();
        let channels = self.layout.channels(dims);
        let size = dims[1];
        tracing::debug!(channels, size, "feature reconstruction normalization");

        (content - generated)
            .powi_scalar(2)
            .sum()
            .mean()
            .mul_scalar(self.weight)
            .div_scalar((channels * size * size) as f64)
    }

    fn check_shapes<B: Backend>(
        &self,
        generated: &Tensor<B, 3>,
        content: &Tensor<B, 3>,
    ) -> RegularizerResult<()> {
        let generated_dims = generated.dims();
        let content_dims = content.dims();
        if generated_dims != content_dims {
            return Err(RegularizerError::InvalidTensorShape {
                expected: format!("content features of shape {generated_dims:?}"),
                actual: format!("{content_dims:?}"),
            });
        }
        if self.layout.channels(generated_dims) * generated_dims[1] == 0 {
            return Err(RegularizerError::InvalidTensorShape {
                expected: "non-empty channel and spatial axes".to_owned(),
                actual: format!("{generated_dims:?}"),
            });
        }

        Ok(())
    }
}

/// Output 0: generated-image features; output 1: content-image features.
impl<B: Backend> Regularizer<B, 3> for FeatureReconstructionRegularizer {
    fn arity(&self) -> usize {
        2
    }

    fn regularize(&self, outputs: &LayerOutputs<B, 3>) -> RegularizerResult<Tensor<B, 1>> {
        let generated = outputs.get(0, "generated")?;
        let content = outputs.get(1, "content")?;
        self.check_shapes(&generated, &content)?;
        Ok(self.forward(generated, content))
    }
}

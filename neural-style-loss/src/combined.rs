//! Weighted sum of the style, feature and total-variation terms.
//!
//! This mirrors how a fast style transfer network is trained: one style term per
//! selected layer of the loss network, one feature term at the content layer, and a
//! total-variation term on the generated image. The aggregate returns the total loss
//! together with a per-term breakdown for logging.

use std::collections::HashMap;

use burn::{
    prelude::*,
    tensor::{backend::Backend, cast::ToElement, Tensor},
};

use crate::{
    DataLayout, FeatureReconstructionRegularizer, FeatureReconstructionRegularizerConfig,
    GramNormalization, StyleReconstructionRegularizer, StyleReconstructionRegularizerConfig,
    TotalVariationRegularizer, TotalVariationRegularizerConfig,
};

/// Configuration for [StyleTransferLoss].
#[derive(Config, Debug)]
pub struct StyleTransferLossConfig {
    /// Extent of the first spatial axis of the generated image.
    pub img_width: usize,
    /// Extent of the second spatial axis of the generated image.
    pub img_height: usize,
    #[config(default = 1.0)]
    pub style_weight: f64,
    #[config(default = 1.0)]
    pub content_weight: f64,
    #[config(default = 1.0)]
    pub tv_weight: f64,
    #[config(default = "DataLayout::ChannelsFirst")]
    pub layout: DataLayout,
    #[config(default = "GramNormalization::Raw")]
    pub normalization: GramNormalization,
}

/// Activations and output of the image transformation network for one step.
#[derive(Debug, Clone)]
pub struct StyleTransferInput<B: Backend> {
    /// Generated-image features at each style layer, in target order.
    pub style_features: Vec<Tensor<B, 3>>,
    /// Generated-image features at the content layer.
    pub generated_content: Tensor<B, 3>,
    /// Content-image features at the content layer.
    pub true_content: Tensor<B, 3>,
    /// The generated image batch.
    pub image: Tensor<B, 4>,
}

/// Combined style transfer loss.
#[derive(Module, Debug)]
pub struct StyleTransferLoss<B: Backend> {
    pub style: Vec<StyleReconstructionRegularizer<B>>,
    pub content: Option<FeatureReconstructionRegularizer>,
    pub tv: Option<TotalVariationRegularizer>,
}

impl StyleTransferLossConfig {
    /// Initialize the loss with the style image's activations at every style layer.
    ///
    /// Terms whose weight is zero are not built.
    pub fn init<B: Backend>(&self, style_targets: Vec<Tensor<B, 3>>) -> StyleTransferLoss<B> {
        self.assertions();
        let style_config = StyleReconstructionRegularizerConfig::new()
            .with_weight(self.style_weight)
            .with_layout(self.layout)
            .with_normalization(self.normalization);
        let style = if self.style_weight > 0.0 {
            style_targets
                .into_iter()
                .map(|target| style_config.init(target))
                .collect()
        } else {
            Vec::new()
        };

        StyleTransferLoss {
            style,
            content: (self.content_weight > 0.0).then(|| {
                FeatureReconstructionRegularizerConfig::new()
                    .with_weight(self.content_weight)
                    .with_layout(self.layout)
                    .init()
            }),
            tv: (self.tv_weight > 0.0).then(|| {
                TotalVariationRegularizerConfig::new(self.img_width, self.img_height)
                    .with_weight(self.tv_weight)
                    .with_layout(self.layout)
                    .init()
            }),
        }
    }

    fn assertions(&self) {
        for (name, weight) in [
            ("style_weight", self.style_weight),
            ("content_weight", self.content_weight),
            ("tv_weight", self.tv_weight),
        ] {
            assert!(
                weight.is_finite() && weight >= 0.0,
                "{name} for StyleTransferLoss must be non-negative, got {weight}"
            );
        }
    }
}

impl<B: Backend> StyleTransferLoss<B> {
    /// Calculate the combined loss.
    ///
    /// # Returns
    /// A tuple of (total_loss, loss_dict) where loss_dict holds `style_{i}`, `content`
    /// and `tv` entries for the terms that are enabled.
    ///
    /// # Panics
    ///
    /// Panics if style terms are enabled and the number of style feature maps differs
    /// from the number of style targets.
    pub fn forward(&self, input: StyleTransferInput<B>) -> (Tensor<B, 1>, HashMap<String, f64>) {
        let StyleTransferInput {
            style_features,
            generated_content,
            true_content,
            image,
        } = input;
        let device = image.device();

        if !self.style.is_empty() {
            assert_eq!(
                style_features.len(),
                self.style.len(),
                "Expected generated features for {} style layers, got {}",
                self.style.len(),
                style_features.len()
            );
        }

        let mut total_loss: Option<Tensor<B, 1>> = None;
        let mut loss_dict: HashMap<String, f64> = HashMap::new();
        let mut accumulate = |name: String, loss: Tensor<B, 1>| {
            loss_dict.insert(name, loss.clone().into_scalar().to_f64());
            total_loss = Some(match total_loss.take() {
                Some(t) => t + loss,
                None => loss,
            });
        };

        for (index, (regularizer, generated)) in self.style.iter().zip(style_features).enumerate() {
            accumulate(format!("style_{index}"), regularizer.forward(generated));
        }

        if let Some(ref content) = self.content {
            accumulate("content".to_owned(), content.forward(generated_content, true_content));
        }

        if let Some(ref tv) = self.tv {
            accumulate("tv".to_owned(), tv.forward(image));
        }

        let total_loss = total_loss.unwrap_or_else(|| Tensor::zeros([1], &device));
        tracing::debug!(terms = loss_dict.len(), "style transfer loss computed");

        (total_loss, loss_dict)
    }
}

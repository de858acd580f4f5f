//! Total-variation regularizer enforcing smoothness of the generated image.
//!
//! For every interior pixel the squared differences to its successor along each
//! spatial axis are added and raised to the power 1.25:
//!
//! ```text
//! a = (x[i, j] - x[i + 1, j])²      over i < width - 1, j < height - 1
//! b = (x[i, j] - x[i, j + 1])²
//! L = weight * mean(sum((a + b)^1.25))
//! ```
//!
//! The first spatial axis in storage order is paired with `img_width` and the
//! second with `img_height`, in both layouts.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Ignored, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor},
};
use burn_extra_ops::{TensorExtraOps, Window};

use crate::{DataLayout, LayerOutputs, Regularizer, RegularizerError, RegularizerResult};

/// Exponent applied to the summed squared neighbour differences.
pub const TV_EXPONENT: f64 = 1.25;

/// Configuration for creating a [total-variation regularizer](TotalVariationRegularizer).
#[derive(Config, Debug)]
pub struct TotalVariationRegularizerConfig {
    /// Extent of the first spatial axis of the generated image.
    pub img_width: usize,
    /// Extent of the second spatial axis of the generated image.
    pub img_height: usize,
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
    /// Channel ordering of the image batch. Default: channels first
    #[config(default = "DataLayout::ChannelsFirst")]
    pub layout: DataLayout,
}

impl TotalVariationRegularizerConfig {
    /// Initialize [total-variation regularizer](TotalVariationRegularizer).
    pub fn init(&self) -> TotalVariationRegularizer {
        self.assertions();
        TotalVariationRegularizer {
            img_width: self.img_width,
            img_height: self.img_height,
            weight: self.weight,
            layout: Ignored(self.layout),
        }
    }

    fn assertions(&self) {
        assert!(
            self.img_width >= 2 && self.img_height >= 2,
            "Image for TotalVariationRegularizer must be at least 2x2, got {}x{}",
            self.img_width,
            self.img_height
        );
        assert!(
            self.weight.is_finite() && self.weight >= 0.0,
            "Weight for TotalVariationRegularizer must be non-negative, got {}",
            self.weight
        );
    }
}

/// Total-variation smoothness regularizer for the generated image.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct TotalVariationRegularizer {
    /// Extent of the first spatial axis.
    pub img_width: usize,
    /// Extent of the second spatial axis.
    pub img_height: usize,
    /// Weight factor applied to the loss.
    pub weight: f64,
    layout: Ignored<DataLayout>,
}

impl ModuleDisplay for TotalVariationRegularizer {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("img_width", &self.img_width)
            .add("img_height", &self.img_height)
            .add("weight", &self.weight)
            .optional()
    }
}

impl TotalVariationRegularizer {
    /// Channel ordering the image is read with.
    pub fn layout(&self) -> DataLayout {
        *self.layout
    }

    /// Compute the total-variation loss of a batch of images.
    ///
    /// # Shapes
    ///
    /// - image: `[N, C, width, height]` or `[N, width, height, C]`
    /// - output: `[1]`
    ///
    /// # Panics
    ///
    /// Panics if the spatial axes are not exactly `img_width` by `img_height`.
    pub fn forward<B: Backend>(&self, image: Tensor<B, 4>) -> Tensor<B, 1> {
        if let Err(err) = self.check_spatial_dims(&image) {
            panic!("{err}");
        }

        let [width_axis, height_axis] = self.layout.spatial_axes();
        let mut interior = image.dims();
        interior[width_axis] = self.img_width - 1;
        interior[height_axis] = self.img_height - 1;
        let interior = Window::from_extent(interior);

        let a = image
            .clone()
            .neighbour_difference(interior, width_axis)
            .powi_scalar(2);
        let b = image
            .neighbour_difference(interior, height_axis)
            .powi_scalar(2);

        (a + b)
            .powf_scalar(TV_EXPONENT)
            .sum()
            .mean()
            .mul_scalar(self.weight)
    }

    fn check_spatial_dims<B: Backend>(&self, image: &Tensor<B, 4>) -> RegularizerResult<()> {
        let dims = image.dims();
        let [width_axis, height_axis] = self.layout.spatial_axes();
        if dims[width_axis] == self.img_width && dims[height_axis] == self.img_height {
            return Ok(());
        }

        Err(RegularizerError::InvalidTensorShape {
            expected: format!(
                "{}x{} image ({:?})",
                self.img_width, self.img_height, *self.layout
            ),
            actual: format!("{dims:?}"),
        })
    }
}

/// Output 0: the generated image batch.
impl<B: Backend> Regularizer<B, 4> for TotalVariationRegularizer {
    fn arity(&self) -> usize {
        1
    }

    fn regularize(&self, outputs: &LayerOutputs<B, 4>) -> RegularizerResult<Tensor<B, 1>> {
        let image = outputs.get(0, "image")?;
        self.check_spatial_dims(&image)?;
        Ok(self.forward(image))
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{Distribution, Int, TensorData, Tolerance, Transaction};

    use super::*;
    use crate::tests::{TestAutodiffBackend, TestBackend, FT};

    fn checkerboard(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::from_data(
            TensorData::from([[[
                [0.0, 1.0, 0.0, 1.0],
                [1.0, 0.0, 1.0, 0.0],
                [0.0, 1.0, 0.0, 1.0],
                [1.0, 0.0, 1.0, 0.0],
            ]]]),
            device,
        )
    }

    /// 3x3 interior pixels, each with a = b = 1: 9 * (1 + 1)^1.25
    fn checkerboard_loss() -> f64 {
        9.0 * 2.0_f64.powf(TV_EXPONENT)
    }

    #[test]
    fn tv_loss_constant_image_returns_zero() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(4, 4).init();
        let image = Tensor::<TestBackend, 4>::full([2, 3, 4, 4], 0.7, &device);

        let result = loss.forward(image);

        result
            .into_data()
            .assert_approx_eq::<FT>(&TensorData::from([0.0]), Tolerance::default());
    }

    #[test]
    fn tv_loss_checkerboard_matches_closed_form() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(4, 4).init();

        let result = loss.forward(checkerboard(&device));

        let expected = TensorData::from([checkerboard_loss()]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::relative(1e-4));
    }

    #[test]
    fn tv_loss_checkerboard_channels_last_matches_closed_form() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(4, 4)
            .with_layout(DataLayout::ChannelsLast)
            .init();

        let result = loss.forward(checkerboard(&device).permute([0, 2, 3, 1]));

        let expected = TensorData::from([checkerboard_loss()]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::relative(1e-4));
    }

    #[test]
    fn tv_loss_wrong_layout_gives_different_result_without_panicking() {
        let device = Default::default();
        // [1, 4, 4, 4] where only axis 1 varies: flat along axes 2 and 3, a ramp of
        // step 1 along axis 1.
        let image = Tensor::<TestBackend, 1, Int>::arange(0..4, &device)
            .float()
            .reshape([1, 4, 1, 1])
            .repeat_dim(2, 4)
            .repeat_dim(3, 4);

        let channels_first = TotalVariationRegularizerConfig::new(4, 4).init();
        let channels_last = TotalVariationRegularizerConfig::new(4, 4)
            .with_layout(DataLayout::ChannelsLast)
            .init();

        let [first_data, last_data] = Transaction::default()
            .register(channels_first.forward(image.clone()))
            .register(channels_last.forward(image))
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        // Channels last reads axis 1 as spatial: 4 channels * 3 * 3 interior pixels, a = 1
        first_data.assert_approx_eq::<FT>(&TensorData::from([0.0]), Tolerance::default());
        last_data.assert_approx_eq::<FT>(&TensorData::from([36.0]), Tolerance::relative(1e-4));
    }

    #[test]
    fn tv_loss_only_counts_interior_pixels() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(3, 3).init();
        // Only the last row and column differ: they are never the base of a difference,
        // but they are the neighbours of the interior pixels next to them.
        let image = Tensor::<TestBackend, 4>::from_data(
            TensorData::from([[[[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]]]]),
            &device,
        );

        let result = loss.forward(image);

        // Interior [0..2, 0..2]: (0,1) b=1, (1,0) a=1, (1,1) a=1 b=1, (0,0) nothing
        let expected = 2.0 + 2.0_f64.powf(TV_EXPONENT);
        result
            .into_data()
            .assert_approx_eq::<FT>(&TensorData::from([expected]), Tolerance::relative(1e-4));
    }

    #[test]
    fn tv_loss_doubling_weight_doubles_loss() {
        let device = Default::default();
        let image = Tensor::<TestBackend, 4>::random(
            [2, 3, 5, 5],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let single = TotalVariationRegularizerConfig::new(5, 5).with_weight(0.5).init();
        let double = TotalVariationRegularizerConfig::new(5, 5).with_weight(1.0).init();

        let [single_data, double_data] = Transaction::default()
            .register(single.forward(image.clone()).mul_scalar(2.0))
            .register(double.forward(image))
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        single_data.assert_approx_eq::<FT>(&double_data, Tolerance::default());
    }

    #[test]
    fn tv_loss_pairs_first_spatial_axis_with_width() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(3, 5).init();
        let image = Tensor::<TestBackend, 4>::zeros([1, 1, 3, 5], &device);

        let result = loss.forward(image);

        assert_eq!(result.dims(), [1]);
    }

    #[test]
    #[should_panic = "Invalid input tensor shape"]
    fn tv_loss_mismatched_image_size_panics() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(3, 5).init();

        let _result = loss.forward(Tensor::<TestBackend, 4>::zeros([1, 1, 5, 3], &device));
    }

    #[test]
    fn regularize_reports_missing_image() {
        let loss = TotalVariationRegularizerConfig::new(4, 4).init();

        let error = loss
            .regularize(&LayerOutputs::<TestBackend, 4>::new(Vec::new()))
            .unwrap_err();

        assert_eq!(
            error,
            RegularizerError::MissingOutput {
                role: "image",
                index: 0,
                available: 0,
            }
        );
    }

    #[test]
    fn regularize_reports_wrong_image_size() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(4, 4).init();
        let outputs =
            LayerOutputs::new(vec![Tensor::<TestBackend, 4>::zeros([1, 3, 8, 8], &device)]);

        let error = loss.regularize(&outputs).unwrap_err();

        assert!(matches!(error, RegularizerError::InvalidTensorShape { .. }));
    }

    #[test]
    fn tv_loss_produces_gradients_for_image() {
        let device = Default::default();
        let loss = TotalVariationRegularizerConfig::new(4, 4).init();
        let image =
            Tensor::<TestAutodiffBackend, 4>::from_data(checkerboard(&device).into_data(), &device)
                .require_grad();

        let grads = loss.forward(image.clone()).backward();
        let grad = image.grad(&grads).expect("image is tracked");

        assert_eq!(grad.dims(), [1, 1, 4, 4]);
        let total_magnitude: f32 = grad.abs().sum().into_scalar();
        assert!(total_magnitude > 0.0);
    }

    #[test]
    #[should_panic = "must be at least 2x2"]
    fn tv_config_degenerate_image_panics() {
        let _loss = TotalVariationRegularizerConfig::new(1, 4).init();
    }

    #[test]
    fn tv_config_round_trips_through_json() {
        let config = TotalVariationRegularizerConfig::new(256, 128)
            .with_weight(8.5e-5)
            .with_layout(DataLayout::ChannelsLast);

        let restored = TotalVariationRegularizerConfig::load_binary(config.to_string().as_bytes())
            .expect("config serializes to valid JSON");

        assert_eq!(restored.img_width, 256);
        assert_eq!(restored.img_height, 128);
        assert_eq!(restored.weight, 8.5e-5);
        assert_eq!(restored.layout, DataLayout::ChannelsLast);
    }

    #[test]
    fn tv_loss_display_shows_parameters() {
        let loss = TotalVariationRegularizerConfig::new(4, 4).with_weight(0.5).init();

        let display = format!("{loss}");

        assert!(display.starts_with("TotalVariationRegularizer"));
        assert!(display.contains("weight: 0.5"));
    }
}

//! Channel ordering of feature maps and images.

use burn::prelude::*;

/// Where the channel axis sits relative to the spatial axes.
///
/// Every shape-dependent computation in this crate branches on this value. It is
/// never inferred from the tensors themselves: a layout that disagrees with the
/// actual memory order of the data does not fail, it silently produces losses over
/// the wrong axes.
#[derive(Config, Debug, Copy, PartialEq, Eq, Hash)]
pub enum DataLayout {
    /// Feature maps are `[C, H, W]`, images are `[N, C, H, W]`.
    ChannelsFirst,
    /// Feature maps are `[H, W, C]`, images are `[N, H, W, C]`.
    ChannelsLast,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::ChannelsFirst
    }
}

impl DataLayout {
    /// Reorders a single feature map to `[C, H, W]`.
    pub fn to_channels_first<B: Backend>(self, features: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            Self::ChannelsFirst => features,
            Self::ChannelsLast => features.permute([2, 0, 1]),
        }
    }

    /// Channel count of a single feature map of shape `dims`.
    pub const fn channels(self, dims: [usize; 3]) -> usize {
        match self {
            Self::ChannelsFirst => dims[0],
            Self::ChannelsLast => dims[2],
        }
    }

    /// The two spatial axes of a batched image, in storage order.
    pub const fn spatial_axes(self) -> [usize; 2] {
        match self {
            Self::ChannelsFirst => [2, 3],
            Self::ChannelsLast => [1, 2],
        }
    }
}

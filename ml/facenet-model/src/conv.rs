//! Convolution unit: conv2d with optional batch norm and activation.

use burn::module::{Ignored, Module};
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// Batch-norm epsilon used throughout the network.
const BATCH_NORM_EPSILON: f64 = 1e-3;

/// Batch-norm running-stat momentum (exponential decay 0.995).
const BATCH_NORM_MOMENTUM: f64 = 0.005;

/// Configuration for a [`ConvUnit`].
///
/// Defaults: stride 1, same padding, no batch norm, `ReLU` activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvUnitConfig {
    /// Input and output channels `[in, out]`.
    pub channels: [usize; 2],

    /// Kernel size `[height, width]`.
    pub kernel_size: [usize; 2],

    /// Stride `[height, width]`.
    pub stride: [usize; 2],

    /// Padding mode.
    pub padding: PaddingConfig2d,

    /// Whether to apply batch normalization after the convolution.
    pub batch_norm: bool,

    /// Activation applied last, `None` for a linear unit.
    pub activation: Option<Activation>,
}

impl ConvUnitConfig {
    /// Creates a configuration with the default stride, padding, and activation.
    #[must_use]
    pub const fn new(channels: [usize; 2], kernel_size: [usize; 2]) -> Self {
        Self {
            channels,
            kernel_size,
            stride: [1, 1],
            padding: PaddingConfig2d::Same,
            batch_norm: false,
            activation: Some(Activation::Relu),
        }
    }

    /// Sets the stride.
    #[must_use]
    pub const fn with_stride(mut self, stride: [usize; 2]) -> Self {
        self.stride = stride;
        self
    }

    /// Sets the padding mode.
    #[must_use]
    pub fn with_padding(mut self, padding: PaddingConfig2d) -> Self {
        self.padding = padding;
        self
    }

    /// Enables or disables batch normalization.
    #[must_use]
    pub const fn with_batch_norm(mut self, batch_norm: bool) -> Self {
        self.batch_norm = batch_norm;
        self
    }

    /// Sets the activation, `None` for a linear unit.
    #[must_use]
    pub const fn with_activation(mut self, activation: Option<Activation>) -> Self {
        self.activation = activation;
        self
    }
}

/// Convolution followed by optional batch norm and optional activation.
///
/// The repeated building block of the stem and of every branch in the
/// residual and reduction cells. Weights use Xavier uniform initialization.
/// When batch norm is attached the convolution carries no bias, matching the
/// usual conv/norm pairing.
#[derive(Debug, Module)]
pub struct ConvUnit<B: Backend> {
    conv: Conv2d<B>,
    norm: Option<BatchNorm<B, 2>>,
    activation: Ignored<Option<Activation>>,
}

impl<B: Backend> ConvUnit<B> {
    /// Creates a new conv unit.
    #[must_use]
    pub fn new(config: ConvUnitConfig, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new(config.channels, config.kernel_size)
            .with_stride(config.stride)
            .with_padding(config.padding)
            .with_bias(!config.batch_norm)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);

        let norm: Option<BatchNorm<B, 2>> = if config.batch_norm {
            Some(
                BatchNormConfig::new(config.channels[1])
                    .with_epsilon(BATCH_NORM_EPSILON)
                    .with_momentum(BATCH_NORM_MOMENTUM)
                    .init(device),
            )
        } else {
            None
        };

        Self {
            conv,
            norm,
            activation: Ignored(config.activation),
        }
    }

    /// Runs the forward pass.
    ///
    /// Input and output are `[batch, channels, height, width]`.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = self.conv.forward(input);
        if let Some(norm) = &self.norm {
            x = norm.forward(x);
        }
        match self.activation.0 {
            Some(activation) => activation.apply(x),
            None => x,
        }
    }
}

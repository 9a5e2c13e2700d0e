//! Grid-reduction cells of the Inception-ResNet-v1 architecture.
//!
//! Both cells halve the spatial grid with stride-2 valid-padded branches and
//! a stride-2 max pool, then concatenate along channels. The pool branch
//! passes the input channels through unchanged, so the output width is the
//! sum of the conv branch widths plus the input width.

use burn::module::Module;
use burn::nn::PaddingConfig2d;
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::conv::{ConvUnit, ConvUnitConfig};

fn grid_pool() -> MaxPool2d {
    MaxPool2dConfig::new([3, 3])
        .with_strides([2, 2])
        .with_padding(PaddingConfig2d::Valid)
        .init()
}

fn unit_config(
    channels: [usize; 2],
    kernel_size: [usize; 2],
    activation: Option<Activation>,
    batch_norm: bool,
) -> ConvUnitConfig {
    ConvUnitConfig::new(channels, kernel_size)
        .with_batch_norm(batch_norm)
        .with_activation(activation)
}

/// Configuration for [`ReductionA`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionAConfig {
    /// Input channels.
    pub channels: usize,

    /// Branch widths `[k, l, m, n]`: `k`/`l`/`m` for the three-conv chain,
    /// `n` for the single stride-2 conv.
    pub widths: [usize; 4],

    /// Activation for the branch convs, `None` for linear.
    pub activation: Option<Activation>,

    /// Whether branch convs are batch-normalized.
    pub batch_norm: bool,
}

impl ReductionAConfig {
    /// Creates a reduction-A configuration.
    #[must_use]
    pub const fn new(channels: usize, widths: [usize; 4]) -> Self {
        Self {
            channels,
            widths,
            activation: Some(Activation::Relu),
            batch_norm: false,
        }
    }

    /// Sets the activation.
    #[must_use]
    pub const fn with_activation(mut self, activation: Option<Activation>) -> Self {
        self.activation = activation;
        self
    }

    /// Enables or disables batch norm on the branch convs.
    #[must_use]
    pub const fn with_batch_norm(mut self, batch_norm: bool) -> Self {
        self.batch_norm = batch_norm;
        self
    }

    /// Output channels: `n + m + input`.
    #[must_use]
    pub const fn out_channels(&self) -> usize {
        self.widths[3] + self.widths[2] + self.channels
    }
}

/// Reduction-A: stride-2 conv, 1x1/3x3/3x3 stride-2 chain, and max pool.
///
/// Halves the spatial grid after the block-A stack (`Mixed_6a`).
#[derive(Debug, Module)]
pub struct ReductionA<B: Backend> {
    branch0: ConvUnit<B>,
    branch1_0: ConvUnit<B>,
    branch1_1: ConvUnit<B>,
    branch1_2: ConvUnit<B>,
    pool: MaxPool2d,
}

impl<B: Backend> ReductionA<B> {
    /// Creates a new reduction-A cell.
    #[must_use]
    pub fn new(config: ReductionAConfig, device: &B::Device) -> Self {
        let ReductionAConfig {
            channels,
            widths: [k, l, m, n],
            activation,
            batch_norm,
        } = config;

        let branch0 = ConvUnit::new(
            unit_config([channels, n], [3, 3], activation, batch_norm)
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Valid),
            device,
        );
        let branch1_0 = ConvUnit::new(
            unit_config([channels, k], [1, 1], activation, batch_norm),
            device,
        );
        let branch1_1 = ConvUnit::new(unit_config([k, l], [3, 3], activation, batch_norm), device);
        let branch1_2 = ConvUnit::new(
            unit_config([l, m], [3, 3], activation, batch_norm)
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Valid),
            device,
        );

        Self {
            branch0,
            branch1_0,
            branch1_1,
            branch1_2,
            pool: grid_pool(),
        }
    }

    /// Runs the forward pass, halving the spatial grid.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let b0 = self.branch0.forward(input.clone());
        let b1 = self.branch1_2.forward(
            self.branch1_1.forward(self.branch1_0.forward(input.clone())),
        );
        let pooled = self.pool.forward(input);

        Tensor::cat(vec![b0, b1, pooled], 1)
    }
}

/// Configuration for [`ReductionB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionBConfig {
    /// Input channels.
    pub channels: usize,

    /// Branch widths `[narrow, wide]`: every 1x1 and inner conv uses the
    /// narrow width; the first branch expands to the wide width.
    pub widths: [usize; 2],

    /// Activation for the branch convs, `None` for linear.
    pub activation: Option<Activation>,

    /// Whether branch convs are batch-normalized.
    pub batch_norm: bool,
}

impl ReductionBConfig {
    /// Creates a reduction-B configuration.
    #[must_use]
    pub const fn new(channels: usize, widths: [usize; 2]) -> Self {
        Self {
            channels,
            widths,
            activation: Some(Activation::Relu),
            batch_norm: false,
        }
    }

    /// Sets the activation.
    #[must_use]
    pub const fn with_activation(mut self, activation: Option<Activation>) -> Self {
        self.activation = activation;
        self
    }

    /// Enables or disables batch norm on the branch convs.
    #[must_use]
    pub const fn with_batch_norm(mut self, batch_norm: bool) -> Self {
        self.batch_norm = batch_norm;
        self
    }

    /// Output channels: `wide + 2 * narrow + input`.
    #[must_use]
    pub const fn out_channels(&self) -> usize {
        self.widths[1] + self.widths[0] + self.widths[0] + self.channels
    }
}

/// Reduction-B: three stride-2 conv chains and max pool.
///
/// Halves the spatial grid after the block-B stack (`Mixed_7a`).
#[derive(Debug, Module)]
pub struct ReductionB<B: Backend> {
    branch0_0: ConvUnit<B>,
    branch0_1: ConvUnit<B>,
    branch1_0: ConvUnit<B>,
    branch1_1: ConvUnit<B>,
    branch2_0: ConvUnit<B>,
    branch2_1: ConvUnit<B>,
    branch2_2: ConvUnit<B>,
    pool: MaxPool2d,
}

impl<B: Backend> ReductionB<B> {
    /// Creates a new reduction-B cell.
    #[must_use]
    pub fn new(config: ReductionBConfig, device: &B::Device) -> Self {
        let ReductionBConfig {
            channels,
            widths: [narrow, wide],
            activation,
            batch_norm,
        } = config;

        let stride2 = |channels: [usize; 2]| {
            unit_config(channels, [3, 3], activation, batch_norm)
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Valid)
        };

        Self {
            branch0_0: ConvUnit::new(
                unit_config([channels, narrow], [1, 1], activation, batch_norm),
                device,
            ),
            branch0_1: ConvUnit::new(stride2([narrow, wide]), device),
            branch1_0: ConvUnit::new(
                unit_config([channels, narrow], [1, 1], activation, batch_norm),
                device,
            ),
            branch1_1: ConvUnit::new(stride2([narrow, narrow]), device),
            branch2_0: ConvUnit::new(
                unit_config([channels, narrow], [1, 1], activation, batch_norm),
                device,
            ),
            branch2_1: ConvUnit::new(
                unit_config([narrow, narrow], [3, 3], activation, batch_norm),
                device,
            ),
            branch2_2: ConvUnit::new(stride2([narrow, narrow]), device),
            pool: grid_pool(),
        }
    }

    /// Runs the forward pass, halving the spatial grid.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let b0 = self.branch0_1.forward(self.branch0_0.forward(input.clone()));
        let b1 = self.branch1_1.forward(self.branch1_0.forward(input.clone()));
        let b2 = self.branch2_2.forward(
            self.branch2_1.forward(self.branch2_0.forward(input.clone())),
        );
        let pooled = self.pool.forward(input);

        Tensor::cat(vec![b0, b1, b2, pooled], 1)
    }
}

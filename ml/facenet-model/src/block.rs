//! Residual blocks of the Inception-ResNet-v1 architecture.
//!
//! Each block runs a few parallel conv branches over its input, concatenates
//! the branch outputs, projects them back to the input channel count with a
//! linear 1x1 convolution, and adds the scaled projection to the input. The
//! block activation applies to every branch conv and to the residual sum;
//! `None` yields a fully linear block. Channel count and spatial size are
//! preserved.

use burn::module::{Ignored, Module};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::conv::{ConvUnit, ConvUnitConfig};

fn branch<B: Backend>(
    channels: [usize; 2],
    kernel_size: [usize; 2],
    activation: Option<Activation>,
    batch_norm: bool,
    device: &B::Device,
) -> ConvUnit<B> {
    ConvUnit::new(
        ConvUnitConfig::new(channels, kernel_size)
            .with_batch_norm(batch_norm)
            .with_activation(activation),
        device,
    )
}

// The projection back to the input width stays linear and un-normalized in
// every block.
fn projection<B: Backend>(channels: [usize; 2], device: &B::Device) -> ConvUnit<B> {
    ConvUnit::new(
        ConvUnitConfig::new(channels, [1, 1]).with_activation(None),
        device,
    )
}

fn residual<B: Backend>(
    input: Tensor<B, 4>,
    up: Tensor<B, 4>,
    scale: f64,
    activation: Option<Activation>,
) -> Tensor<B, 4> {
    let out = input + up.mul_scalar(scale);
    match activation {
        Some(activation) => activation.apply(out),
        None => out,
    }
}

/// Configuration shared by the three residual block types.
///
/// Defaults: scale 1.0, `ReLU` activation, no batch norm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Input (and output) channels.
    pub channels: usize,

    /// Branch width.
    pub width: usize,

    /// Residual scale applied to the projection before the add.
    pub scale: f64,

    /// Activation for branch convs and the residual sum, `None` for linear.
    pub activation: Option<Activation>,

    /// Whether branch convs are batch-normalized.
    pub batch_norm: bool,
}

impl BlockConfig {
    /// Creates a block configuration.
    #[must_use]
    pub const fn new(channels: usize, width: usize) -> Self {
        Self {
            channels,
            width,
            scale: 1.0,
            activation: Some(Activation::Relu),
            batch_norm: false,
        }
    }

    /// Sets the residual scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the activation, `None` for a linear block.
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
}

/// Block-A: three branches (1x1; 1x1 then 3x3; 1x1 then two 3x3).
///
/// Operates on the large grid between the stem and the first reduction.
#[derive(Debug, Module)]
pub struct BlockA<B: Backend> {
    branch0: ConvUnit<B>,
    branch1_0: ConvUnit<B>,
    branch1_1: ConvUnit<B>,
    branch2_0: ConvUnit<B>,
    branch2_1: ConvUnit<B>,
    branch2_2: ConvUnit<B>,
    project: ConvUnit<B>,
    scale: f64,
    activation: Ignored<Option<Activation>>,
}

impl<B: Backend> BlockA<B> {
    /// Creates a new block-A.
    #[must_use]
    pub fn new(config: BlockConfig, device: &B::Device) -> Self {
        let BlockConfig {
            channels,
            width,
            scale,
            activation,
            batch_norm,
        } = config;

        Self {
            branch0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_1: branch([width, width], [3, 3], activation, batch_norm, device),
            branch2_0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch2_1: branch([width, width], [3, 3], activation, batch_norm, device),
            branch2_2: branch([width, width], [3, 3], activation, batch_norm, device),
            project: projection([3 * width, channels], device),
            scale,
            activation: Ignored(activation),
        }
    }

    /// Runs the forward pass, preserving shape.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let b0 = self.branch0.forward(input.clone());
        let b1 = self.branch1_1.forward(self.branch1_0.forward(input.clone()));
        let b2 = self
            .branch2_2
            .forward(self.branch2_1.forward(self.branch2_0.forward(input.clone())));

        let mixed = Tensor::cat(vec![b0, b1, b2], 1);
        let up = self.project.forward(mixed);
        residual(input, up, self.scale, self.activation.0)
    }
}

/// Block-B: two branches (1x1; 1x1 then 1x7 then 7x1).
///
/// Operates on the mid grid between the two reductions.
#[derive(Debug, Module)]
pub struct BlockB<B: Backend> {
    branch0: ConvUnit<B>,
    branch1_0: ConvUnit<B>,
    branch1_1: ConvUnit<B>,
    branch1_2: ConvUnit<B>,
    project: ConvUnit<B>,
    scale: f64,
    activation: Ignored<Option<Activation>>,
}

impl<B: Backend> BlockB<B> {
    /// Creates a new block-B.
    #[must_use]
    pub fn new(config: BlockConfig, device: &B::Device) -> Self {
        let BlockConfig {
            channels,
            width,
            scale,
            activation,
            batch_norm,
        } = config;

        Self {
            branch0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_1: branch([width, width], [1, 7], activation, batch_norm, device),
            branch1_2: branch([width, width], [7, 1], activation, batch_norm, device),
            project: projection([2 * width, channels], device),
            scale,
            activation: Ignored(activation),
        }
    }

    /// Runs the forward pass, preserving shape.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let b0 = self.branch0.forward(input.clone());
        let b1 = self.branch1_2.forward(
            self.branch1_1.forward(self.branch1_0.forward(input.clone())),
        );

        let mixed = Tensor::cat(vec![b0, b1], 1);
        let up = self.project.forward(mixed);
        residual(input, up, self.scale, self.activation.0)
    }
}

/// Block-C: two branches (1x1; 1x1 then 1x3 then 3x1).
///
/// Operates on the small grid after the second reduction. The network's last
/// block is a block-C with `None` activation and scale 1.0.
#[derive(Debug, Module)]
pub struct BlockC<B: Backend> {
    branch0: ConvUnit<B>,
    branch1_0: ConvUnit<B>,
    branch1_1: ConvUnit<B>,
    branch1_2: ConvUnit<B>,
    project: ConvUnit<B>,
    scale: f64,
    activation: Ignored<Option<Activation>>,
}

impl<B: Backend> BlockC<B> {
    /// Creates a new block-C.
    #[must_use]
    pub fn new(config: BlockConfig, device: &B::Device) -> Self {
        let BlockConfig {
            channels,
            width,
            scale,
            activation,
            batch_norm,
        } = config;

        Self {
            branch0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_0: branch([channels, width], [1, 1], activation, batch_norm, device),
            branch1_1: branch([width, width], [1, 3], activation, batch_norm, device),
            branch1_2: branch([width, width], [3, 1], activation, batch_norm, device),
            project: projection([2 * width, channels], device),
            scale,
            activation: Ignored(activation),
        }
    }

    /// Runs the forward pass, preserving shape.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let b0 = self.branch0.forward(input.clone());
        let b1 = self.branch1_2.forward(
            self.branch1_1.forward(self.branch1_0.forward(input.clone())),
        );

        let mixed = Tensor::cat(vec![b0, b1], 1);
        let up = self.project.forward(mixed);
        residual(input, up, self.scale, self.activation.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn block_a_preserves_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockA::<TestBackend>::new(BlockConfig::new(64, 8).with_scale(0.17), &device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 64, 9, 9], &device);
        let output = block.forward(input);

        assert_eq!(output.dims(), [2, 64, 9, 9]);
    }

    #[test]
    fn block_a_zero_scale_is_identity_on_nonnegative_input() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockA::<TestBackend>::new(BlockConfig::new(8, 4).with_scale(0.0), &device);

        let input = Tensor::<TestBackend, 4>::ones([1, 8, 5, 5], &device);
        let output = block.forward(input.clone());

        let expected = input.into_data().to_vec::<f32>().unwrap();
        let actual = output.into_data().to_vec::<f32>().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn block_a_with_batch_norm() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockA::<TestBackend>::new(
            BlockConfig::new(16, 4).with_scale(0.17).with_batch_norm(true),
            &device,
        );

        let input = Tensor::<TestBackend, 4>::ones([1, 16, 7, 7], &device);
        let output = block.forward(input);

        assert_eq!(output.dims(), [1, 16, 7, 7]);
    }

    #[test]
    fn block_b_preserves_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockB::<TestBackend>::new(BlockConfig::new(32, 16).with_scale(0.10), &device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 32, 11, 11], &device);
        let output = block.forward(input);

        assert_eq!(output.dims(), [2, 32, 11, 11]);
    }

    #[test]
    fn block_c_preserves_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockC::<TestBackend>::new(BlockConfig::new(48, 12).with_scale(0.20), &device);

        let input = Tensor::<TestBackend, 4>::zeros([1, 48, 3, 3], &device);
        let output = block.forward(input);

        assert_eq!(output.dims(), [1, 48, 3, 3]);
    }

    #[test]
    fn linear_block_c_is_deterministic() {
        let device = <TestBackend as Backend>::Device::default();
        let block = BlockC::<TestBackend>::new(
            BlockConfig::new(12, 6).with_activation(None),
            &device,
        );

        let input = Tensor::<TestBackend, 4>::ones([1, 12, 4, 4], &device);
        let first = block.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let second = block.forward(input).into_data().to_vec::<f32>().unwrap();

        assert_eq!(first, second);
    }
}

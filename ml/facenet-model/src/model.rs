//! Inception-ResNet-v1 network assembly.
//!
//! The network is a fixed composition of Burn layer primitives: a conv stem,
//! three stacks of residual blocks separated by two grid reductions, global
//! average pooling, dropout, and a linear bottleneck producing the embedding.
//! Channel counts come from a [`Widths`] plan; the [`Variant`] selects the
//! stem layout and normalization scheme.

use burn::module::{Ignored, Module};
use burn::nn::pool::{
    AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig,
};
use burn::nn::{
    Dropout, DropoutConfig, Initializer, Linear, LinearConfig, PaddingConfig2d,
};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::block::{BlockA, BlockB, BlockC, BlockConfig};
use crate::conv::{ConvUnit, ConvUnitConfig};
use crate::endpoints::{EndPoints, Stage};
use crate::error::{ModelError, Result};
use crate::reduction::{ReductionA, ReductionAConfig, ReductionB, ReductionBConfig};
use crate::widths::Widths;

/// Default embedding size of the bottleneck layer.
pub const DEFAULT_EMBEDDING_SIZE: usize = 128;

/// Default keep probability for the pre-bottleneck dropout.
pub const DEFAULT_DROPOUT_KEEP: f64 = 0.8;

const BLOCK_A_REPEATS: usize = 5;
const BLOCK_B_REPEATS: usize = 10;
const BLOCK_C_REPEATS: usize = 5;

const BLOCK_A_SCALE: f64 = 0.17;
const BLOCK_B_SCALE: f64 = 0.10;
const BLOCK_C_SCALE: f64 = 0.20;

/// Network variant selecting the stem layout and normalization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Seven-stage stem with valid-padded `Conv2d_4a`, no batch norm.
    #[default]
    Full,

    /// Six-stage stem: `Conv2d_4a` is same-padded, `Conv2d_4b` is absent,
    /// and every conv unit is batch-normalized.
    Reduced,
}

impl Variant {
    /// Returns the variant name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for [`InceptionResnetV1`].
///
/// # Example
///
/// ```
/// use facenet_model::InceptionResnetV1Config;
///
/// let config = InceptionResnetV1Config::new().with_embedding_size(512);
/// assert_eq!(config.embedding_size, 512);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InceptionResnetV1Config {
    /// Network variant.
    pub variant: Variant,

    /// Channel-width plan.
    pub widths: Widths,

    /// Keep probability for the pre-bottleneck dropout.
    pub dropout_keep: f64,

    /// Width of the embedding produced by the bottleneck layer.
    pub embedding_size: usize,

    /// L2 coefficient surfaced for the optimizer; the network itself does
    /// not consume it.
    pub weight_decay: f64,

    /// Activation used by the stem, branch convs, and residual sums.
    pub activation: Activation,
}

impl Default for InceptionResnetV1Config {
    fn default() -> Self {
        Self::new()
    }
}

impl InceptionResnetV1Config {
    /// Creates the full-variant configuration with the standard width plan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variant: Variant::Full,
            widths: Widths::standard(),
            dropout_keep: DEFAULT_DROPOUT_KEEP,
            embedding_size: DEFAULT_EMBEDDING_SIZE,
            weight_decay: 0.0,
            activation: Activation::Relu,
        }
    }

    /// Creates the reduced-variant configuration with the reduced width plan.
    #[must_use]
    pub const fn reduced() -> Self {
        Self {
            variant: Variant::Reduced,
            widths: Widths::reduced(),
            dropout_keep: DEFAULT_DROPOUT_KEEP,
            embedding_size: DEFAULT_EMBEDDING_SIZE,
            weight_decay: 0.0,
            activation: Activation::Relu,
        }
    }

    /// Sets the width plan.
    #[must_use]
    pub const fn with_widths(mut self, widths: Widths) -> Self {
        self.widths = widths;
        self
    }

    /// Sets the dropout keep probability.
    #[must_use]
    pub const fn with_dropout_keep(mut self, dropout_keep: f64) -> Self {
        self.dropout_keep = dropout_keep;
        self
    }

    /// Sets the embedding size.
    #[must_use]
    pub const fn with_embedding_size(mut self, embedding_size: usize) -> Self {
        self.embedding_size = embedding_size;
        self
    }

    /// Sets the weight decay coefficient.
    #[must_use]
    pub const fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Sets the activation.
    #[must_use]
    pub const fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidConfig` if the embedding size is zero, the
    /// dropout keep probability is outside `(0, 1]`, or the weight decay is
    /// negative.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_size == 0 {
            return Err(ModelError::invalid_config("embedding size must be > 0"));
        }
        if !(self.dropout_keep > 0.0 && self.dropout_keep <= 1.0) {
            return Err(ModelError::invalid_config(format!(
                "dropout keep probability must be in (0, 1], got {}",
                self.dropout_keep
            )));
        }
        if self.weight_decay < 0.0 {
            return Err(ModelError::invalid_config(format!(
                "weight decay must be nonnegative, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }

    /// Initializes the network on the given device.
    #[must_use]
    pub fn init<B: Backend>(&self, device: &B::Device) -> InceptionResnetV1<B> {
        InceptionResnetV1::new(*self, device)
    }
}

/// Inception-ResNet-v1 face embedding network.
///
/// Forward input is `[batch, 3, height, width]`; the output embedding is
/// `[batch, embedding_size]`. Output shapes are deterministic for a given
/// input shape and width plan. Dropout and batch-norm statistics follow the
/// backend's autodiff state, so inference passes are repeatable.
///
/// # Example
///
/// ```ignore
/// use facenet_model::{InceptionResnetV1, InceptionResnetV1Config};
///
/// let config = InceptionResnetV1Config::new();
/// let device = Default::default();
/// let model = InceptionResnetV1::<MyBackend>::new(config, &device);
///
/// let images = Tensor::zeros([4, 3, 160, 160], &device);
/// let embeddings = model.forward(images);
/// assert_eq!(embeddings.dims(), [4, 128]);
/// ```
#[derive(Debug, Module)]
pub struct InceptionResnetV1<B: Backend> {
    conv1a: ConvUnit<B>,
    conv2a: ConvUnit<B>,
    conv2b: ConvUnit<B>,
    pool3a: MaxPool2d,
    conv3b: ConvUnit<B>,
    conv4a: ConvUnit<B>,
    conv4b: Option<ConvUnit<B>>,
    blocks_a: Vec<BlockA<B>>,
    reduction_a: ReductionA<B>,
    blocks_b: Vec<BlockB<B>>,
    reduction_b: ReductionB<B>,
    blocks_c: Vec<BlockC<B>>,
    final_block: BlockC<B>,
    avg_pool: AdaptiveAvgPool2d,
    dropout: Dropout,
    bottleneck: Linear<B>,
    embedding_size: usize,
    variant: Ignored<Variant>,
}

fn record<B: Backend>(
    trace: &mut Option<&mut EndPoints<B>>,
    stage: Stage,
    tensor: &Tensor<B, 4>,
) {
    if let Some(trace) = trace.as_deref_mut() {
        trace.record_features(stage, tensor);
    }
}

impl<B: Backend> InceptionResnetV1<B> {
    /// Creates a new network.
    ///
    /// The configuration is not validated here; call
    /// [`InceptionResnetV1Config::validate`] first when the values come from
    /// outside the crate.
    #[must_use]
    pub fn new(config: InceptionResnetV1Config, device: &B::Device) -> Self {
        let widths = config.widths;
        let activation = Some(config.activation);
        let batch_norm = matches!(config.variant, Variant::Reduced);

        let unit = |channels: [usize; 2], kernel_size: [usize; 2]| {
            ConvUnitConfig::new(channels, kernel_size)
                .with_batch_norm(batch_norm)
                .with_activation(activation)
        };
        let block = |channels: usize, width: usize, scale: f64| {
            BlockConfig::new(channels, width)
                .with_scale(scale)
                .with_activation(activation)
                .with_batch_norm(batch_norm)
        };

        // The full stem ends with a stride-2 conv; the reduced stem stops at
        // the same-padded Conv2d_4a.
        let conv4a_padding = match config.variant {
            Variant::Full => PaddingConfig2d::Valid,
            Variant::Reduced => PaddingConfig2d::Same,
        };
        let (conv4b, stem_out) = match config.variant {
            Variant::Full => (
                Some(ConvUnit::new(
                    unit([widths.stem_4a(), widths.stem_4b()], [3, 3])
                        .with_stride([2, 2])
                        .with_padding(PaddingConfig2d::Valid),
                    device,
                )),
                widths.stem_4b(),
            ),
            Variant::Reduced => (None, widths.stem_4a()),
        };

        let blocks_a: Vec<BlockA<B>> = (0..BLOCK_A_REPEATS)
            .map(|_| BlockA::new(block(stem_out, widths.block_a(), BLOCK_A_SCALE), device))
            .collect();

        let reduction_a_config = ReductionAConfig::new(stem_out, widths.reduction_a())
            .with_activation(activation)
            .with_batch_norm(batch_norm);
        let mid_channels = reduction_a_config.out_channels();

        let blocks_b: Vec<BlockB<B>> = (0..BLOCK_B_REPEATS)
            .map(|_| BlockB::new(block(mid_channels, widths.block_b(), BLOCK_B_SCALE), device))
            .collect();

        let reduction_b_config = ReductionBConfig::new(mid_channels, widths.reduction_b())
            .with_activation(activation)
            .with_batch_norm(batch_norm);
        let late_channels = reduction_b_config.out_channels();

        let blocks_c: Vec<BlockC<B>> = (0..BLOCK_C_REPEATS)
            .map(|_| BlockC::new(block(late_channels, widths.block_c(), BLOCK_C_SCALE), device))
            .collect();

        Self {
            conv1a: ConvUnit::new(
                unit([3, widths.stem_1a()], [3, 3])
                    .with_stride([2, 2])
                    .with_padding(PaddingConfig2d::Valid),
                device,
            ),
            conv2a: ConvUnit::new(
                unit([widths.stem_1a(), widths.stem_2a()], [3, 3])
                    .with_padding(PaddingConfig2d::Valid),
                device,
            ),
            conv2b: ConvUnit::new(unit([widths.stem_2a(), widths.stem_2b()], [3, 3]), device),
            pool3a: MaxPool2dConfig::new([3, 3])
                .with_strides([2, 2])
                .with_padding(PaddingConfig2d::Valid)
                .init(),
            conv3b: ConvUnit::new(
                unit([widths.stem_2b(), widths.stem_3b()], [1, 1])
                    .with_padding(PaddingConfig2d::Valid),
                device,
            ),
            conv4a: ConvUnit::new(
                unit([widths.stem_3b(), widths.stem_4a()], [3, 3]).with_padding(conv4a_padding),
                device,
            ),
            conv4b,
            blocks_a,
            reduction_a: ReductionA::new(reduction_a_config, device),
            blocks_b,
            reduction_b: ReductionB::new(reduction_b_config, device),
            blocks_c,
            // The last block stays fully linear, branches included.
            final_block: BlockC::new(
                BlockConfig::new(late_channels, widths.final_block())
                    .with_activation(None)
                    .with_batch_norm(batch_norm),
                device,
            ),
            avg_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(1.0 - config.dropout_keep).init(),
            bottleneck: LinearConfig::new(late_channels, config.embedding_size)
                .with_initializer(Initializer::XavierUniform { gain: 1.0 })
                .init(device),
            embedding_size: config.embedding_size,
            variant: Ignored(config.variant),
        }
    }

    /// Embedding width of the bottleneck output.
    #[must_use]
    pub const fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    /// Network variant.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant.0
    }

    /// Runs the forward pass.
    ///
    /// # Arguments
    ///
    /// - `input`: Image batch of shape `[batch, 3, height, width]`
    ///
    /// # Returns
    ///
    /// Embeddings of shape `[batch, embedding_size]`.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward_inner(input, None)
    }

    /// Runs the forward pass while recording every named stage output.
    ///
    /// Returns the embeddings together with the ordered [`EndPoints`] trace.
    pub fn forward_with_endpoints(&self, input: Tensor<B, 4>) -> (Tensor<B, 2>, EndPoints<B>) {
        let mut endpoints = EndPoints::new();
        let embedding = self.forward_inner(input, Some(&mut endpoints));
        (embedding, endpoints)
    }

    fn forward_inner(
        &self,
        input: Tensor<B, 4>,
        mut trace: Option<&mut EndPoints<B>>,
    ) -> Tensor<B, 2> {
        let mut x = self.conv1a.forward(input);
        record(&mut trace, Stage::Conv1a, &x);
        x = self.conv2a.forward(x);
        record(&mut trace, Stage::Conv2a, &x);
        x = self.conv2b.forward(x);
        record(&mut trace, Stage::Conv2b, &x);
        x = self.pool3a.forward(x);
        record(&mut trace, Stage::Pool3a, &x);
        x = self.conv3b.forward(x);
        record(&mut trace, Stage::Conv3b, &x);
        x = self.conv4a.forward(x);
        record(&mut trace, Stage::Conv4a, &x);
        if let Some(conv4b) = &self.conv4b {
            x = conv4b.forward(x);
            record(&mut trace, Stage::Conv4b, &x);
        }

        for block in &self.blocks_a {
            x = block.forward(x);
        }
        record(&mut trace, Stage::Mixed5a, &x);
        x = self.reduction_a.forward(x);
        record(&mut trace, Stage::Mixed6a, &x);

        for block in &self.blocks_b {
            x = block.forward(x);
        }
        record(&mut trace, Stage::Mixed6b, &x);
        x = self.reduction_b.forward(x);
        record(&mut trace, Stage::Mixed7a, &x);

        for block in &self.blocks_c {
            x = block.forward(x);
        }
        record(&mut trace, Stage::Mixed8a, &x);
        x = self.final_block.forward(x);
        record(&mut trace, Stage::Mixed8b, &x);
        record(&mut trace, Stage::PrePool, &x);

        let pooled = self.avg_pool.forward(x);
        let flat = self.dropout.forward(pooled.flatten::<2>(1, 3));
        if let Some(trace) = trace.as_deref_mut() {
            trace.record_flat(Stage::PreLogitsFlatten, &flat);
        }

        self.bottleneck.forward(flat)
    }
}

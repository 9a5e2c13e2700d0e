//! Named intermediate outputs collected during a traced forward pass.

use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Network stages that can be recorded during a traced forward pass.
///
/// [`Stage::name`] returns the historical label of each stage, which is kept
/// stable for comparison against shape traces of the reference architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// First stem convolution (stride 2).
    Conv1a,
    /// Second stem convolution.
    Conv2a,
    /// Third stem convolution (same padding).
    Conv2b,
    /// Stem max pool (stride 2).
    Pool3a,
    /// Post-pool 1x1 stem convolution.
    Conv3b,
    /// Fifth stem convolution.
    Conv4a,
    /// Final stem convolution (full variant only).
    Conv4b,
    /// Output of the block-A stack.
    Mixed5a,
    /// Output of reduction-A.
    Mixed6a,
    /// Output of the block-B stack.
    Mixed6b,
    /// Output of reduction-B.
    Mixed7a,
    /// Output of the block-C stack.
    Mixed8a,
    /// Output of the final linear block.
    Mixed8b,
    /// Features entering the global average pool.
    PrePool,
    /// Flattened features entering the bottleneck layer.
    PreLogitsFlatten,
}

impl Stage {
    /// All stages in forward order.
    pub const ALL: [Self; 15] = [
        Self::Conv1a,
        Self::Conv2a,
        Self::Conv2b,
        Self::Pool3a,
        Self::Conv3b,
        Self::Conv4a,
        Self::Conv4b,
        Self::Mixed5a,
        Self::Mixed6a,
        Self::Mixed6b,
        Self::Mixed7a,
        Self::Mixed8a,
        Self::Mixed8b,
        Self::PrePool,
        Self::PreLogitsFlatten,
    ];

    /// Returns the stage label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Conv1a => "Conv2d_1a_3x3",
            Self::Conv2a => "Conv2d_2a_3x3",
            Self::Conv2b => "Conv2d_2b_3x3",
            Self::Pool3a => "MaxPool_3a_3x3",
            Self::Conv3b => "Conv2d_3b_1x1",
            Self::Conv4a => "Conv2d_4a_3x3",
            Self::Conv4b => "Conv2d_4b_3x3",
            Self::Mixed5a => "Mixed_5a",
            Self::Mixed6a => "Mixed_6a",
            Self::Mixed6b => "Mixed_6b",
            Self::Mixed7a => "Mixed_7a",
            Self::Mixed8a => "Mixed_8a",
            Self::Mixed8b => "Mixed_8b",
            Self::PrePool => "PrePool",
            Self::PreLogitsFlatten => "PreLogitsFlatten",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A recorded stage output.
#[derive(Debug, Clone)]
pub enum StageOutput<B: Backend> {
    /// Spatial feature map `[batch, channels, height, width]`.
    Features(Tensor<B, 4>),
    /// Flattened features `[batch, features]`.
    Flat(Tensor<B, 2>),
}

impl<B: Backend> StageOutput<B> {
    /// Returns the output shape.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Features(tensor) => tensor.dims().to_vec(),
            Self::Flat(tensor) => tensor.dims().to_vec(),
        }
    }
}

/// Insertion-ordered mapping from stages to their recorded outputs.
///
/// Built by a traced forward pass for diagnostics; each recorded stage also
/// emits a `tracing` debug line with its shape.
#[derive(Debug, Clone)]
pub struct EndPoints<B: Backend> {
    stages: Vec<(Stage, StageOutput<B>)>,
}

impl<B: Backend> Default for EndPoints<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> EndPoints<B> {
    /// Creates an empty trace.
    #[must_use]
    pub const fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Records a spatial feature map.
    pub fn record_features(&mut self, stage: Stage, tensor: &Tensor<B, 4>) {
        debug!(stage = stage.name(), shape = ?tensor.dims(), "stage output");
        self.stages.push((stage, StageOutput::Features(tensor.clone())));
    }

    /// Records a flattened output.
    pub fn record_flat(&mut self, stage: Stage, tensor: &Tensor<B, 2>) {
        debug!(stage = stage.name(), shape = ?tensor.dims(), "stage output");
        self.stages.push((stage, StageOutput::Flat(tensor.clone())));
    }

    /// Returns the recorded output for a stage, if any.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&StageOutput<B>> {
        self.stages
            .iter()
            .find(|(recorded, _)| *recorded == stage)
            .map(|(_, output)| output)
    }

    /// Returns the recorded shape for a stage, if any.
    #[must_use]
    pub fn shape(&self, stage: Stage) -> Option<Vec<usize>> {
        self.get(stage).map(StageOutput::shape)
    }

    /// Iterates over recorded stages in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Stage, StageOutput<B>)> {
        self.stages.iter()
    }

    /// Returns the recorded stage labels in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(stage, _)| stage.name()).collect()
    }

    /// Number of recorded stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<'a, B: Backend> IntoIterator for &'a EndPoints<B> {
    type Item = &'a (Stage, StageOutput<B>);
    type IntoIter = std::slice::Iter<'a, (Stage, StageOutput<B>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Conv1a.name(), "Conv2d_1a_3x3");
        assert_eq!(Stage::Conv2a.name(), "Conv2d_2a_3x3");
        assert_eq!(Stage::Conv2b.name(), "Conv2d_2b_3x3");
        assert_eq!(Stage::Pool3a.name(), "MaxPool_3a_3x3");
        assert_eq!(Stage::Conv3b.name(), "Conv2d_3b_1x1");
        assert_eq!(Stage::Conv4a.name(), "Conv2d_4a_3x3");
        assert_eq!(Stage::Conv4b.name(), "Conv2d_4b_3x3");
        assert_eq!(Stage::Mixed5a.name(), "Mixed_5a");
        assert_eq!(Stage::Mixed6a.name(), "Mixed_6a");
        assert_eq!(Stage::Mixed6b.name(), "Mixed_6b");
        assert_eq!(Stage::Mixed7a.name(), "Mixed_7a");
        assert_eq!(Stage::Mixed8a.name(), "Mixed_8a");
        assert_eq!(Stage::Mixed8b.name(), "Mixed_8b");
        assert_eq!(Stage::PrePool.name(), "PrePool");
        assert_eq!(Stage::PreLogitsFlatten.name(), "PreLogitsFlatten");
    }

    #[test]
    fn stage_order() {
        assert_eq!(Stage::ALL.len(), 15);
        assert_eq!(Stage::ALL[0], Stage::Conv1a);
        assert_eq!(Stage::ALL[14], Stage::PreLogitsFlatten);
    }

    #[test]
    fn stage_display() {
        assert_eq!(format!("{}", Stage::Mixed6a), "Mixed_6a");
    }

    #[test]
    fn stage_serialization() {
        let json = serde_json::to_string(&Stage::PrePool);
        assert!(json.is_ok());

        let parsed: std::result::Result<Stage, _> =
            serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(Stage::PrePool));
    }

    #[test]
    fn record_and_lookup() {
        let device = <TestBackend as Backend>::Device::default();
        let mut endpoints = EndPoints::<TestBackend>::new();
        assert!(endpoints.is_empty());

        let features = Tensor::<TestBackend, 4>::zeros([1, 8, 4, 4], &device);
        let flat = Tensor::<TestBackend, 2>::zeros([1, 32], &device);

        endpoints.record_features(Stage::Conv1a, &features);
        endpoints.record_flat(Stage::PreLogitsFlatten, &flat);

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints.shape(Stage::Conv1a), Some(vec![1, 8, 4, 4]));
        assert_eq!(
            endpoints.shape(Stage::PreLogitsFlatten),
            Some(vec![1, 32])
        );
        assert_eq!(endpoints.shape(Stage::Mixed6a), None);
        assert!(endpoints.get(Stage::Conv1a).is_some());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let device = <TestBackend as Backend>::Device::default();
        let mut endpoints = EndPoints::<TestBackend>::new();
        let features = Tensor::<TestBackend, 4>::zeros([1, 2, 3, 3], &device);

        endpoints.record_features(Stage::Conv1a, &features);
        endpoints.record_features(Stage::Conv2a, &features);
        endpoints.record_features(Stage::Mixed5a, &features);

        assert_eq!(
            endpoints.names(),
            vec!["Conv2d_1a_3x3", "Conv2d_2a_3x3", "Mixed_5a"]
        );
    }
}

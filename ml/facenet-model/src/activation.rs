//! Activation functions used by the network's conv units and residual blocks.

use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::{mish, relu};
use serde::{Deserialize, Serialize};

/// Activation function applied after a convolution or residual add.
///
/// Blocks that end without a nonlinearity (the projection convs and the
/// final residual block) take `Option<Activation>` with `None`.
///
/// # Example
///
/// ```
/// use facenet_model::Activation;
///
/// let act = Activation::default();
/// assert_eq!(act, Activation::Relu);
/// assert_eq!(act.name(), "relu");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    /// Rectified linear unit.
    #[default]
    Relu,

    /// Mish: `x * tanh(softplus(x))`.
    ///
    /// A smooth self-gated alternative to `ReLU`.
    Mish,
}

impl Activation {
    /// Applies the activation to a tensor.
    pub fn apply<B: Backend, const D: usize>(self, input: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Relu => relu(input),
            Self::Mish => mish(input),
        }
    }

    /// Returns the activation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Mish => "mish",
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn relu_clamps_negatives() {
        let device = <TestBackend as Backend>::Device::default();
        let input = Tensor::<TestBackend, 1>::from_floats([-2.0, -0.5, 0.0, 1.5], &device);

        let output = Activation::Relu.apply(input);
        let values = output.into_data().to_vec::<f32>().unwrap();

        assert_eq!(values, vec![0.0, 0.0, 0.0, 1.5]);
    }

    #[test]
    fn mish_matches_reference_values() {
        let device = <TestBackend as Backend>::Device::default();
        let input = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 1.0], &device);

        let output = Activation::Mish.apply(input);
        let values = output.into_data().to_vec::<f32>().unwrap();

        // mish(x) = x * tanh(softplus(x))
        let expected = [-0.303_401f32, 0.0, 0.865_098];
        for (value, reference) in values.iter().zip(expected.iter()) {
            assert!((value - reference).abs() < 1e-4);
        }
    }

    #[test]
    fn activation_name() {
        assert_eq!(Activation::Relu.name(), "relu");
        assert_eq!(Activation::Mish.name(), "mish");
    }

    #[test]
    fn activation_display() {
        assert_eq!(format!("{}", Activation::Relu), "relu");
        assert_eq!(format!("{}", Activation::Mish), "mish");
    }

    #[test]
    fn activation_default() {
        assert_eq!(Activation::default(), Activation::Relu);
    }

    #[test]
    fn activation_serialization() {
        let act = Activation::Mish;
        let json = serde_json::to_string(&act);
        assert!(json.is_ok());

        let parsed: Result<Activation, _> = serde_json::from_str(&json.unwrap_or_default());
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap_or_default(), act);
    }
}

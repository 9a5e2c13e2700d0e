//! Inception-ResNet-v1 face embedding network built on the Burn framework.
//!
//! This crate defines the network architecture, its channel-width plans, and
//! checkpoint save/load functionality. It does not implement tensor math or
//! training loops; those belong to Burn and its backends.
//!
//! # Network
//!
//! [`InceptionResnetV1`] maps an image batch `[batch, 3, height, width]` to
//! an embedding `[batch, embedding_size]`. Two variants exist:
//!
//! - [`Variant::Full`] - seven-stage stem, standard widths, no batch norm
//! - [`Variant::Reduced`] - six-stage stem, reduced widths, batch-normalized
//!   conv units
//!
//! # Stage Outputs
//!
//! [`InceptionResnetV1::forward_with_endpoints`] records every named stage
//! output (`Conv2d_1a_3x3` through `PreLogitsFlatten`) in an ordered
//! [`EndPoints`] trace for inspection and feature extraction.
//!
//! # Checkpoint Persistence
//!
//! Models can save and load their weights using Burn's recorder system:
//! - Binary format (compact, fast)
//! - Named MessagePack format (field-name keyed)
//! - JSON format (human-readable, debuggable)
//!
//! # Backend Support
//!
//! Models are generic over Burn backends. Common choices:
//! - `burn-ndarray` - CPU inference/training (default)
//! - `burn-wgpu` - GPU inference/training (optional feature)
//!
//! # Example
//!
//! ```ignore
//! use burn::tensor::Tensor;
//! use facenet_model::{InceptionResnetV1, InceptionResnetV1Config};
//!
//! // Create the full-variant network
//! let config = InceptionResnetV1Config::new();
//! let device = Default::default();
//! let model = InceptionResnetV1::<MyBackend>::new(config, &device);
//!
//! // Run inference
//! let images = Tensor::zeros([4, 3, 160, 160], &device);
//! let embeddings = model.forward(images);
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards per [STANDARDS.md](../../STANDARDS.md):
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod activation;
mod block;
mod checkpoint;
mod conv;
mod endpoints;
mod error;
mod model;
mod reduction;
mod widths;

// Re-export network types
pub use model::{
    DEFAULT_DROPOUT_KEEP, DEFAULT_EMBEDDING_SIZE, InceptionResnetV1, InceptionResnetV1Config,
    Variant,
};

// Re-export building blocks
pub use activation::Activation;
pub use block::{BlockA, BlockB, BlockC, BlockConfig};
pub use conv::{ConvUnit, ConvUnitConfig};
pub use reduction::{ReductionA, ReductionAConfig, ReductionB, ReductionBConfig};
pub use widths::{WIDTH_COUNT, Widths};

// Re-export stage trace types
pub use endpoints::{EndPoints, Stage, StageOutput};

// Re-export checkpoint utilities
pub use checkpoint::{CheckpointFormat, load_checkpoint, save_checkpoint};

// Re-export error types
pub use error::{ModelError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Activation, CheckpointFormat, EndPoints, InceptionResnetV1, InceptionResnetV1Config,
        ModelError, Stage, StageOutput, Variant, Widths, load_checkpoint, save_checkpoint,
    };
}

//! Channel-width plan for the Inception-ResNet-v1 network.
//!
//! The architecture is parameterized by a 16-entry list of channel counts:
//! six stem convolutions, the three residual block widths, the reduction-cell
//! widths, and the final block width. Two presets are provided, the standard
//! plan from the reference architecture and a narrower reduced plan.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Number of entries in a width plan.
pub const WIDTH_COUNT: usize = 16;

/// Channel-width plan configuring every stage of the network.
///
/// Entry layout: `[stem 1a, 2a, 2b, 3b, 4a, 4b, block-A width,
/// reduction-A k/l/m/n, block-B width, reduction-B widths (2),
/// block-C width, final block width]`.
///
/// # Example
///
/// ```
/// use facenet_model::Widths;
///
/// let widths = Widths::standard();
/// assert_eq!(widths.stem_1a(), 32);
/// assert_eq!(widths.block_b(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widths([usize; WIDTH_COUNT]);

impl Default for Widths {
    fn default() -> Self {
        Self::standard()
    }
}

impl Widths {
    /// The standard plan from the reference architecture.
    #[must_use]
    pub const fn standard() -> Self {
        Self([
            32, 32, 64, 80, 192, 256, 32, 192, 192, 256, 384, 128, 256, 384, 192, 192,
        ])
    }

    /// The narrower plan used by the reduced variant.
    #[must_use]
    pub const fn reduced() -> Self {
        Self([
            32, 32, 64, 80, 96, 128, 16, 96, 96, 128, 192, 64, 128, 192, 96, 96,
        ])
    }

    /// Builds a plan from a slice of channel counts.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidWidths` if the slice does not hold exactly
    /// [`WIDTH_COUNT`] entries, and `ModelError::InvalidConfig` if any entry
    /// is zero.
    pub fn from_slice(widths: &[usize]) -> Result<Self> {
        if widths.len() != WIDTH_COUNT {
            return Err(ModelError::invalid_widths(WIDTH_COUNT, widths.len()));
        }

        let mut entries = [0usize; WIDTH_COUNT];
        for (index, &width) in widths.iter().enumerate() {
            if width == 0 {
                return Err(ModelError::invalid_config(format!(
                    "width entry {index} must be nonzero"
                )));
            }
            entries[index] = width;
        }

        Ok(Self(entries))
    }

    /// Returns the plan as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Output channels of the first stem convolution (stride 2).
    #[must_use]
    pub const fn stem_1a(&self) -> usize {
        self.0[0]
    }

    /// Output channels of the second stem convolution.
    #[must_use]
    pub const fn stem_2a(&self) -> usize {
        self.0[1]
    }

    /// Output channels of the third stem convolution (same padding).
    #[must_use]
    pub const fn stem_2b(&self) -> usize {
        self.0[2]
    }

    /// Output channels of the post-pool 1x1 stem convolution.
    #[must_use]
    pub const fn stem_3b(&self) -> usize {
        self.0[3]
    }

    /// Output channels of the fifth stem convolution.
    #[must_use]
    pub const fn stem_4a(&self) -> usize {
        self.0[4]
    }

    /// Output channels of the final stem convolution (full variant only).
    #[must_use]
    pub const fn stem_4b(&self) -> usize {
        self.0[5]
    }

    /// Branch width of the block-A residual blocks.
    #[must_use]
    pub const fn block_a(&self) -> usize {
        self.0[6]
    }

    /// Reduction-A branch widths `[k, l, m, n]`.
    #[must_use]
    pub const fn reduction_a(&self) -> [usize; 4] {
        [self.0[7], self.0[8], self.0[9], self.0[10]]
    }

    /// Branch width of the block-B residual blocks.
    #[must_use]
    pub const fn block_b(&self) -> usize {
        self.0[11]
    }

    /// Reduction-B branch widths `[narrow, wide]`.
    #[must_use]
    pub const fn reduction_b(&self) -> [usize; 2] {
        [self.0[12], self.0[13]]
    }

    /// Branch width of the block-C residual blocks.
    #[must_use]
    pub const fn block_c(&self) -> usize {
        self.0[14]
    }

    /// Branch width of the final (linear) residual block.
    #[must_use]
    pub const fn final_block(&self) -> usize {
        self.0[15]
    }
}

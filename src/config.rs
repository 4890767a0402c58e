use crate::{QUANTIZED_RESOLUTION, RAW_RESOLUTION};

/// Encoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeConfig {
    /// Store costs as one quantized byte instead of a raw `u16`.
    pub use_1byte_cost: bool,
}

impl EncodeConfig {
    /// Configuration storing exact 2-byte costs.
    pub fn raw() -> Self {
        Self { use_1byte_cost: false }
    }

    /// Configuration storing 1-byte costs quantized by [`QUANTIZED_RESOLUTION`].
    pub fn quantized() -> Self {
        Self { use_1byte_cost: true }
    }

    /// Divisor applied to costs before storage.
    pub fn resolution(&self) -> u16 {
        if self.use_1byte_cost {
            QUANTIZED_RESOLUTION
        } else {
            RAW_RESOLUTION
        }
    }

    /// Width in bytes of a single stored value.
    pub fn value_width(&self) -> usize {
        if self.use_1byte_cost {
            1
        } else {
            2
        }
    }
}

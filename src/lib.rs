//! Compressed, randomly accessible storage for square connection-cost
//! matrices.
//!
//! Each row keeps its most frequent cost as an implicit default. The cells
//! that differ are recorded in a two-level presence bitmap (one bit per
//! 8-column chunk, then an 8-bit mask per non-empty chunk) and a dense value
//! array. A lookup costs two rank queries and never materializes the matrix.
//!
//! ```
//! use connmat::{encode, CompressedMatrix, CostMatrix, EncodeConfig};
//!
//! let matrix = CostMatrix::from_rows(&[[0, 0], [0, 42]]).unwrap();
//! let blob = encode(&matrix, &EncodeConfig::raw()).unwrap();
//! let view = CompressedMatrix::new(&blob).unwrap();
//! assert_eq!(view.cost(1, 1).unwrap(), 42);
//! ```

pub mod bits;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod io_utils;
pub mod matrix;
pub mod row;
pub mod stats;

pub use config::EncodeConfig;
pub use decode::CompressedMatrix;
pub use encode::{encode, encode_to, encode_with_stats};
pub use error::{ConnmatError, Result};
pub use header::BlobHeader;
pub use matrix::CostMatrix;
pub use row::{compress_row, mode_value, CompressedRow};
pub use stats::{BlobSummary, EncodeStats};

/// Leading bytes of every blob.
pub const MAGIC: [u8; 2] = [0xAB, 0xCD];
/// Cost marking a disallowed transition.
pub const INVALID_COST: u16 = 30000;
/// Byte stored for [`INVALID_COST`] in quantized mode.
pub const INVALID_1BYTE_COST: u8 = 255;
/// Columns covered by one bit of the chunk bitmap.
pub const CHUNK_SIZE: usize = 8;
/// Resolution used when costs are stored in one byte.
pub const QUANTIZED_RESOLUTION: u16 = 64;
/// Resolution used when costs are stored verbatim.
pub const RAW_RESOLUTION: u16 = 1;

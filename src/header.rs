//! Fixed blob header and mode-value table.
//!
//! ```text
//! offset 0  magic       0xAB 0xCD
//! offset 2  resolution  u16
//! offset 4  num_rows    u16
//! offset 6  num_cols    u16
//! offset 8  mode values u16 * num_rows, plus one zero u16 when num_rows is odd
//! ```
//!
//! All integers are little-endian.

use crate::bits::{align_up, ByteReader, SECTION_ALIGN};
use crate::{ConnmatError, Result, MAGIC, QUANTIZED_RESOLUTION, RAW_RESOLUTION};

/// Size of the fixed part of the header in bytes.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub resolution: u16,
    pub num_rows: u16,
    pub num_cols: u16,
}

impl BlobHeader {
    /// True when values are stored as one quantized byte.
    pub fn is_quantized(&self) -> bool {
        self.resolution != RAW_RESOLUTION
    }

    /// Byte length of the mode-value table including alignment padding.
    pub fn mode_table_len(&self) -> usize {
        align_up(self.num_rows as usize * 2, SECTION_ALIGN)
    }
}

/// Append the fixed header and mode table to `out`.
pub fn write_header(out: &mut Vec<u8>, header: &BlobHeader, modes: &[u16]) {
    debug_assert_eq!(modes.len(), header.num_rows as usize);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.resolution.to_le_bytes());
    out.extend_from_slice(&header.num_rows.to_le_bytes());
    out.extend_from_slice(&header.num_cols.to_le_bytes());
    for m in modes {
        out.extend_from_slice(&m.to_le_bytes());
    }
    if modes.len() % 2 == 1 {
        out.extend_from_slice(&[0, 0]);
    }
}

/// Parse the fixed header and mode table from the front of `reader`.
pub fn read_header(reader: &mut ByteReader<'_>) -> Result<(BlobHeader, Vec<u16>)> {
    let magic = reader
        .take(MAGIC.len())
        .ok_or_else(|| ConnmatError::malformed("blob shorter than header"))?;
    if magic != MAGIC {
        return Err(ConnmatError::malformed(format!(
            "bad magic {}",
            hex::encode(magic)
        )));
    }
    let mut field = || {
        reader
            .read_u16()
            .ok_or_else(|| ConnmatError::malformed("blob shorter than header"))
    };
    let header = BlobHeader {
        resolution: field()?,
        num_rows: field()?,
        num_cols: field()?,
    };
    if header.resolution != RAW_RESOLUTION && header.resolution != QUANTIZED_RESOLUTION {
        return Err(ConnmatError::malformed(format!(
            "unsupported resolution {}",
            header.resolution
        )));
    }
    if header.num_rows != header.num_cols {
        return Err(ConnmatError::malformed(format!(
            "matrix is not square: {} rows, {} cols",
            header.num_rows, header.num_cols
        )));
    }

    let table = reader
        .take(header.mode_table_len())
        .ok_or_else(|| ConnmatError::malformed("truncated mode table"))?;
    let rows = header.num_rows as usize;
    let modes = table[..rows * 2]
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    if table[rows * 2..].iter().any(|&b| b != 0) {
        return Err(ConnmatError::malformed("non-zero mode table padding"));
    }
    Ok((header, modes))
}

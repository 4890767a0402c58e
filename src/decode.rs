//! Random-access reader over an encoded blob.
//!
//! [`CompressedMatrix::new`] walks the blob once, rejecting anything that
//! the encoder could not have produced, and remembers where each row block
//! lives. Lookups afterwards only read bytes: the mode table, at most one
//! chunk-bitmap rank and one compact-bitmap rank, and a single value.

use std::ops::Range;

use crate::bits::{align_up, any_set_from, get_bit, packed_len, popcount, rank, ByteReader, SECTION_ALIGN};
use crate::header::{read_header, BlobHeader};
use crate::{ConnmatError, CostMatrix, Result, CHUNK_SIZE, INVALID_1BYTE_COST, INVALID_COST};

/// Byte ranges of one row block inside the blob.
#[derive(Debug, Clone, Default)]
struct RowBlock {
    chunk_bits: Range<usize>,
    compact_bits: Range<usize>,
    values: Range<usize>,
    present: usize,
}

impl RowBlock {
    fn is_collapsed(&self) -> bool {
        self.chunk_bits.is_empty()
    }
}

/// Validated view of an encoded cost matrix.
#[derive(Debug, Clone)]
pub struct CompressedMatrix<'a> {
    data: &'a [u8],
    header: BlobHeader,
    modes: Vec<u16>,
    rows: Vec<RowBlock>,
}

impl<'a> CompressedMatrix<'a> {
    /// Validate `data` and build the row offset table.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::from_slice(data);
        let (header, modes) = read_header(&mut reader)?;
        let mut matrix = Self {
            data,
            header,
            modes,
            rows: Vec::with_capacity(header.num_rows as usize),
        };
        for i in 0..header.num_rows as usize {
            let block = matrix.read_row_block(&mut reader, i)?;
            matrix.rows.push(block);
        }
        if reader.remaining() != 0 {
            return Err(ConnmatError::malformed(format!(
                "{} trailing bytes after last row",
                reader.remaining()
            )));
        }
        Ok(matrix)
    }

    fn value_width(&self) -> usize {
        if self.header.is_quantized() {
            1
        } else {
            2
        }
    }

    fn read_row_block(&self, reader: &mut ByteReader<'a>, index: usize) -> Result<RowBlock> {
        let truncated = || ConnmatError::malformed(format!("row {index}: truncated row block"));
        let compact_len = reader.read_u16().ok_or_else(truncated)? as usize;
        let values_len = reader.read_u16().ok_or_else(truncated)? as usize;

        if compact_len == 0 && values_len == 0 {
            return Ok(RowBlock::default());
        }
        if compact_len == 0 || values_len == 0 {
            return Err(ConnmatError::malformed(format!(
                "row {index}: compact length {compact_len} with value length {values_len}"
            )));
        }
        if compact_len % SECTION_ALIGN != 0 || values_len % SECTION_ALIGN != 0 {
            return Err(ConnmatError::malformed(format!(
                "row {index}: section lengths {compact_len}/{values_len} are not 4-byte aligned"
            )));
        }

        let cols = self.header.num_cols as usize;
        let num_chunks = cols.div_ceil(CHUNK_SIZE);
        let chunk_start = reader.position();
        let chunk_bits = reader.take(packed_len(num_chunks)).ok_or_else(truncated)?;
        let compact_start = reader.position();
        let compact_bits = reader.take(compact_len).ok_or_else(truncated)?;
        let values_start = reader.position();
        let values = reader.take(values_len).ok_or_else(truncated)?;

        if any_set_from(chunk_bits, num_chunks) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: chunk bitmap padding is not zero"
            )));
        }
        let non_empty = popcount(chunk_bits);
        if non_empty == 0 {
            return Err(ConnmatError::malformed(format!(
                "row {index}: chunk bitmap is empty but sections are present"
            )));
        }
        if compact_len != packed_len(non_empty * CHUNK_SIZE) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: compact length {compact_len} does not match {non_empty} chunks"
            )));
        }
        if any_set_from(compact_bits, non_empty * CHUNK_SIZE) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: compact bitmap padding is not zero"
            )));
        }
        if compact_bits[..non_empty].contains(&0) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: non-empty chunk with an empty presence mask"
            )));
        }
        let tail = cols % CHUNK_SIZE;
        if tail != 0 && get_bit(chunk_bits, num_chunks - 1) {
            let last = compact_bits[non_empty - 1];
            if last >> tail != 0 {
                return Err(ConnmatError::malformed(format!(
                    "row {index}: presence bits beyond the last column"
                )));
            }
        }

        let present = popcount(compact_bits);
        let width = self.value_width();
        if values_len != align_up(present * width, SECTION_ALIGN) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: value length {values_len} does not match {present} present cells"
            )));
        }
        if values[present * width..].iter().any(|&b| b != 0) {
            return Err(ConnmatError::malformed(format!(
                "row {index}: value padding is not zero"
            )));
        }
        if !self.header.is_quantized() {
            let mode = self.modes[index];
            let stores_mode = values[..present * 2]
                .chunks_exact(2)
                .any(|b| u16::from_le_bytes([b[0], b[1]]) == mode);
            if stores_mode {
                return Err(ConnmatError::malformed(format!(
                    "row {index}: explicit value equals the row mode"
                )));
            }
        }

        Ok(RowBlock {
            chunk_bits: chunk_start..compact_start,
            compact_bits: compact_start..values_start,
            values: values_start..values_start + values_len,
            present,
        })
    }

    pub fn header(&self) -> &BlobHeader {
        &self.header
    }

    /// Number of rows (and columns).
    pub fn num_rows(&self) -> usize {
        self.header.num_rows as usize
    }

    pub fn resolution(&self) -> u16 {
        self.header.resolution
    }

    pub fn is_quantized(&self) -> bool {
        self.header.is_quantized()
    }

    /// Encoded bytes backing this view.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn check(&self, row: usize, col: usize) -> Result<()> {
        let size = self.num_rows();
        if row >= size || col >= size {
            return Err(ConnmatError::OutOfRange { row, col, size });
        }
        Ok(())
    }

    /// Default cost of `row`.
    pub fn mode_value(&self, row: usize) -> Result<u16> {
        self.check(row, 0)?;
        Ok(self.modes[row])
    }

    fn stored_value(&self, block: &RowBlock, v: usize) -> u16 {
        let values = &self.data[block.values.clone()];
        if self.header.is_quantized() {
            let byte = values[v];
            if byte == INVALID_1BYTE_COST {
                INVALID_COST
            } else {
                byte as u16 * self.header.resolution
            }
        } else {
            u16::from_le_bytes([values[2 * v], values[2 * v + 1]])
        }
    }

    /// Cost of the transition `row` -> `col`.
    ///
    /// Both rank queries scan the row's bitmaps from the start, so a lookup
    /// is O(N / 8) byte reads for an N-column matrix.
    pub fn cost(&self, row: usize, col: usize) -> Result<u16> {
        self.check(row, col)?;
        let mode = self.modes[row];
        let block = &self.rows[row];
        if block.is_collapsed() {
            return Ok(mode);
        }

        let chunk_bits = &self.data[block.chunk_bits.clone()];
        let chunk = col / CHUNK_SIZE;
        if !get_bit(chunk_bits, chunk) {
            return Ok(mode);
        }
        let pos = rank(chunk_bits, chunk) * CHUNK_SIZE + col % CHUNK_SIZE;
        let compact_bits = &self.data[block.compact_bits.clone()];
        if !get_bit(compact_bits, pos) {
            return Ok(mode);
        }
        Ok(self.stored_value(block, rank(compact_bits, pos)))
    }

    /// Decode a whole row in one pass.
    pub fn row(&self, row: usize) -> Result<Vec<u16>> {
        self.check(row, 0)?;
        let size = self.num_rows();
        let mode = self.modes[row];
        let block = &self.rows[row];
        let mut out = vec![mode; size];
        if block.is_collapsed() {
            return Ok(out);
        }

        let chunk_bits = &self.data[block.chunk_bits.clone()];
        let compact_bits = &self.data[block.compact_bits.clone()];
        let mut mask_pos = 0usize;
        let mut v = 0usize;
        for chunk in 0..size.div_ceil(CHUNK_SIZE) {
            if !get_bit(chunk_bits, chunk) {
                continue;
            }
            for bit in 0..CHUNK_SIZE {
                if get_bit(compact_bits, mask_pos + bit) {
                    out[chunk * CHUNK_SIZE + bit] = self.stored_value(block, v);
                    v += 1;
                }
            }
            mask_pos += CHUNK_SIZE;
        }
        Ok(out)
    }

    /// Reconstruct the dense matrix.
    pub fn to_matrix(&self) -> Result<CostMatrix> {
        let rows = (0..self.num_rows())
            .map(|r| Ok(self.row(r)?.into_iter().map(i32::from).collect::<Vec<_>>()))
            .collect::<Result<Vec<_>>>()?;
        CostMatrix::from_rows(&rows)
    }

    /// Number of cells stored explicitly across all rows.
    pub fn present_cells(&self) -> usize {
        self.rows.iter().map(|r| r.present).sum()
    }

    /// Number of rows that decode entirely from their mode value.
    pub fn collapsed_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_collapsed()).count()
    }
}

//! Blob assembly.
//!
//! Every row is compressed and packed in memory before anything reaches the
//! caller's sink, so a precondition violation never leaves a partial blob
//! behind.

use std::io::Write;

use crate::bits::{align_up, pack_bits, SECTION_ALIGN};
use crate::header::{write_header, BlobHeader};
use crate::row::{compress_row, CompressedRow};
use crate::stats::EncodeStats;
use crate::{ConnmatError, CostMatrix, EncodeConfig, Result};

fn len_u16(len: usize, what: &str, row: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| {
        ConnmatError::precondition(format!("row {row}: {what} of {len} bytes exceeds 16 bits"))
    })
}

/// Pack the value array of one row, zero-padded to 4 bytes.
fn pack_values(values: &[u16], config: &EncodeConfig) -> Vec<u8> {
    let mut out = Vec::with_capacity(align_up(values.len() * config.value_width(), SECTION_ALIGN));
    for &v in values {
        if config.use_1byte_cost {
            // Range checked by `compress_row`.
            out.push(v as u8);
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out.resize(align_up(out.len(), SECTION_ALIGN), 0);
    out
}

/// Append one row block to `out`.
fn write_row_block(
    out: &mut Vec<u8>,
    index: usize,
    row: &CompressedRow,
    config: &EncodeConfig,
) -> Result<()> {
    let chunk_bytes = pack_bits(&row.chunk_bits);
    let compact_bytes = pack_bits(&row.compact_bits);
    let value_bytes = pack_values(&row.values, config);

    out.extend_from_slice(&len_u16(compact_bytes.len(), "compact bitmap", index)?.to_le_bytes());
    out.extend_from_slice(&len_u16(value_bytes.len(), "value array", index)?.to_le_bytes());
    out.extend_from_slice(&chunk_bytes);
    out.extend_from_slice(&compact_bytes);
    out.extend_from_slice(&value_bytes);
    Ok(())
}

/// Encode `matrix` and return the blob together with encoding statistics.
pub fn encode_with_stats(
    matrix: &CostMatrix,
    config: &EncodeConfig,
) -> Result<(Vec<u8>, EncodeStats)> {
    let size = matrix.size();
    let dim = u16::try_from(size).map_err(|_| {
        ConnmatError::precondition(format!("matrix dimension {size} exceeds 16 bits"))
    })?;

    let rows = matrix
        .rows()
        .map(|r| compress_row(r, config))
        .collect::<Result<Vec<_>>>()?;

    let header = BlobHeader {
        resolution: config.resolution(),
        num_rows: dim,
        num_cols: dim,
    };
    let modes: Vec<u16> = rows.iter().map(|r| r.mode_value).collect();

    let mut out = Vec::new();
    write_header(&mut out, &header, &modes);

    let mut stats = EncodeStats::new();
    for (i, row) in rows.iter().enumerate() {
        write_row_block(&mut out, i, row, config)?;
        stats.tick_row(size, row.present_cells());
    }
    stats.blob_bytes = out.len();
    Ok((out, stats))
}

/// Encode `matrix` into a blob.
pub fn encode(matrix: &CostMatrix, config: &EncodeConfig) -> Result<Vec<u8>> {
    encode_with_stats(matrix, config).map(|(blob, _)| blob)
}

/// Encode `matrix` and write the finished blob to `sink`.
///
/// Returns the number of bytes written.
pub fn encode_to<W: Write>(matrix: &CostMatrix, config: &EncodeConfig, sink: &mut W) -> Result<usize> {
    let blob = encode(matrix, config)?;
    sink.write_all(&blob)?;
    Ok(blob.len())
}

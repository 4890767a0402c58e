//! Per-row sparse compression.
//!
//! A row is reduced to its mode value plus a two-level presence bitmap:
//! one bit per chunk of [`CHUNK_SIZE`] columns, then an 8-bit mask for every
//! chunk that holds at least one cell differing from the mode.

use std::collections::HashMap;

use crate::{ConnmatError, EncodeConfig, Result, CHUNK_SIZE, INVALID_1BYTE_COST, INVALID_COST};

/// One row in sparse form, before byte packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedRow {
    /// Cost returned for every absent cell.
    pub mode_value: u16,
    /// One bit per chunk; empty when the row has no present cell.
    pub chunk_bits: Vec<bool>,
    /// 8 presence bits for each non-empty chunk, in column order.
    pub compact_bits: Vec<bool>,
    /// Stored values of present cells, quantized in 1-byte mode.
    pub values: Vec<u16>,
}

impl CompressedRow {
    /// Number of cells stored explicitly.
    pub fn present_cells(&self) -> usize {
        self.values.len()
    }

    /// True if the whole row decodes from the mode value.
    pub fn is_collapsed(&self) -> bool {
        self.chunk_bits.is_empty()
    }
}

/// Most frequent non-invalid cost of `row`.
///
/// Ties go to the value seen first in a left-to-right scan. A row with no
/// valid cost has mode 0.
pub fn mode_value(row: &[i32]) -> i32 {
    // Counts in first-insertion order, plus an index into them.
    let mut counts: Vec<(i32, usize)> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();
    for &cost in row {
        if cost == INVALID_COST as i32 {
            continue;
        }
        match index.get(&cost) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(cost, counts.len());
                counts.push((cost, 1));
            }
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for &(value, count) in &counts {
        match best {
            Some((_, c)) if c >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map_or(0, |(value, _)| value)
}

fn to_u16(cost: i32, what: &str) -> Result<u16> {
    u16::try_from(cost)
        .map_err(|_| ConnmatError::precondition(format!("{what} {cost} does not fit in 16 bits")))
}

/// Value actually written to the value array for `cost`.
fn stored_value(cost: u16, config: &EncodeConfig) -> Result<u16> {
    if !config.use_1byte_cost {
        return Ok(cost);
    }
    if cost == INVALID_COST {
        return Ok(INVALID_1BYTE_COST as u16);
    }
    let q = cost / config.resolution();
    if q >= INVALID_1BYTE_COST as u16 {
        return Err(ConnmatError::precondition(format!(
            "cost {cost} does not fit in one byte at resolution {}",
            config.resolution()
        )));
    }
    Ok(q)
}

/// Compress one matrix row.
pub fn compress_row(row: &[i32], config: &EncodeConfig) -> Result<CompressedRow> {
    let mode = mode_value(row);
    let mode_value = to_u16(mode, "mode value")?;

    let mut chunk_bits = Vec::with_capacity(row.len().div_ceil(CHUNK_SIZE));
    let mut compact_bits = Vec::new();
    let mut values = Vec::new();

    for chunk in row.chunks(CHUNK_SIZE) {
        if chunk.iter().all(|&c| c == mode) {
            chunk_bits.push(false);
            continue;
        }
        chunk_bits.push(true);
        for i in 0..CHUNK_SIZE {
            match chunk.get(i) {
                Some(&cost) if cost != mode => {
                    compact_bits.push(true);
                    values.push(stored_value(to_u16(cost, "cost")?, config)?);
                }
                _ => compact_bits.push(false),
            }
        }
    }

    if compact_bits.is_empty() {
        chunk_bits.clear();
    }

    Ok(CompressedRow {
        mode_value,
        chunk_bits,
        compact_bits,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INV: i32 = INVALID_COST as i32;

    #[test]
    fn mode_prefers_first_seen_on_tie() {
        assert_eq!(mode_value(&[7, 3, 3, 7]), 7);
        assert_eq!(mode_value(&[3, 7, 7, 3]), 3);
        assert_eq!(mode_value(&[1, 2, 2, 1, 1]), 1);
        assert_eq!(mode_value(&[9, 1, 2, 2]), 2);
    }

    #[test]
    fn invalid_cost_is_never_mode() {
        assert_eq!(mode_value(&[INV, INV, INV, 4]), 4);
        assert_eq!(mode_value(&[INV, INV]), 0);
        assert_eq!(mode_value(&[]), 0);
    }

    #[test]
    fn constant_row_collapses() {
        let row = compress_row(&[5; 20], &EncodeConfig::raw()).unwrap();
        assert_eq!(row.mode_value, 5);
        assert!(row.is_collapsed());
        assert!(row.compact_bits.is_empty());
        assert!(row.values.is_empty());
    }

    #[test]
    fn invalid_cells_keep_constant_row_from_collapsing() {
        let mut cells = vec![5; 12];
        cells[10] = INV;
        let row = compress_row(&cells, &EncodeConfig::raw()).unwrap();
        assert_eq!(row.mode_value, 5);
        assert!(!row.is_collapsed());
        assert_eq!(row.chunk_bits, vec![false, true]);
        assert_eq!(row.values, vec![INVALID_COST]);
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let mut cells = vec![1; 24];
        cells[17] = 9;
        let row = compress_row(&cells, &EncodeConfig::raw()).unwrap();
        assert_eq!(row.chunk_bits, vec![false, false, true]);
        let mut mask = vec![false; 8];
        mask[1] = true;
        assert_eq!(row.compact_bits, mask);
        assert_eq!(row.values, vec![9]);
    }

    #[test]
    fn partial_chunk_is_padded_with_absent_bits() {
        let row = compress_row(&[0, 2, 2], &EncodeConfig::raw()).unwrap();
        assert_eq!(row.chunk_bits, vec![true]);
        assert_eq!(
            row.compact_bits,
            vec![true, false, false, false, false, false, false, false]
        );
        assert_eq!(row.values, vec![0]);
    }

    #[test]
    fn invalid_cells_are_stored() {
        let raw = compress_row(&[1, 1, INV, 1], &EncodeConfig::raw()).unwrap();
        assert_eq!(raw.values, vec![INVALID_COST]);

        let quant = compress_row(&[1, 1, INV, 130], &EncodeConfig::quantized()).unwrap();
        assert_eq!(quant.values, vec![255, 2]);
    }

    #[test]
    fn oversized_values_are_rejected() {
        assert!(compress_row(&[0, 70_000], &EncodeConfig::raw()).is_err());
        assert!(compress_row(&[0, -1, -1], &EncodeConfig::raw()).is_err());
        // 16320 / 64 == 255 collides with the invalid marker.
        assert!(compress_row(&[0, 0, 16_320], &EncodeConfig::quantized()).is_err());
        assert!(compress_row(&[0, 0, 16_319], &EncodeConfig::quantized()).is_ok());
    }
}

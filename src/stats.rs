//! `EncodeStats` tracks how much of a matrix was stored explicitly. It does
//! no logging of its own; callers decide whether to `report()`.
//! `BlobSummary` describes an already encoded blob.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::CompressedMatrix;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodeStats {
    pub rows: usize,
    pub cells: usize,
    pub present_cells: usize,
    pub collapsed_rows: usize,
    pub blob_bytes: usize,
}

impl EncodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_row(&mut self, cells: usize, present: usize) {
        self.rows += 1;
        self.cells += cells;
        self.present_cells += present;
        if present == 0 {
            self.collapsed_rows += 1;
        }
    }

    /// Size of the same matrix stored densely as `u16`.
    pub fn dense_bytes(&self) -> usize {
        self.cells * 2
    }

    /// Blob size as a percentage of the dense size.
    pub fn ratio(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.blob_bytes as f64 * 100.0 / self.dense_bytes() as f64
        }
    }

    /// Lines printed by [`Self::report`].
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Encoded {} rows ({} cells)", self.rows, self.cells),
            format!(
                "Present cells: {} | Collapsed rows: {}",
                self.present_cells, self.collapsed_rows
            ),
            format!(
                "Output: {} bytes (dense {} bytes, {:.2}%)",
                self.blob_bytes,
                self.dense_bytes(),
                self.ratio()
            ),
        ]
    }

    pub fn report(&self) {
        for line in self.summary_lines() {
            eprintln!("{line}");
        }
    }
}

/// Description of a validated blob, printed by the `connmat info` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobSummary {
    pub resolution: u16,
    pub quantized: bool,
    pub dimension: usize,
    pub present_cells: usize,
    pub collapsed_rows: usize,
    pub blob_bytes: usize,
    pub sha256: String,
}

impl BlobSummary {
    pub fn new(matrix: &CompressedMatrix<'_>) -> Self {
        let bytes = matrix.as_bytes();
        Self {
            resolution: matrix.resolution(),
            quantized: matrix.is_quantized(),
            dimension: matrix.num_rows(),
            present_cells: matrix.present_cells(),
            collapsed_rows: matrix.collapsed_rows(),
            blob_bytes: bytes.len(),
            sha256: hex::encode(Sha256::digest(bytes)),
        }
    }

    pub fn report(&self) {
        println!("Dimension: {0}x{0}", self.dimension);
        println!(
            "Resolution: {} ({})",
            self.resolution,
            if self.quantized { "1-byte costs" } else { "2-byte costs" }
        );
        println!(
            "Present cells: {} | Collapsed rows: {}",
            self.present_cells, self.collapsed_rows
        );
        println!("Size: {} bytes", self.blob_bytes);
        println!("SHA-256: {}", self.sha256);
    }
}

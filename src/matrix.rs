use crate::{ConnmatError, Result, INVALID_COST};

/// Square matrix of transition costs between category ids.
///
/// Cells are stored row-major as `i32` so that values outside the 16-bit
/// range survive until the encoder checks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    size: usize,
    data: Vec<i32>,
}

impl CostMatrix {
    /// Create a `size`x`size` matrix filled with `fill`.
    pub fn new(size: usize, fill: i32) -> Self {
        Self {
            size,
            data: vec![fill; size * size],
        }
    }

    /// Build a matrix from explicit rows. Every row must have one cell per row.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return Err(ConnmatError::precondition(format!(
                    "row {i} has {} cells, expected {size}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { size, data })
    }

    /// Build a matrix from the primary category block and append
    /// `special_count` special categories.
    ///
    /// Every cell touching a special category is [`INVALID_COST`]; callers
    /// may override individual transitions afterwards with [`Self::set`].
    pub fn with_special<R: AsRef<[i32]>>(primary: &[R], special_count: usize) -> Result<Self> {
        let primary = Self::from_rows(primary)?;
        let pos_size = primary.size;
        let size = pos_size + special_count;
        let mut out = Self::new(size, INVALID_COST as i32);
        for row in 0..pos_size {
            let dst = row * size;
            out.data[dst..dst + pos_size].copy_from_slice(primary.row(row));
        }
        Ok(out)
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "cell ({row}, {col}) out of range for {0}x{0} matrix",
            self.size
        );
        row * self.size + col
    }

    /// Cost of the transition `row` -> `col`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below [`Self::size`].
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[self.index(row, col)]
    }

    /// Overwrite the cost of the transition `row` -> `col`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below [`Self::size`].
    pub fn set(&mut self, row: usize, col: usize, cost: i32) {
        let i = self.index(row, col);
        self.data[i] = cost;
    }

    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        // `max(1)` keeps `chunks_exact` valid for the empty matrix.
        self.data.chunks_exact(self.size.max(1))
    }
}

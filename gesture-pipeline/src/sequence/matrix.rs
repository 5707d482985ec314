//! Row-major observation matrix

use crate::quantize::Symbol;
use crate::{Error, Result};

/// Fixed-width rows of observation symbols, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationMatrix {
    row_len: usize,
    data: Vec<Symbol>,
}

impl ObservationMatrix {
    /// Empty matrix whose rows will have `row_len` symbols
    pub fn new(row_len: usize) -> Self {
        Self {
            row_len,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(row_len: usize, rows: usize) -> Self {
        Self {
            row_len,
            data: Vec::with_capacity(row_len * rows),
        }
    }

    /// Build from explicit rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> Result<Self> {
        let row_len = rows.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Self::with_capacity(row_len, rows.len());
        for row in &rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    pub fn push_row(&mut self, row: &[Symbol]) -> Result<()> {
        if row.len() != self.row_len {
            return Err(Error::Sequence(format!(
                "row of length {} does not fit matrix of width {}",
                row.len(),
                self.row_len
            )));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        if self.row_len == 0 {
            0
        } else {
            self.data.len() / self.row_len
        }
    }

    /// Symbols per row
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[Symbol]> {
        let start = index.checked_mul(self.row_len)?;
        self.data.get(start..start + self.row_len)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Symbol]> {
        // chunks_exact panics on zero width
        self.data.chunks_exact(self.row_len.max(1))
    }

    /// Row-major symbols
    pub fn as_slice(&self) -> &[Symbol] {
        &self.data
    }
}

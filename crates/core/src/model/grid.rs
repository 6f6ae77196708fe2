use serde::{Deserialize, Serialize};
use std::fmt;

use crate::generator::GeneratorError;
use crate::model::Operation;

//
// ─── COORDINATES ───────────────────────────────────────────────────────────────
//

/// Key of an answerable cell in a practice grid.
///
/// Cross-table cells are addressed by header position so repeated header
/// values never collide. Aggregation grids expose one key per row sum, one per
/// column sum, and the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridCoordinate {
    Cell { row: usize, col: usize },
    RowSum(usize),
    ColSum(usize),
    GrandTotal,
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridCoordinate::Cell { row, col } => write!(f, "cell-{row}-{col}"),
            GridCoordinate::RowSum(i) => write!(f, "row-{i}"),
            GridCoordinate::ColSum(j) => write!(f, "col-{j}"),
            GridCoordinate::GrandTotal => f.write_str("grand-total"),
        }
    }
}

//
// ─── CROSS TABLE ───────────────────────────────────────────────────────────────
//

/// Cross-table practice grid: every row header combined with every column
/// header under one operation.
///
/// Cell answers are computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTable {
    operation: Operation,
    row_headers: Vec<u64>,
    col_headers: Vec<u64>,
}

impl CrossTable {
    /// Build a table from explicit headers.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidParameter` if either header list is
    /// empty or the largest headers produce an unrepresentable cell.
    pub fn new(
        operation: Operation,
        row_headers: Vec<u64>,
        col_headers: Vec<u64>,
    ) -> Result<Self, GeneratorError> {
        if row_headers.is_empty() {
            return Err(GeneratorError::invalid("row_headers", "must not be empty"));
        }
        if col_headers.is_empty() {
            return Err(GeneratorError::invalid("col_headers", "must not be empty"));
        }
        let max_row = row_headers.iter().copied().max().unwrap_or_default();
        let max_col = col_headers.iter().copied().max().unwrap_or_default();
        if operation.evaluate(&[max_row, max_col]).is_none() {
            return Err(GeneratorError::invalid(
                "headers",
                "cell answers do not fit in u64",
            ));
        }

        Ok(Self {
            operation,
            row_headers,
            col_headers,
        })
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn row_headers(&self) -> &[u64] {
        &self.row_headers
    }

    #[must_use]
    pub fn col_headers(&self) -> &[u64] {
        &self.col_headers
    }

    /// Number of answerable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.row_headers.len() * self.col_headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Correct answer for the cell at (`row`, `col`), if it exists.
    #[must_use]
    pub fn cell_answer(&self, row: usize, col: usize) -> Option<u64> {
        let lhs = *self.row_headers.get(row)?;
        let rhs = *self.col_headers.get(col)?;
        self.operation.evaluate(&[lhs, rhs])
    }

    /// Cell coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        let cols = self.col_headers.len();
        (0..self.row_headers.len())
            .flat_map(move |row| (0..cols).map(move |col| GridCoordinate::Cell { row, col }))
    }
}

//
// ─── AGGREGATION GRID ──────────────────────────────────────────────────────────
//

/// Square grid of numbers whose row sums, column sums, and grand total are
/// the learner's targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationGrid {
    rows: Vec<Vec<u64>>,
}

impl AggregationGrid {
    /// Build a grid from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidParameter` if the grid is empty, not
    /// square, or its grand total overflows.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, GeneratorError> {
        let n = rows.len();
        if n == 0 {
            return Err(GeneratorError::invalid("dimension", "must be at least 1"));
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != n) {
            return Err(GeneratorError::invalid(
                "rows",
                format!("row {bad} has {} values, expected {n}", rows[bad].len()),
            ));
        }
        let total = rows
            .iter()
            .flatten()
            .try_fold(0_u64, |acc, &v| acc.checked_add(v));
        if total.is_none() {
            return Err(GeneratorError::invalid("rows", "grand total does not fit in u64"));
        }

        Ok(Self { rows })
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<u64> {
        self.rows.get(row)?.get(col).copied()
    }

    #[must_use]
    pub fn row_sum(&self, row: usize) -> Option<u64> {
        self.rows.get(row).map(|r| r.iter().sum())
    }

    #[must_use]
    pub fn col_sum(&self, col: usize) -> Option<u64> {
        if col >= self.dimension() {
            return None;
        }
        Some(self.rows.iter().map(|r| r[col]).sum())
    }

    /// Sum of every row sum.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        (0..self.dimension()).filter_map(|i| self.row_sum(i)).sum()
    }

    /// Answerable keys: row sums, then column sums, then the grand total.
    pub fn targets(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        let n = self.dimension();
        (0..n)
            .map(GridCoordinate::RowSum)
            .chain((0..n).map(GridCoordinate::ColSum))
            .chain(std::iter::once(GridCoordinate::GrandTotal))
    }
}

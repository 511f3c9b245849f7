//! Rectangular (expiry × strike) grid of implied volatilities.
//!
//! Rows are the sorted unique observed expiries, columns the sorted unique
//! observed strikes. Cells start missing; quotes are snapped into them and the
//! gaps are filled in two passes: first along every row (across strikes), then
//! along every column (across expiries) using the row-filled values. The order
//! matters: a cell reachable by both passes always takes its row-pass value.

use nalgebra::DMatrix;

use crate::error::{self, IvSurfError};
use crate::surface::interp::{fill_line, snap_to_bucket};

/// Expiry × strike matrix of implied volatilities with missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    expiries: Vec<f64>,
    strikes: Vec<f64>,
    cells: DMatrix<Option<f64>>,
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

fn check_axis(axis: &[f64], name: &str) -> error::Result<()> {
    if axis.is_empty() {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} axis must not be empty"),
        });
    }
    if axis.iter().any(|x| !x.is_finite()) {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} axis contains non-finite values"),
        });
    }
    if axis.windows(2).any(|w| w[0] >= w[1]) {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} axis must be strictly increasing"),
        });
    }
    Ok(())
}

impl SurfaceGrid {
    /// Create an all-missing grid over the given axes.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if an axis is empty, non-finite
    /// or not strictly increasing.
    pub fn empty(expiries: Vec<f64>, strikes: Vec<f64>) -> error::Result<Self> {
        check_axis(&expiries, "expiry")?;
        check_axis(&strikes, "strike")?;
        let cells = DMatrix::from_element(expiries.len(), strikes.len(), None);
        Ok(Self {
            expiries,
            strikes,
            cells,
        })
    }

    /// Create a grid from explicit rows (one per expiry).
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for invalid axes or ragged rows.
    pub fn from_rows(
        expiries: Vec<f64>,
        strikes: Vec<f64>,
        rows: &[Vec<Option<f64>>],
    ) -> error::Result<Self> {
        let mut grid = Self::empty(expiries, strikes)?;
        if rows.len() != grid.expiries.len() {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "expected {} rows, got {}",
                    grid.expiries.len(),
                    rows.len()
                ),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != grid.strikes.len() {
                return Err(IvSurfError::InvalidInput {
                    message: format!(
                        "row {i} has {} cells, expected {}",
                        row.len(),
                        grid.strikes.len()
                    ),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                grid.cells[(i, j)] = v;
            }
        }
        Ok(grid)
    }

    /// Place `(expiry, strike, iv)` observations on a grid spanned by their
    /// unique expiries and strikes.
    ///
    /// Each point is snapped to the nearest row and column (lowest index on an
    /// exact tie). Collisions are not averaged: the last point written wins.
    ///
    /// # Errors
    /// Returns [`IvSurfError::EmptyStage`] for no points and
    /// [`IvSurfError::InvalidInput`] for non-finite coordinates.
    pub fn place(points: &[(f64, f64, f64)]) -> error::Result<Self> {
        if points.is_empty() {
            return Err(IvSurfError::EmptyStage {
                stage: error::Stage::Build,
            });
        }
        let expiries = sorted_unique(points.iter().map(|p| p.0));
        let strikes = sorted_unique(points.iter().map(|p| p.1));
        let mut grid = Self::empty(expiries, strikes)?;
        for &(t, k, iv) in points {
            if !iv.is_finite() {
                return Err(IvSurfError::InvalidInput {
                    message: format!("non-finite IV at expiry {t} strike {k}"),
                });
            }
            if let (Some(i), Some(j)) = (
                snap_to_bucket(&grid.expiries, t),
                snap_to_bucket(&grid.strikes, k),
            ) {
                grid.cells[(i, j)] = Some(iv);
            }
        }
        Ok(grid)
    }

    /// Fill each row with at least two known cells across strikes.
    pub fn fill_rows(mut self) -> Self {
        for i in 0..self.cells.nrows() {
            let mut row: Vec<Option<f64>> = self.cells.row(i).iter().copied().collect();
            if fill_line(&self.strikes, &mut row) > 0 {
                for (j, v) in row.into_iter().enumerate() {
                    self.cells[(i, j)] = v;
                }
            }
        }
        self
    }

    /// Fill each column with at least two known cells across expiries.
    pub fn fill_columns(mut self) -> Self {
        for j in 0..self.cells.ncols() {
            let mut col: Vec<Option<f64>> = self.cells.column(j).iter().copied().collect();
            if fill_line(&self.expiries, &mut col) > 0 {
                for (i, v) in col.into_iter().enumerate() {
                    self.cells[(i, j)] = v;
                }
            }
        }
        self
    }

    /// Row fill followed by column fill.
    pub fn filled(self) -> Self {
        self.fill_rows().fill_columns()
    }

    /// Sorted unique expiries (rows).
    pub fn expiries(&self) -> &[f64] {
        &self.expiries
    }

    /// Sorted unique strikes (columns).
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.cells.shape()
    }

    /// Cell value, `None` when missing or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get((row, col)).copied().flatten()
    }

    /// Cells of one row, in strike order.
    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        (0..self.strikes.len()).map(|j| self.get(row, j)).collect()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    /// Row-major copy of a complete grid.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InsufficientData`] naming the first missing cell.
    pub fn to_matrix(&self) -> error::Result<Vec<Vec<f64>>> {
        (0..self.expiries.len())
            .map(|i| {
                (0..self.strikes.len())
                    .map(|j| {
                        self.get(i, j).ok_or_else(|| IvSurfError::InsufficientData {
                            message: format!(
                                "cell at expiry {} strike {} is still missing after row and column fill",
                                self.expiries[i], self.strikes[j]
                            ),
                        })
                    })
                    .collect::<error::Result<Vec<f64>>>()
            })
            .collect()
    }
}

//! Bilinear surface over a completed implied volatility grid.
//!
//! Inside the grid the surface is the tensor product of linear interpolants in
//! expiry and strike, so every interior value lies between its four
//! surrounding grid values. Queries outside the grid are clamped to its edges,
//! so the surface is flat beyond the outermost expiries and strikes and never
//! leaves the range of the grid values.

use crate::error::{self, IvSurfError};
use crate::surface::VolSurface;
use crate::surface::grid::SurfaceGrid;
use crate::surface::interp::{clamp_to_axis, segment, snap_to_bucket};
use crate::types::{Strike, Tenor, Variance, Vol};
use crate::validate::validate_finite;

/// Continuous (expiry, strike) → IV surface backed by a complete grid.
#[derive(Debug, Clone)]
pub struct GridSurface {
    grid: SurfaceGrid,
    /// Row-major copy of the grid cells.
    values: Vec<Vec<f64>>,
}

impl GridSurface {
    /// Fit the interpolant over a grid with no missing cells.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InsufficientData`] if any cell is missing.
    pub fn new(grid: SurfaceGrid) -> error::Result<Self> {
        let values = grid.to_matrix()?;
        Ok(Self { grid, values })
    }

    /// The completed grid the surface interpolates.
    pub fn grid(&self) -> &SurfaceGrid {
        &self.grid
    }

    pub fn expiries(&self) -> &[f64] {
        self.grid.expiries()
    }

    pub fn strikes(&self) -> &[f64] {
        self.grid.strikes()
    }

    /// Row-major grid values (rows = expiries, columns = strikes).
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// The grid strike nearest `strike` (lowest on an exact tie).
    pub fn nearest_strike(&self, strike: f64) -> Option<Strike> {
        snap_to_bucket(self.strikes(), strike).map(|j| Strike(self.strikes()[j]))
    }

    /// Grid IVs at the strike column nearest `reference_strike`, one per expiry.
    ///
    /// With the spot price as reference this is the at-the-money term structure.
    pub fn atm_term_structure(&self, reference_strike: f64) -> Vec<(Tenor, Vol)> {
        let Some(j) = snap_to_bucket(self.strikes(), reference_strike) else {
            return Vec::new();
        };
        self.expiries()
            .iter()
            .zip(&self.values)
            .map(|(&t, row)| (Tenor(t), Vol(row[j])))
            .collect()
    }

    fn evaluate(&self, expiry: f64, strike: f64) -> f64 {
        let expiry = clamp_to_axis(self.expiries(), expiry);
        let strike = clamp_to_axis(self.strikes(), strike);
        let (i0, i1, wt) = segment(self.expiries(), expiry);
        let (j0, j1, wk) = segment(self.strikes(), strike);
        let lower = (1.0 - wk) * self.values[i0][j0] + wk * self.values[i0][j1];
        let upper = (1.0 - wk) * self.values[i1][j0] + wk * self.values[i1][j1];
        (1.0 - wt) * lower + wt * upper
    }
}

impl VolSurface for GridSurface {
    fn black_vol(&self, expiry: f64, strike: f64) -> error::Result<Vol> {
        validate_finite(expiry, "expiry")?;
        validate_finite(strike, "strike")?;
        let v = self.evaluate(expiry, strike);
        if !v.is_finite() {
            return Err(IvSurfError::InvalidInput {
                message: format!("surface is undefined at expiry {expiry} strike {strike}"),
            });
        }
        Ok(Vol(v))
    }

    fn black_variance(&self, expiry: f64, strike: f64) -> error::Result<Variance> {
        let vol = self.black_vol(expiry, strike)?;
        Ok(Variance(vol.0 * vol.0 * expiry))
    }
}

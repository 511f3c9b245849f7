//! Ergonomic builder API for grid surface construction.
//!
//! ```
//! use ivsurface::surface::{SurfaceBuilder, VolSurface};
//!
//! let strikes = [400.0, 425.0, 450.0, 475.0, 500.0];
//! let short = [0.26, 0.24, 0.22, 0.215, 0.21];
//! let long = [0.25, 0.235, 0.225, 0.22, 0.218];
//!
//! let surface = SurfaceBuilder::new()
//!     .add_expiry(15.0 / 365.0, &strikes, &short)
//!     .add_expiry(45.0 / 365.0, &strikes, &long)
//!     .build()
//!     .unwrap();
//!
//! let vol = surface.black_vol(30.0 / 365.0, 440.0).unwrap();
//! assert!(vol.0 > 0.2 && vol.0 < 0.25);
//! ```

use crate::error::{self, IvSurfError, Stage};
use crate::surface::bilinear::GridSurface;
use crate::surface::grid::SurfaceGrid;
use crate::types::Quote;

/// Builder for a [`GridSurface`] from scattered (expiry, strike, IV) points.
///
/// Points are accumulated as given and validated in [`build`](Self::build):
/// the grid is placed, row-filled, column-filled and then fitted.
#[derive(Debug, Default)]
pub struct SurfaceBuilder {
    points: Vec<(f64, f64, Option<f64>)>,
}

impl SurfaceBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn add_point(mut self, expiry: f64, strike: f64, iv: f64) -> Self {
        self.points.push((expiry, strike, Some(iv)));
        self
    }

    /// Add a strike slice at one expiry.
    ///
    /// Extra strikes or vols beyond the shorter of the two slices are ignored.
    pub fn add_expiry(mut self, expiry: f64, strikes: &[f64], vols: &[f64]) -> Self {
        self.points.extend(
            strikes
                .iter()
                .zip(vols)
                .map(|(&k, &v)| (expiry, k, Some(v))),
        );
        self
    }

    /// Add solved quotes. Quotes without an IV make [`build`](Self::build) fail.
    pub fn add_quotes(mut self, quotes: &[Quote]) -> Self {
        self.points
            .extend(quotes.iter().map(|q| (q.expiry(), q.strike(), q.iv())));
        self
    }

    /// Number of accumulated points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Place, fill and fit the surface.
    ///
    /// # Errors
    /// - [`IvSurfError::EmptyStage`] with [`Stage::Build`] if no points were added
    /// - [`IvSurfError::InvalidInput`] for a point without IV or with
    ///   non-finite coordinates
    /// - [`IvSurfError::InsufficientData`] if the data is too sparse for the
    ///   two fill passes to complete the grid
    pub fn build(self) -> error::Result<GridSurface> {
        #[cfg(feature = "logging")]
        tracing::debug!(n_points = self.points.len(), "surface build started");

        if self.points.is_empty() {
            return Err(IvSurfError::EmptyStage {
                stage: Stage::Build,
            });
        }

        let points = self
            .points
            .iter()
            .map(|&(t, k, iv)| match iv {
                Some(v) if t.is_finite() && k.is_finite() => Ok((t, k, v)),
                Some(_) => Err(IvSurfError::InvalidInput {
                    message: format!("non-finite coordinates: expiry {t}, strike {k}"),
                }),
                None => Err(IvSurfError::InvalidInput {
                    message: format!("point at expiry {t} strike {k} has no implied volatility"),
                }),
            })
            .collect::<error::Result<Vec<_>>>()?;

        let placed = SurfaceGrid::place(&points)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            rows = placed.shape().0,
            cols = placed.shape().1,
            missing = placed.missing_count(),
            "quotes placed on grid"
        );

        let grid = placed.filled();

        #[cfg(feature = "logging")]
        tracing::debug!(missing = grid.missing_count(), "surface grid filled");

        GridSurface::new(grid)
    }
}

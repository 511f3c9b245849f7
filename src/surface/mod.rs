//! Grid-based implied volatility surface construction.
//!
//! - [`SurfaceGrid`]: expiry × strike matrix with missing cells, snap-to-bucket
//!   placement and two-pass linear fill
//! - [`GridSurface`]: bilinear interpolant over a completed grid
//! - [`SurfaceBuilder`]: assembles a [`GridSurface`] from solved quotes

pub mod bilinear;
pub mod builder;
pub mod grid;
pub(crate) mod interp;

pub use bilinear::GridSurface;
pub use builder::SurfaceBuilder;
pub use grid::SurfaceGrid;
pub use interp::snap_to_bucket;

use crate::error;
use crate::types::{Variance, Vol};

/// A volatility surface: (expiry, strike) → implied vol.
///
/// Implementations must be `Send + Sync` so a finished surface can be shared
/// via `Arc` across threads. Surfaces are immutable after construction.
///
/// # Examples
///
/// ```
/// use ivsurface::surface::{SurfaceBuilder, VolSurface};
///
/// let surface = SurfaceBuilder::new()
///     .add_point(0.1, 90.0, 0.24)
///     .add_point(0.1, 110.0, 0.20)
///     .add_point(0.3, 90.0, 0.22)
///     .add_point(0.3, 110.0, 0.19)
///     .build()?;
///
/// let vol = surface.black_vol(0.2, 100.0)?;
/// assert!((vol.0 - 0.2125).abs() < 1e-12);
/// # Ok::<(), ivsurface::IvSurfError>(())
/// ```
pub trait VolSurface: Send + Sync + std::fmt::Debug {
    /// Implied volatility σ(T, K).
    fn black_vol(&self, expiry: f64, strike: f64) -> error::Result<Vol>;

    /// Total variance σ²(T, K) · T.
    fn black_variance(&self, expiry: f64, strike: f64) -> error::Result<Variance>;
}

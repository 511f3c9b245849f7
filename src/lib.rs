//! # ivsurface
//!
//! Implied volatility surface construction from option quotes.
//!
//! The pipeline: raw option rows → prepared quotes → implied vol extraction →
//! butterfly filtering → grid placement and fill → bilinear surface → CSV.
//!
//! ## Architecture
//!
//! - **`source`**: quote providers, row preparation, synthetic fallback data
//! - **`implied`**: Black-Scholes pricing and the bracketed IV solver
//! - **`smile`**: per-expiry curves and the butterfly (local concavity) filter
//! - **`surface`**: grid placement, two-pass fill and bilinear interpolation
//! - **`pipeline`**: the stage-by-stage orchestrator with diagnostics
//! - **`export`**: labeled CSV output of the filled grid
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for inputs.** [`Vol`], [`Variance`],
//!   [`Strike`], [`Tenor`] wrap return values to prevent accidental mixing.
//! - **Undefined is a value.** An IV that cannot be bracketed is `None`, never
//!   a sentinel number; undefined quotes are dropped before filtering.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Immutable surfaces.** A [`GridSurface`] cannot be modified once built and
//!   is `Send + Sync`, so it can be queried concurrently through an `Arc`.
//!
//! ```
//! use ivsurface::{Pipeline, PipelineConfig, VolSurface};
//! use ivsurface::source::SyntheticSource;
//!
//! let run = Pipeline::new(PipelineConfig::default())?.run(&SyntheticSource::new())?;
//! let atm = run.surface().black_vol(60.0 / 365.0, 450.0)?;
//! assert!(atm.0 > 0.1 && atm.0 < 0.4);
//! # Ok::<(), ivsurface::IvSurfError>(())
//! ```

pub mod config;
pub mod conventions;
pub mod error;
pub mod export;
pub mod implied;
mod optim;
pub mod pipeline;
pub mod smile;
pub mod source;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use config::PipelineConfig;
#[doc(inline)]
pub use error::{IvSurfError, Result, Stage};
#[doc(inline)]
pub use pipeline::{Pipeline, PipelineDiagnostics, PipelineRun};
#[doc(inline)]
pub use surface::{GridSurface, VolSurface};
#[doc(inline)]
pub use types::{OptionType, Quote, RawQuote, Strike, Tenor, Variance, Vol};

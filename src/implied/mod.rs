//! Option pricing and implied volatility extraction.
//!
//! - [`black`]: Black-Scholes closed form with intrinsic fallback
//! - [`solver`]: Brent inversion of the closed form, `None` when undefined

pub mod black;
pub mod solver;

pub use black::{call_price, norm_cdf, price, put_price};
pub use solver::{ImpliedVolSolver, SolverConfig, implied_volatility};

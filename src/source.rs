//! Quote sources and raw-row preparation.
//!
//! Live market-data clients live outside this crate and plug in through
//! [`QuoteSource`]. Rows are cleaned by [`prepare_quotes`] before the core
//! sees them; a [`SyntheticSource`] provides deterministic data and
//! [`FallbackSource`] substitutes it when a provider fails. Downstream stages
//! treat real and synthetic rows identically.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::config::PipelineConfig;
use crate::conventions::tenor_from_days;
use crate::error::{self, IvSurfError};
use crate::implied::call_price;
use crate::types::{OptionType, Quote, RawQuote};

/// A provider of raw option rows for one run.
pub trait QuoteSource {
    /// Fetch every row for the run.
    ///
    /// # Errors
    /// Implementations return [`IvSurfError::Source`] when the provider fails.
    fn fetch(&self) -> error::Result<Vec<RawQuote>>;
}

/// Rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawQuote>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawQuote>) -> Self {
        Self { rows }
    }
}

impl QuoteSource for MemorySource {
    fn fetch(&self) -> error::Result<Vec<RawQuote>> {
        Ok(self.rows.clone())
    }
}

/// Turn raw rows into core quotes.
///
/// Derives the mid price as `(bid + ask) / 2` and the expiry as `days / 365`.
/// Drops rows with a non-positive mid, volume, strike or underlying, any
/// non-finite field, or days-to-expiry outside the configured inclusive window.
pub fn prepare_quotes(rows: &[RawQuote], config: &PipelineConfig) -> Vec<Quote> {
    rows.iter()
        .filter(|r| r.volume.is_finite() && r.volume > 0.0)
        .filter(|r| r.days_to_expiry >= config.days_min && r.days_to_expiry <= config.days_max)
        .filter_map(|r| {
            Quote::new(
                r.strike,
                tenor_from_days(r.days_to_expiry),
                r.option_type,
                r.mid(),
                r.underlying,
                config.risk_free_rate,
            )
            .ok()
            .map(|q| q.with_label(r.expiry_label.clone()))
        })
        .collect()
}

/// Deterministic synthetic call quotes from a skewed smile with noise.
///
/// The true IV at strike `K` and expiry `T` is
/// `clamp(0.22 − 0.0004·(K − S) + 0.015·√T + ε, 0.08, 0.7)` with
/// `ε ~ N(0, 0.008)`; the quoted mid is the Black-Scholes call price at that
/// vol scaled by `1 + N(0, 0.005)`. The same seed always yields the same rows.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    spot: f64,
    strikes: Vec<f64>,
    expiry_days: Vec<f64>,
    rate: f64,
    seed: u64,
    vol_noise: f64,
    price_noise: f64,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        let strikes = (0..25).map(|i| 400.0 + 100.0 * i as f64 / 24.0).collect();
        Self {
            spot: 450.0,
            strikes,
            expiry_days: vec![15.0, 30.0, 45.0, 60.0, 90.0, 120.0, 180.0],
            rate: 0.045,
            seed: 42,
            vol_noise: 0.008,
            price_noise: 0.005,
        }
    }
}

impl SyntheticSource {
    /// Synthetic source with the default 25×7 layout around spot 450.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = spot;
        self
    }

    pub fn strikes(mut self, strikes: Vec<f64>) -> Self {
        self.strikes = strikes;
        self
    }

    pub fn expiry_days(mut self, days: Vec<f64>) -> Self {
        self.expiry_days = days;
        self
    }

    /// Rate used to price the synthetic quotes.
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Standard deviations of the IV and relative price noise; zero disables.
    pub fn noise(mut self, vol_noise: f64, price_noise: f64) -> Self {
        self.vol_noise = vol_noise;
        self.price_noise = price_noise;
        self
    }

    /// Noise-free IV of the synthetic smile.
    pub fn smile_vol(&self, strike: f64, expiry: f64) -> f64 {
        0.22 - 0.0004 * (strike - self.spot) + 0.015 * expiry.sqrt()
    }
}

impl QuoteSource for SyntheticSource {
    fn fetch(&self) -> error::Result<Vec<RawQuote>> {
        let noise = |sd: f64| {
            if !(sd.is_finite() && sd >= 0.0) {
                return Err(IvSurfError::Source {
                    message: format!("synthetic noise level must be finite and non-negative, got {sd}"),
                });
            }
            Normal::new(0.0, sd).map_err(|e| IvSurfError::Source {
                message: format!("invalid synthetic noise level {sd}: {e}"),
            })
        };
        let vol_dist = noise(self.vol_noise)?;
        let price_dist = noise(self.price_noise)?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut rows = Vec::with_capacity(self.strikes.len() * self.expiry_days.len());
        for &days in &self.expiry_days {
            let t = tenor_from_days(days);
            for &k in &self.strikes {
                let iv = (self.smile_vol(k, t) + vol_dist.sample(&mut rng)).clamp(0.08, 0.7);
                let price = call_price(self.spot, k, t, self.rate, iv);
                let mid = price * (1.0 + price_dist.sample(&mut rng));
                rows.push(RawQuote {
                    strike: k,
                    bid: mid,
                    ask: mid,
                    volume: 100.0,
                    expiry_label: "sim".into(),
                    days_to_expiry: days,
                    option_type: OptionType::Call,
                    underlying: self.spot,
                });
            }
        }
        Ok(rows)
    }
}

/// Uses `primary`, substituting `fallback` when it fails or returns nothing.
#[derive(Debug, Clone)]
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: QuoteSource, F: QuoteSource> QuoteSource for FallbackSource<P, F> {
    fn fetch(&self) -> error::Result<Vec<RawQuote>> {
        match self.primary.fetch() {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => {
                #[cfg(feature = "logging")]
                tracing::warn!("primary quote source returned no rows, using fallback");
                self.fallback.fetch()
            }
            Err(_err) => {
                #[cfg(feature = "logging")]
                tracing::warn!(error = %_err, "primary quote source failed, using fallback");
                self.fallback.fetch()
            }
        }
    }
}

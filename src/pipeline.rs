//! End-to-end run: fetch → prepare → solve → filter → build.
//!
//! Each stage is a pure function of the previous stage's complete output, and
//! is public so it can be exercised in isolation. [`Pipeline`] strings them
//! together for one run and turns an empty collection at any boundary into a
//! fatal [`IvSurfError::EmptyStage`] naming the stage responsible.
//!
//! ```
//! use ivsurface::{Pipeline, PipelineConfig, VolSurface};
//! use ivsurface::source::SyntheticSource;
//!
//! let run = Pipeline::new(PipelineConfig::default())?.run(&SyntheticSource::new())?;
//! assert!(run.surface().grid().is_complete());
//! let vol = run.surface().black_vol(0.2, 450.0)?;
//! assert!(vol.0 > 0.1 && vol.0 < 0.4);
//! # Ok::<(), ivsurface::IvSurfError>(())
//! ```

use std::io;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{self, IvSurfError, Stage};
use crate::export::{self, SurfaceSnapshot};
use crate::implied::ImpliedVolSolver;
use crate::smile::{ArbitrageFilter, ArbitrageReport};
use crate::source::{QuoteSource, prepare_quotes};
use crate::surface::{GridSurface, SurfaceBuilder};
use crate::types::{Quote, RawQuote};

/// Attach an implied volatility (possibly `None`) to every quote.
///
/// Input order is preserved. With the `parallel` feature the solves run on
/// the rayon thread pool; each solve is independent.
pub fn solve_quotes(quotes: &[Quote], solver: &ImpliedVolSolver) -> Vec<Quote> {
    #[cfg(feature = "parallel")]
    let solved = quotes
        .par_iter()
        .map(|q| q.with_iv(solver.solve(q)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let solved = quotes
        .iter()
        .map(|q| q.with_iv(solver.solve(q)))
        .collect();
    solved
}

/// Keep quotes with a defined IV inside the config's plausibility band.
pub fn retain_plausible(quotes: &[Quote], config: &PipelineConfig) -> Vec<Quote> {
    quotes
        .iter()
        .filter(|q| q.iv().is_some_and(|iv| config.is_plausible(iv)))
        .cloned()
        .collect()
}

/// Drop butterfly violations with the given convexity threshold.
///
/// # Errors
/// Returns [`IvSurfError::InvalidInput`] for a non-finite threshold or a quote
/// without IV.
pub fn filter_curves(quotes: &[Quote], threshold: f64) -> error::Result<(Vec<Quote>, ArbitrageReport)> {
    ArbitrageFilter::new(threshold)?.filter_report(quotes)
}

/// Place, fill and fit a surface over solved quotes.
///
/// # Errors
/// Returns [`IvSurfError::EmptyStage`] with [`Stage::Build`] for an empty
/// collection; see [`SurfaceBuilder::build`] for the rest.
pub fn build_surface(quotes: &[Quote]) -> error::Result<GridSurface> {
    SurfaceBuilder::new().add_quotes(quotes).build()
}

/// Quote counts at each stage boundary of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Rows delivered by the source.
    pub fetched: usize,
    /// Quotes surviving row preparation.
    pub prepared: usize,
    /// Quotes whose implied volatility was undefined.
    pub unsolved: usize,
    /// Quotes with a defined IV outside the plausibility band.
    pub implausible: usize,
    /// Quotes removed by the butterfly filter.
    pub filtered_out: usize,
    /// Quotes placed on the surface grid.
    pub surviving: usize,
    /// Points flagged by the butterfly filter.
    pub arbitrage: ArbitrageReport,
}

impl PipelineDiagnostics {
    /// Every row or quote dropped between fetch and build.
    pub fn dropped(&self) -> usize {
        self.fetched.saturating_sub(self.prepared)
            + self.unsolved
            + self.implausible
            + self.filtered_out
    }
}

/// Output of one pipeline run. Read-only.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    surface: GridSurface,
    quotes: Vec<Quote>,
    diagnostics: PipelineDiagnostics,
}

impl PipelineRun {
    pub fn surface(&self) -> &GridSurface {
        &self.surface
    }

    pub fn into_surface(self) -> GridSurface {
        self.surface
    }

    /// The filtered, solved quotes the surface was built from.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn diagnostics(&self) -> &PipelineDiagnostics {
        &self.diagnostics
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot::from(&self.surface)
    }

    /// Export the completed grid as labeled CSV.
    ///
    /// # Errors
    /// See [`export::write_csv`].
    pub fn write_csv<W: io::Write>(&self, writer: W) -> error::Result<()> {
        export::write_csv(self.surface.grid(), writer)
    }

    /// Export the completed grid to a CSV file.
    ///
    /// # Errors
    /// See [`export::save_csv`].
    pub fn save_csv(&self, path: impl AsRef<Path>) -> error::Result<()> {
        export::save_csv(self.surface.grid(), path)
    }
}

/// Single-pass, non-reentrant pipeline with settings fixed at construction.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    solver: ImpliedVolSolver,
    filter: ArbitrageFilter,
}

impl Pipeline {
    /// Create a pipeline after validating the config.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if the config is invalid.
    pub fn new(config: PipelineConfig) -> error::Result<Self> {
        config.validate()?;
        let solver = ImpliedVolSolver::new(config.solver)?;
        let filter = ArbitrageFilter::new(config.convexity_threshold)?;
        Ok(Self {
            config,
            solver,
            filter,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch from `source` and run every stage.
    ///
    /// # Errors
    /// Propagates source errors; returns [`IvSurfError::EmptyStage`] when a
    /// stage leaves no quotes.
    pub fn run(&self, source: &dyn QuoteSource) -> error::Result<PipelineRun> {
        let rows = source.fetch()?;
        self.run_rows(&rows)
    }

    /// Run every stage on rows already fetched.
    ///
    /// # Errors
    /// Returns [`IvSurfError::EmptyStage`] when a stage leaves no quotes.
    pub fn run_rows(&self, rows: &[RawQuote]) -> error::Result<PipelineRun> {
        if rows.is_empty() {
            return Err(IvSurfError::EmptyStage {
                stage: Stage::Fetch,
            });
        }
        let quotes = prepare_quotes(rows, &self.config);
        if quotes.is_empty() {
            return Err(IvSurfError::EmptyStage {
                stage: Stage::Prepare,
            });
        }
        let mut run = self.run_quotes(&quotes)?;
        run.diagnostics.fetched = rows.len();
        Ok(run)
    }

    /// Run solve, filter and build on prepared quotes.
    ///
    /// # Errors
    /// Returns [`IvSurfError::EmptyStage`] when a stage leaves no quotes.
    pub fn run_quotes(&self, quotes: &[Quote]) -> error::Result<PipelineRun> {
        #[cfg(feature = "logging")]
        tracing::debug!(n_quotes = quotes.len(), "solving implied volatilities");

        let solved = solve_quotes(quotes, &self.solver);
        let unsolved = solved.iter().filter(|q| q.iv().is_none()).count();
        let plausible = retain_plausible(&solved, &self.config);
        let implausible = solved.len() - unsolved - plausible.len();
        if plausible.is_empty() {
            return Err(IvSurfError::EmptyStage { stage: Stage::Solve });
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            solved = plausible.len(),
            unsolved,
            implausible,
            "implied volatilities computed"
        );

        let (filtered, arbitrage) = self.filter.filter_report(&plausible)?;
        if filtered.is_empty() {
            return Err(IvSurfError::EmptyStage {
                stage: Stage::Filter,
            });
        }

        let surface = build_surface(&filtered)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            rows = surface.expiries().len(),
            cols = surface.strikes().len(),
            "surface ready"
        );

        let diagnostics = PipelineDiagnostics {
            fetched: quotes.len(),
            prepared: quotes.len(),
            unsolved,
            implausible,
            filtered_out: plausible.len() - filtered.len(),
            surviving: filtered.len(),
            arbitrage,
        };
        Ok(PipelineRun {
            surface,
            quotes: filtered,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implied::call_price;
    use crate::source::{MemorySource, SyntheticSource};
    use crate::surface::VolSurface;
    use crate::types::OptionType;

    fn quote(strike: f64, days: f64, vol: f64) -> Quote {
        let t = days / 365.0;
        let mid = call_price(450.0, strike, t, 0.045, vol);
        Quote::new(strike, t, OptionType::Call, mid, 450.0, 0.045).unwrap()
    }

    #[test]
    fn solve_preserves_order_and_marks_undefined() {
        let good = quote(450.0, 30.0, 0.2);
        // Call price above the underlying: no volatility reproduces it.
        let bad = Quote::new(450.0, 30.0 / 365.0, OptionType::Call, 500.0, 450.0, 0.045).unwrap();
        let solved = solve_quotes(&[good.clone(), bad], &ImpliedVolSolver::default());
        assert_eq!(solved.len(), 2);
        assert!((solved[0].iv().unwrap() - 0.2).abs() < 1e-5);
        assert!(solved[1].iv().is_none());
        assert_eq!(solved[0].strike(), good.strike());
    }

    #[test]
    fn retain_plausible_uses_exclusive_band() {
        let base = quote(450.0, 30.0, 0.2);
        let quotes = vec![
            base.with_iv(None),
            base.with_iv(Some(0.01)),
            base.with_iv(Some(0.2)),
            base.with_iv(Some(3.0)),
        ];
        let kept = retain_plausible(&quotes, &PipelineConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].iv(), Some(0.2));
    }

    #[test]
    fn retain_plausible_follows_configured_band() {
        let base = quote(450.0, 30.0, 0.2);
        let quotes = vec![base.with_iv(Some(0.2)), base.with_iv(Some(0.6))];
        let cfg = PipelineConfig::default().with_iv_band(0.3, 1.0);
        let kept = retain_plausible(&quotes, &cfg);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].iv(), Some(0.6));
    }

    #[test]
    fn dropped_tolerates_inconsistent_counts() {
        let d = PipelineDiagnostics {
            fetched: 2,
            prepared: 5,
            unsolved: 1,
            implausible: 1,
            filtered_out: 1,
            ..PipelineDiagnostics::default()
        };
        assert_eq!(d.dropped(), 3);
    }

    #[test]
    fn empty_fetch_is_fatal() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let err = pipeline.run(&MemorySource::default()).unwrap_err();
        assert!(matches!(err, IvSurfError::EmptyStage { stage: Stage::Fetch }));
    }

    #[test]
    fn rows_outside_window_are_fatal_at_prepare() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_days_window(200.0, 300.0))
            .unwrap();
        let err = pipeline.run(&SyntheticSource::new()).unwrap_err();
        assert!(matches!(
            err,
            IvSurfError::EmptyStage {
                stage: Stage::Prepare
            }
        ));
    }

    #[test]
    fn all_unsolvable_is_fatal_at_solve() {
        let bad = Quote::new(450.0, 0.1, OptionType::Call, 900.0, 450.0, 0.0).unwrap();
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let err = pipeline.run_quotes(&[bad]).unwrap_err();
        assert!(matches!(err, IvSurfError::EmptyStage { stage: Stage::Solve }));
    }

    #[test]
    fn filter_keeps_curve_endpoints() {
        // A threshold above any second difference flags every interior point.
        let quotes = vec![quote(440.0, 30.0, 0.2), quote(450.0, 30.0, 0.2), quote(460.0, 30.0, 0.2)];
        let pipeline = Pipeline::new(PipelineConfig::default().with_convexity_threshold(1.0))
            .unwrap();
        let run = pipeline.run_quotes(&quotes).unwrap();
        assert_eq!(run.diagnostics().filtered_out, 1);
        assert_eq!(run.diagnostics().surviving, 2);
        assert_eq!(run.surface().strikes(), &[440.0, 460.0]);
    }

    #[test]
    fn single_quote_builds_constant_surface() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let run = pipeline.run_quotes(&[quote(450.0, 30.0, 0.2)]).unwrap();
        assert_eq!(run.diagnostics().surviving, 1);
        let v = run.surface().black_vol(0.5, 300.0).unwrap();
        assert!((v.0 - 0.2).abs() < 1e-5);
    }

    #[test]
    fn synthetic_run_counts_add_up() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let run = pipeline.run(&SyntheticSource::new()).unwrap();
        let d = run.diagnostics();
        assert_eq!(d.fetched, 175);
        assert_eq!(d.prepared, 175);
        assert_eq!(
            d.prepared,
            d.unsolved + d.implausible + d.filtered_out + d.surviving
        );
        assert_eq!(d.dropped(), d.fetched - d.surviving);
        assert_eq!(run.quotes().len(), d.surviving);
        assert!(run.surface().grid().is_complete());
    }

    #[test]
    fn run_exports_csv() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let run = pipeline.run(&SyntheticSource::new()).unwrap();
        let mut buf = Vec::new();
        run.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("T,"));
        assert_eq!(text.lines().count(), run.surface().expiries().len() + 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = PipelineConfig::default().with_iv_band(0.5, 0.1);
        assert!(Pipeline::new(cfg).is_err());
    }

    #[test]
    fn surface_reproduces_solved_vols_at_nodes() {
        let strikes = [430.0, 440.0, 450.0, 460.0, 470.0];
        let quotes: Vec<Quote> = [15.0, 45.0]
            .iter()
            .flat_map(|&d| strikes.iter().map(move |&k| quote(k, d, 0.2 + 0.0002 * (450.0 - k))))
            .collect();
        let run = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .run_quotes(&quotes)
            .unwrap();
        for q in run.quotes() {
            let v = run.surface().black_vol(q.expiry(), q.strike()).unwrap();
            assert!((v.0 - q.iv().unwrap()).abs() < 1e-12);
        }
    }
}

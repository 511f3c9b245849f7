//! Run the full pipeline on synthetic quotes and export the grid as CSV.
//!
//! The primary source here always fails, so the run falls back to the
//! seeded synthetic chain, as it would when a live provider is down.
//!
//! Run with: `cargo run --example export_grid -- [output.csv]`

use ivsurface::source::{FallbackSource, MemorySource, SyntheticSource};
use ivsurface::{Pipeline, PipelineConfig, VolSurface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "iv_surface.csv".to_string());

    let config = PipelineConfig::default();
    let source = FallbackSource::new(MemorySource::default(), SyntheticSource::new());
    let run = Pipeline::new(config)?.run(&source)?;

    let d = run.diagnostics();
    println!("Pipeline diagnostics");
    println!("  fetched:      {}", d.fetched);
    println!("  prepared:     {}", d.prepared);
    println!("  unsolved:     {}", d.unsolved);
    println!("  implausible:  {}", d.implausible);
    println!("  filtered out: {}", d.filtered_out);
    println!("  on surface:   {}", d.surviving);

    if let Some(worst) = d.arbitrage.worst_violation() {
        println!(
            "  worst butterfly: T={:.4} K={:.2} d2={:.4}",
            worst.expiry, worst.strike, worst.second_difference
        );
    }

    let surface = run.surface();
    let (rows, cols) = surface.grid().shape();
    println!("\nGrid: {rows} expiries x {cols} strikes");
    println!(
        "ATM 60d vol: {:.2}%",
        surface.black_vol(60.0 / 365.0, 450.0)?.0 * 100.0
    );

    run.save_csv(&path)?;
    println!("Saved {path}");
    Ok(())
}

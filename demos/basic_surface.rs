//! Build a volatility surface from scattered implied vols and query it.
//!
//! Demonstrates:
//!   1. Adding per-expiry (strike, vol) slices with different strike sets
//!   2. Building a filled grid surface via SurfaceBuilder
//!   3. Querying vol/variance inside and outside the grid
//!
//! Run with: `cargo run --example basic_surface`

use ivsurface::surface::{SurfaceBuilder, VolSurface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ---------------------------------------------------------------
    // 1. Market data: three expiries, strikes not aligned across them
    // ---------------------------------------------------------------

    let short_strikes = [420.0, 430.0, 440.0, 450.0, 460.0, 470.0, 480.0];
    let short_vols = [0.27, 0.26, 0.25, 0.24, 0.236, 0.232, 0.23];

    let mid_strikes = [420.0, 440.0, 460.0, 480.0];
    let mid_vols = [0.265, 0.248, 0.238, 0.233];

    let long_strikes = [430.0, 450.0, 470.0];
    let long_vols = [0.255, 0.243, 0.236];

    // ---------------------------------------------------------------
    // 2. Build: place, row fill, column fill, bilinear fit
    // ---------------------------------------------------------------

    let surface = SurfaceBuilder::new()
        .add_expiry(15.0 / 365.0, &short_strikes, &short_vols)
        .add_expiry(45.0 / 365.0, &mid_strikes, &mid_vols)
        .add_expiry(90.0 / 365.0, &long_strikes, &long_vols)
        .build()?;

    let (rows, cols) = surface.grid().shape();
    println!("Surface built: {rows} expiries x {cols} strikes\n");

    // ---------------------------------------------------------------
    // 3. Query vol and variance across the surface
    // ---------------------------------------------------------------

    println!("--- Vol grid (days x strike) ---\n");
    let query_days = [7.0, 15.0, 30.0, 45.0, 60.0, 90.0, 120.0];
    let query_strikes = [410.0, 430.0, 450.0, 470.0, 490.0];

    print!("{:>6}", "days");
    for k in &query_strikes {
        print!("{k:>9.0}");
    }
    println!();
    for &d in &query_days {
        print!("{d:>6.0}");
        for &k in &query_strikes {
            let vol = surface.black_vol(d / 365.0, k)?;
            print!("{:>8.2}%", vol.0 * 100.0);
        }
        println!();
    }

    let t = 30.0 / 365.0;
    let var = surface.black_variance(t, 450.0)?;
    println!("\nTotal variance at 30d ATM: {:.6}", var.0);

    let atm = surface.nearest_strike(450.0).ok_or("empty strike axis")?;
    println!("\n--- ATM term structure (K = {:.0}) ---\n", atm.0);
    for (tenor, vol) in surface.atm_term_structure(450.0) {
        println!("  T = {:.4}y  vol = {:.2}%", tenor.0, vol.0 * 100.0);
    }

    Ok(())
}

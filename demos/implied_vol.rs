//! Extract implied volatility from option prices.
//!
//! Shows how to:
//!   - Price an option with Black-Scholes
//!   - Extract implied vol with the bracketed Brent solver
//!   - Recognize prices no volatility can reproduce
//!
//! Run with: `cargo run --example implied_vol`

use ivsurface::OptionType;
use ivsurface::implied::{call_price, implied_volatility, put_price};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spot = 450.0;
    let strike = 460.0;
    let expiry = 30.0 / 365.0;
    let rate = 0.045;
    let vol = 0.22;

    // ---------------------------------------------------------------
    // 1. Price a call and a put
    // ---------------------------------------------------------------

    let call = call_price(spot, strike, expiry, rate, vol);
    let put = put_price(spot, strike, expiry, rate, vol);

    println!("Black-Scholes pricing");
    println!("  Spot:   {spot}");
    println!("  Strike: {strike}");
    println!("  Expiry: {expiry:.4}y");
    println!("  Vol:    {:.0}%", vol * 100.0);
    println!();
    println!("  Call price: {call:.6}");
    println!("  Put price:  {put:.6}");
    println!(
        "  Put-call parity: C - P = {:.6}, S - K·e^(-rT) = {:.6}",
        call - put,
        spot - strike * (-rate * expiry).exp()
    );

    // ---------------------------------------------------------------
    // 2. Recover the volatility
    // ---------------------------------------------------------------

    let call_iv = implied_volatility(call, spot, strike, expiry, rate, OptionType::Call)
        .ok_or("call price should be bracketed")?;
    let put_iv = implied_volatility(put, spot, strike, expiry, rate, OptionType::Put)
        .ok_or("put price should be bracketed")?;
    println!();
    println!("Implied volatility");
    println!("  From call: {call_iv:.8} (error {:.2e})", (call_iv - vol).abs());
    println!("  From put:  {put_iv:.8} (error {:.2e})", (put_iv - vol).abs());

    // ---------------------------------------------------------------
    // 3. Undefined cases
    // ---------------------------------------------------------------

    println!();
    for price in [0.0, spot + 1.0] {
        match implied_volatility(price, spot, strike, expiry, rate, OptionType::Call) {
            Some(iv) => println!("  price {price:>8.2}: iv {iv:.4}"),
            None => println!("  price {price:>8.2}: undefined"),
        }
    }

    Ok(())
}

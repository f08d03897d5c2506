//! Near-the-money screen
//!
//! Solves implied volatility from traded prices for a handful of NIFTY
//! weeklies and keeps the contracts whose |delta| sits around 0.40.
//!
//! Run with: cargo run --example near_the_money

use chrono::{Duration, Utc};
use iv_spike::prelude::*;

fn main() {
    let spot = 22000.0;
    let rate = 0.06;
    let time = 7.0 / 365.0;
    let expiry = Utc::now().date_naive() + Duration::days(7);

    println!("Near-the-money screen");
    println!("=====================\n");
    println!("  Spot: {:.2}", spot);
    println!("  Rate: {:.1}%", rate * 100.0);
    println!("  Time: {:.0} days\n", time * 365.0);

    let quotes: Vec<OptionQuote> = [
        (22200, 130.0, OptionType::Call),
        (21800, 140.0, OptionType::Put),
        (22100, 145.0, OptionType::Call),
        (21900, 120.0, OptionType::Put),
    ]
    .into_iter()
    .map(|(strike, last_price, option_type)| {
        let contract = OptionContract::new("NIFTY", strike, expiry, option_type);
        let mut quote = OptionQuote::new(contract, 0.0);
        quote.last_price = last_price;
        quote
    })
    .collect();

    println!("All quotes:");
    for quote in &quotes {
        let contract = &quote.contract;
        let strike = contract.strike_price();
        match implied_volatility(quote.last_price, spot, strike, time, rate, contract.option_type) {
            Some(iv) => match bs_delta(spot, strike, time, rate, iv, contract.option_type) {
                Ok(d) => println!(
                    "  {} {}: price {:.2}, IV={:.2}%, Δ={:.2}",
                    contract.option_type.code(),
                    contract.strike,
                    quote.last_price,
                    iv * 100.0,
                    d
                ),
                Err(e) => println!(
                    "  {} {}: delta failed: {}",
                    contract.option_type.code(),
                    contract.strike,
                    e
                ),
            },
            None => println!(
                "  {} {}: price {:.2}, no implied volatility",
                contract.option_type.code(),
                contract.strike,
                quote.last_price
            ),
        }
    }

    let band = DeltaBand::default();
    let screened = screen_by_delta(&quotes, spot, time, rate, band);

    println!("\nIn band {:.2} <= |Δ| <= {:.2}:", band.min, band.max);
    if screened.is_empty() {
        println!("  (none)");
    }
    for s in &screened {
        println!(
            "  {} {}: IV={:.2}%, Δ={:.2}",
            s.quote.contract.option_type.code(),
            s.quote.contract.strike,
            s.iv * 100.0,
            s.delta
        );
    }
}

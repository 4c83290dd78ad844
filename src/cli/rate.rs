use anyhow::Result;

use crate::config::CurrencyConfig;
use crate::fx::{RateChain, RateOrigin};
use crate::siting::cad_to_usd;

pub async fn run(config: &CurrencyConfig, price_cad: Option<f64>) -> Result<()> {
    let chain = RateChain::new(config)?;
    let quote = chain.resolve().await;

    match &quote.origin {
        RateOrigin::Provider(name) => println!("1 CAD = {:.4} USD (via {})", quote.rate, name),
        RateOrigin::Fallback => println!("1 CAD = {:.4} USD (fallback rate)", quote.rate),
    }
    if let Some(price) = price_cad {
        println!(
            "{:.4} CAD/kWh = {:.4} USD/kWh",
            price,
            cad_to_usd(price, quote.rate)
        );
    }
    Ok(())
}

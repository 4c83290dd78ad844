use anyhow::Result;

use crate::model::CoolingType;
use crate::siting::{self, ScoringWeights, SiteFactors};

pub fn score(factors: &SiteFactors, weights: &ScoringWeights) -> Result<()> {
    let result = siting::score_site(factors, weights)?;
    println!("Site score: {:.1}/100 ({})", result.score, result.band.label());
    Ok(())
}

pub fn recommend(weights: &ScoringWeights, limit: usize) -> Result<()> {
    let ranked = siting::recommend_jurisdictions(weights)?;

    println!("{:<4} {:<18} {:<15} {:>6} {:<10}", "#", "Jurisdiction", "Region", "Score", "Band");
    println!("{}", "-".repeat(57));
    for (rank, j) in ranked.iter().take(limit).enumerate() {
        println!(
            "{:<4} {:<18} {:<15} {:>6.1} {:<10}",
            rank + 1,
            j.name,
            j.region,
            j.score.score,
            j.score.band.label(),
        );
    }
    Ok(())
}

pub fn pue(capacity_mw: Option<f64>, cooling: Option<CoolingType>) -> Result<()> {
    let options = match cooling {
        Some(c) => vec![c],
        None => CoolingType::ALL.to_vec(),
    };

    for cooling in options {
        let pue = siting::pue_for(cooling);
        match capacity_mw {
            Some(mw) => println!(
                "{:<10} PUE {:.2}  facility load {:.2} MW for {:.1} MW IT",
                cooling,
                pue,
                siting::facility_load_mw(mw, cooling),
                mw
            ),
            None => println!("{:<10} PUE {:.2}", cooling, pue),
        }
    }
    Ok(())
}

//! Site selection calculators: weighted site score, jurisdiction ranking,
//! cooling PUE and energy price conversion

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::model::CoolingType;

/// Relative importance of each factor. Only the ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_power_cost_weight")]
    pub power_cost: f64,
    #[serde(default = "default_climate_weight")]
    pub climate: f64,
    #[serde(default = "default_regulatory_weight")]
    pub regulatory: f64,
    #[serde(default = "default_land_weight")]
    pub land: f64,
    #[serde(default = "default_infrastructure_weight")]
    pub infrastructure: f64,
}

fn default_power_cost_weight() -> f64 {
    35.0
}

fn default_climate_weight() -> f64 {
    15.0
}

fn default_regulatory_weight() -> f64 {
    20.0
}

fn default_land_weight() -> f64 {
    10.0
}

fn default_infrastructure_weight() -> f64 {
    20.0
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            power_cost: default_power_cost_weight(),
            climate: default_climate_weight(),
            regulatory: default_regulatory_weight(),
            land: default_land_weight(),
            infrastructure: default_infrastructure_weight(),
        }
    }
}

impl ScoringWeights {
    fn total(&self) -> f64 {
        self.power_cost + self.climate + self.regulatory + self.land + self.infrastructure
    }

    /// Every weight must be finite and non-negative, and at least one positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("power_cost", self.power_cost),
            ("climate", self.climate),
            ("regulatory", self.regulatory),
            ("land", self.land),
            ("infrastructure", self.infrastructure),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} weight must be a non-negative number, got {}", name, value);
            }
        }
        if self.total() <= 0.0 {
            bail!("scoring weights must not all be zero");
        }
        Ok(())
    }
}

/// Factor scores on a 0..=10 scale, higher is better
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteFactors {
    pub power_cost: f64,
    pub climate: f64,
    pub regulatory: f64,
    pub land: f64,
    pub infrastructure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 65.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteScore {
    /// 0..=100
    pub score: f64,
    pub band: ScoreBand,
}

/// Weighted mean of the factor scores, scaled to 0..=100
pub fn score_site(factors: &SiteFactors, weights: &ScoringWeights) -> Result<SiteScore> {
    for (name, value) in [
        ("power_cost", factors.power_cost),
        ("climate", factors.climate),
        ("regulatory", factors.regulatory),
        ("land", factors.land),
        ("infrastructure", factors.infrastructure),
    ] {
        if !(0.0..=10.0).contains(&value) {
            bail!("{} score must be between 0 and 10, got {}", name, value);
        }
    }

    weights.validate()?;
    let total = weights.total();

    let weighted = factors.power_cost * weights.power_cost
        + factors.climate * weights.climate
        + factors.regulatory * weights.regulatory
        + factors.land * weights.land
        + factors.infrastructure * weights.infrastructure;
    let score = weighted / total * 10.0;

    Ok(SiteScore {
        score,
        band: ScoreBand::from_score(score),
    })
}

pub struct Jurisdiction {
    pub name: &'static str,
    pub region: &'static str,
    pub factors: SiteFactors,
}

const fn jurisdiction(
    name: &'static str,
    region: &'static str,
    [power_cost, climate, regulatory, land, infrastructure]: [f64; 5],
) -> Jurisdiction {
    Jurisdiction {
        name,
        region,
        factors: SiteFactors {
            power_cost,
            climate,
            regulatory,
            land,
            infrastructure,
        },
    }
}

/// Built-in comparison table
pub const JURISDICTIONS: &[Jurisdiction] = &[
    jurisdiction("Alberta", "Canada", [7.0, 8.0, 7.0, 8.0, 7.0]),
    jurisdiction("Quebec", "Canada", [9.0, 9.0, 5.0, 7.0, 8.0]),
    jurisdiction("British Columbia", "Canada", [7.0, 8.0, 4.0, 5.0, 7.0]),
    jurisdiction("Manitoba", "Canada", [8.0, 8.0, 6.0, 8.0, 6.0]),
    jurisdiction("Texas", "United States", [7.0, 4.0, 9.0, 8.0, 8.0]),
    jurisdiction("Wyoming", "United States", [6.0, 7.0, 10.0, 9.0, 5.0]),
    jurisdiction("Georgia", "United States", [6.0, 5.0, 8.0, 7.0, 8.0]),
    jurisdiction("Iceland", "Europe", [8.0, 10.0, 6.0, 5.0, 6.0]),
    jurisdiction("Norway", "Europe", [8.0, 9.0, 5.0, 5.0, 8.0]),
    jurisdiction("Paraguay", "South America", [10.0, 3.0, 5.0, 8.0, 4.0]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JurisdictionScore {
    pub name: &'static str,
    pub region: &'static str,
    pub score: SiteScore,
}

/// Rank the built-in jurisdictions under `priorities`, best first, ties by name
pub fn recommend_jurisdictions(priorities: &ScoringWeights) -> Result<Vec<JurisdictionScore>> {
    let mut ranked = JURISDICTIONS
        .iter()
        .map(|j| {
            Ok(JurisdictionScore {
                name: j.name,
                region: j.region,
                score: score_site(&j.factors, priorities)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| {
        b.score
            .score
            .total_cmp(&a.score.score)
            .then_with(|| a.name.cmp(b.name))
    });
    Ok(ranked)
}

/// Typical power usage effectiveness for a cooling approach
pub fn pue_for(cooling: CoolingType) -> f64 {
    match cooling {
        CoolingType::Air => 1.15,
        CoolingType::Hydro => 1.05,
        CoolingType::Immersion => 1.03,
    }
}

/// Total facility draw for an IT load
pub fn facility_load_mw(it_capacity_mw: f64, cooling: CoolingType) -> f64 {
    it_capacity_mw * pue_for(cooling)
}

pub fn cad_to_usd(price_cad: f64, rate: f64) -> f64 {
    price_cad * rate
}

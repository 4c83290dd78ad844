//! CAD -> USD exchange rate with provider fallback
//!
//! Providers are tried once each, in order. The first `rates.USD` inside
//! (0.5, 1.0) wins; otherwise the configured fallback rate is returned.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{CurrencyConfig, RateProviderConfig};

const MIN_PLAUSIBLE_RATE: f64 = 0.5;
const MAX_PLAUSIBLE_RATE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum RateOrigin {
    Provider(String),
    Fallback,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOrigin::Provider(name) => write!(f, "{}", name),
            RateOrigin::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub origin: RateOrigin,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: Rates,
}

#[derive(Debug, Deserialize)]
struct Rates {
    #[serde(rename = "USD")]
    usd: Option<f64>,
}

pub struct RateChain {
    client: reqwest::Client,
    providers: Vec<RateProviderConfig>,
    fallback_rate: f64,
}

impl RateChain {
    pub fn new(config: &CurrencyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            providers: config.providers.clone(),
            fallback_rate: config.fallback_rate,
        })
    }

    /// Never fails: an exhausted chain yields the fallback quote
    pub async fn resolve(&self) -> RateQuote {
        for provider in &self.providers {
            match self.fetch(provider).await {
                Ok(rate) if is_plausible(rate) => {
                    info!(provider = %provider.name, rate, "exchange rate resolved");
                    return RateQuote {
                        rate,
                        origin: RateOrigin::Provider(provider.name.clone()),
                    };
                }
                Ok(rate) => {
                    warn!(provider = %provider.name, rate, "rate outside plausible range, skipping");
                }
                Err(e) => {
                    warn!(provider = %provider.name, error = %e, "rate provider failed");
                }
            }
        }

        warn!(rate = self.fallback_rate, "all rate providers failed, using fallback");
        RateQuote {
            rate: self.fallback_rate,
            origin: RateOrigin::Fallback,
        }
    }

    async fn fetch(&self, provider: &RateProviderConfig) -> Result<f64> {
        debug!(provider = %provider.name, url = %provider.url, "fetching exchange rate");
        let body: RatesResponse = self
            .client
            .get(&provider.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.rates
            .usd
            .ok_or_else(|| anyhow!("response has no USD rate"))
    }
}

fn is_plausible(rate: f64) -> bool {
    rate > MIN_PLAUSIBLE_RATE && rate < MAX_PLAUSIBLE_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(urls: &[(&str, String)]) -> RateChain {
        let config = CurrencyConfig {
            timeout_secs: 2,
            fallback_rate: 0.74,
            providers: urls
                .iter()
                .map(|(name, url)| RateProviderConfig {
                    name: name.to_string(),
                    url: url.clone(),
                })
                .collect(),
        };
        RateChain::new(&config).unwrap()
    }

    #[test]
    fn test_plausible_range_is_exclusive() {
        assert!(is_plausible(0.73));
        assert!(!is_plausible(0.5));
        assert!(!is_plausible(1.0));
        assert!(!is_plausible(1.36));
    }

    #[tokio::test]
    async fn test_first_valid_provider_wins() {
        let mut server = mockito::Server::new_async().await;
        let primary = server
            .mock("GET", "/primary")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"base":"CAD","rates":{"USD":0.7312,"EUR":0.68}}"#)
            .create_async()
            .await;
        let secondary = server
            .mock("GET", "/secondary")
            .with_status(200)
            .with_body(r#"{"rates":{"USD":0.7}}"#)
            .expect(0)
            .create_async()
            .await;

        let quote = chain(&[
            ("primary", format!("{}/primary", server.url())),
            ("secondary", format!("{}/secondary", server.url())),
        ])
        .resolve()
        .await;

        assert_eq!(quote.rate, 0.7312);
        assert_eq!(quote.origin, RateOrigin::Provider("primary".to_string()));
        primary.assert_async().await;
        secondary.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_through_errors_and_implausible_rates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/down")
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/inverted")
            .with_status(200)
            .with_body(r#"{"rates":{"USD":1.36}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/good")
            .with_status(200)
            .with_body(r#"{"rates":{"USD":0.72}}"#)
            .create_async()
            .await;

        let quote = chain(&[
            ("down", format!("{}/down", server.url())),
            ("inverted", format!("{}/inverted", server.url())),
            ("good", format!("{}/good", server.url())),
        ])
        .resolve()
        .await;

        assert_eq!(quote.rate, 0.72);
        assert_eq!(quote.origin.to_string(), "good");
    }

    #[tokio::test]
    async fn test_exhausted_chain_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/no-usd")
            .with_status(200)
            .with_body(r#"{"rates":{"EUR":0.68}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let quote = chain(&[
            ("no-usd", format!("{}/no-usd", server.url())),
            ("garbage", format!("{}/garbage", server.url())),
        ])
        .resolve()
        .await;

        assert_eq!(quote.rate, 0.74);
        assert_eq!(quote.origin, RateOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_empty_chain_uses_fallback() {
        let quote = chain(&[]).resolve().await;
        assert_eq!(quote.origin, RateOrigin::Fallback);
    }
}

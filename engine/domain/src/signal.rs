use crate::economic::{EconomicField, EconomicUpdate};
use crate::provider::Provider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Constants turning the raw CPI index into inflation and cost-of-living.
///
/// Two revisions of the upstream formula used different coefficients, so these are
/// configuration rather than fixed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpiDerivation {
    pub inflation_coefficient: f64,
    pub inflation_floor: f64,
    pub cost_of_living_coefficient: f64,
    pub cost_of_living_min: f64,
    pub cost_of_living_max: f64,
}

impl Default for CpiDerivation {
    fn default() -> Self {
        Self {
            inflation_coefficient: 0.01,
            inflation_floor: 0.0,
            cost_of_living_coefficient: 0.04,
            cost_of_living_min: 80.0,
            cost_of_living_max: 150.0,
        }
    }
}

impl CpiDerivation {
    pub fn inflation(&self, cpi: f64) -> f64 {
        (cpi * self.inflation_coefficient).max(self.inflation_floor)
    }

    pub fn cost_of_living(&self, cpi: f64) -> f64 {
        (cpi * self.cost_of_living_coefficient)
            .max(self.cost_of_living_min)
            .min(self.cost_of_living_max)
    }
}

/// One named economic quantity sourced from a single upstream series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Unemployment,
    ConsumerPriceIndex,
    MedianIncome,
    Gdp,
    MarketIndex,
}

impl Signal {
    pub const ECONOMIC: [Signal; 5] = [
        Signal::Unemployment,
        Signal::ConsumerPriceIndex,
        Signal::MedianIncome,
        Signal::Gdp,
        Signal::MarketIndex,
    ];

    pub fn provider(&self) -> Provider {
        match self {
            Signal::MarketIndex => Provider::AlphaVantage,
            _ => Provider::Fred,
        }
    }

    /// Provider-specific series id or ticker symbol.
    pub fn series_id(&self) -> &'static str {
        match self {
            Signal::Unemployment => "UNRATE",
            Signal::ConsumerPriceIndex => "CPIAUCSL",
            Signal::MedianIncome => "MEHOINUSA646N",
            Signal::Gdp => "GDP",
            Signal::MarketIndex => "SPY",
        }
    }

    /// Snapshot fields this signal feeds.
    pub fn fields(&self) -> &'static [EconomicField] {
        match self {
            Signal::Unemployment => &[EconomicField::Unemployment],
            Signal::ConsumerPriceIndex => &[EconomicField::Inflation, EconomicField::CostOfLiving],
            Signal::MedianIncome => &[EconomicField::AverageIncome],
            Signal::Gdp => &[EconomicField::Gdp],
            Signal::MarketIndex => &[EconomicField::MarketIndex],
        }
    }

    /// Parses a raw provider value into the fields this signal feeds.
    pub fn to_update(
        &self,
        raw: &str,
        derivation: &CpiDerivation,
    ) -> Result<EconomicUpdate, SignalParseError> {
        let raw = raw.trim();
        if let Signal::MarketIndex = self {
            let price = Decimal::from_str(raw).map_err(|_| SignalParseError::new(*self, raw))?;
            return Ok(EconomicUpdate {
                market_index: Some(price),
                ..Default::default()
            });
        }

        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SignalParseError::new(*self, raw))?;

        let update = match self {
            Signal::Unemployment => EconomicUpdate {
                unemployment: Some(value),
                ..Default::default()
            },
            Signal::ConsumerPriceIndex => EconomicUpdate {
                inflation: Some(derivation.inflation(value)),
                cost_of_living: Some(derivation.cost_of_living(value)),
                ..Default::default()
            },
            Signal::MedianIncome => EconomicUpdate {
                average_income: Some(value),
                ..Default::default()
            },
            Signal::Gdp => EconomicUpdate {
                gdp: Some(value),
                ..Default::default()
            },
            Signal::MarketIndex => EconomicUpdate::default(),
        };
        Ok(update)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.series_id())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Signal {signal} returned a non-numeric value: {raw:?}")]
pub struct SignalParseError {
    pub signal: Signal,
    pub raw: String,
}

impl SignalParseError {
    fn new(signal: Signal, raw: &str) -> Self {
        Self {
            signal,
            raw: raw.to_string(),
        }
    }
}

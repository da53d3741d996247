use crate::freshness::Freshness;
use crate::provider::{Provider, ProviderHealth};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const FALLBACK_UNEMPLOYMENT: f64 = 3.8;
pub const FALLBACK_INFLATION: f64 = 3.0;
pub const FALLBACK_COST_OF_LIVING: f64 = 100.0;
pub const FALLBACK_AVERAGE_INCOME: f64 = 74_580.0;
pub const DEFAULT_POPULATION: u64 = 333_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicField {
    Unemployment,
    Inflation,
    CostOfLiving,
    Population,
    AverageIncome,
    Gdp,
    MarketIndex,
}

impl EconomicField {
    /// Fields the payout calculator cannot run without.
    pub const ESSENTIAL: [EconomicField; 4] = [
        EconomicField::Unemployment,
        EconomicField::Inflation,
        EconomicField::AverageIncome,
        EconomicField::CostOfLiving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EconomicField::Unemployment => "unemployment",
            EconomicField::Inflation => "inflation",
            EconomicField::CostOfLiving => "cost_of_living",
            EconomicField::Population => "population",
            EconomicField::AverageIncome => "average_income",
            EconomicField::Gdp => "gdp",
            EconomicField::MarketIndex => "market_index",
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            EconomicField::Unemployment => Bounds::closed(0.0, 100.0),
            EconomicField::Inflation => Bounds::closed(-10.0, 50.0),
            EconomicField::CostOfLiving => Bounds::closed(0.0, 1000.0),
            EconomicField::Population => Bounds::closed(1.0, 1e10),
            EconomicField::AverageIncome => Bounds::closed(0.0, 1_000_000.0),
            EconomicField::Gdp => Bounds::closed(0.0, f64::MAX),
            EconomicField::MarketIndex => Bounds::positive(),
        }
    }

    fn fallback(&self) -> Option<f64> {
        match self {
            EconomicField::Unemployment => Some(FALLBACK_UNEMPLOYMENT),
            EconomicField::Inflation => Some(FALLBACK_INFLATION),
            EconomicField::CostOfLiving => Some(FALLBACK_COST_OF_LIVING),
            EconomicField::AverageIncome => Some(FALLBACK_AVERAGE_INCOME),
            _ => None,
        }
    }
}

impl fmt::Display for EconomicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain range of one economic signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub exclusive_min: bool,
}

impl Bounds {
    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            exclusive_min: false,
        }
    }

    pub const fn positive() -> Self {
        Self {
            min: 0.0,
            max: f64::MAX,
            exclusive_min: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() || value > self.max {
            return false;
        }
        if self.exclusive_min {
            value > self.min
        } else {
            value >= self.min
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicators {
    pub unemployment: f64,
    pub inflation: f64,
    pub cost_of_living: f64,
    pub population: u64,
    pub average_income: f64,
    pub gdp: Option<f64>,
    pub market_index: Option<Decimal>,
}

impl Default for EconomicIndicators {
    fn default() -> Self {
        Self {
            unemployment: FALLBACK_UNEMPLOYMENT,
            inflation: FALLBACK_INFLATION,
            cost_of_living: FALLBACK_COST_OF_LIVING,
            population: DEFAULT_POPULATION,
            average_income: FALLBACK_AVERAGE_INCOME,
            gdp: None,
            market_index: None,
        }
    }
}

impl EconomicIndicators {
    /// Merges caller-supplied overrides over these values without validating them.
    pub fn with_overrides(&self, overrides: &EconomicOverrides) -> Self {
        Self {
            unemployment: overrides.unemployment.unwrap_or(self.unemployment),
            inflation: overrides.inflation.unwrap_or(self.inflation),
            cost_of_living: overrides.cost_of_living.unwrap_or(self.cost_of_living),
            population: overrides.population.unwrap_or(self.population),
            average_income: overrides.average_income.unwrap_or(self.average_income),
            gdp: self.gdp,
            market_index: self.market_index,
        }
    }

    fn set(&mut self, field: EconomicField, value: f64) {
        match field {
            EconomicField::Unemployment => self.unemployment = value,
            EconomicField::Inflation => self.inflation = value,
            EconomicField::CostOfLiving => self.cost_of_living = value,
            EconomicField::Population => self.population = value.round() as u64,
            EconomicField::AverageIncome => self.average_income = value,
            EconomicField::Gdp => self.gdp = Some(value),
            EconomicField::MarketIndex => {}
        }
    }
}

/// Partial update produced by one refresh cycle. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EconomicUpdate {
    pub unemployment: Option<f64>,
    pub inflation: Option<f64>,
    pub cost_of_living: Option<f64>,
    pub population: Option<f64>,
    pub average_income: Option<f64>,
    pub gdp: Option<f64>,
    pub market_index: Option<Decimal>,
}

impl EconomicUpdate {
    pub fn is_empty(&self) -> bool {
        self.numeric_fields().iter().all(|(_, value)| value.is_none())
            && self.market_index.is_none()
    }

    /// Fields set in `other` replace the ones set here.
    pub fn merge(&mut self, other: EconomicUpdate) {
        self.unemployment = other.unemployment.or(self.unemployment);
        self.inflation = other.inflation.or(self.inflation);
        self.cost_of_living = other.cost_of_living.or(self.cost_of_living);
        self.population = other.population.or(self.population);
        self.average_income = other.average_income.or(self.average_income);
        self.gdp = other.gdp.or(self.gdp);
        self.market_index = other.market_index.or(self.market_index);
    }

    fn numeric_fields(&self) -> [(EconomicField, Option<f64>); 6] {
        [
            (EconomicField::Unemployment, self.unemployment),
            (EconomicField::Inflation, self.inflation),
            (EconomicField::CostOfLiving, self.cost_of_living),
            (EconomicField::Population, self.population),
            (EconomicField::AverageIncome, self.average_income),
            (EconomicField::Gdp, self.gdp),
        ]
    }
}

/// Simulation input: fields merged over the live snapshot for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unemployment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_living: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_income: Option<f64>,
}

impl EconomicOverrides {
    pub fn is_empty(&self) -> bool {
        *self == EconomicOverrides::default()
    }

    /// Values set in `other` win.
    pub fn overlay(mut self, other: &EconomicOverrides) -> Self {
        self.unemployment = other.unemployment.or(self.unemployment);
        self.inflation = other.inflation.or(self.inflation);
        self.cost_of_living = other.cost_of_living.or(self.cost_of_living);
        self.population = other.population.or(self.population);
        self.average_income = other.average_income.or(self.average_income);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedField {
    pub field: EconomicField,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub accepted: Vec<EconomicField>,
    pub rejected: Vec<RejectedField>,
}

impl ApplyOutcome {
    pub fn any_accepted(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Mutable economic state owned by the snapshot store.
///
/// Starts with every essential field at its fallback constant; a field leaves the
/// fallback set the first time a provider value for it is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicState {
    indicators: EconomicIndicators,
    fallback_fields: BTreeSet<EconomicField>,
    last_updated: Option<DateTime<Utc>>,
}

impl Default for EconomicState {
    fn default() -> Self {
        Self {
            indicators: EconomicIndicators::default(),
            fallback_fields: EconomicField::ESSENTIAL.into_iter().collect(),
            last_updated: None,
        }
    }
}

impl EconomicState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicators(&self) -> &EconomicIndicators {
        &self.indicators
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn fallback_fields(&self) -> Vec<EconomicField> {
        self.fallback_fields.iter().copied().collect()
    }

    /// Applies every provided field that is finite and within its bounds.
    ///
    /// Rejected or missing fields keep their previous value. The timestamp only
    /// moves when at least one field was accepted.
    pub fn apply(&mut self, update: &EconomicUpdate, now: DateTime<Utc>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        for (field, value) in update.numeric_fields() {
            let Some(value) = value else { continue };
            if field.bounds().contains(value) {
                self.indicators.set(field, value);
                self.fallback_fields.remove(&field);
                outcome.accepted.push(field);
            } else {
                outcome.rejected.push(RejectedField {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if let Some(price) = update.market_index {
            let in_range = price
                .to_f64()
                .map(|v| EconomicField::MarketIndex.bounds().contains(v))
                .unwrap_or(false);
            if in_range {
                self.indicators.market_index = Some(price);
                outcome.accepted.push(EconomicField::MarketIndex);
            } else {
                outcome.rejected.push(RejectedField {
                    field: EconomicField::MarketIndex,
                    value: price.to_string(),
                });
            }
        }

        self.settle_fallbacks();

        if outcome.any_accepted() {
            self.last_updated = Some(now);
        }
        outcome
    }

    fn settle_fallbacks(&mut self) {
        for field in EconomicField::ESSENTIAL {
            if !self.fallback_fields.contains(&field) {
                continue;
            }
            if let Some(fallback) = field.fallback() {
                self.indicators.set(field, fallback);
            }
        }
    }

    pub fn to_snapshot(
        &self,
        provider_health: BTreeMap<Provider, ProviderHealth>,
        freshness: Freshness,
    ) -> EconomicSnapshot {
        EconomicSnapshot {
            indicators: self.indicators.clone(),
            last_updated: self.last_updated,
            provider_health,
            freshness,
            fallback_fields: self.fallback_fields(),
        }
    }
}

/// Read-only copy of the economic state handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicSnapshot {
    #[serde(flatten)]
    pub indicators: EconomicIndicators,
    pub last_updated: Option<DateTime<Utc>>,
    pub provider_health: BTreeMap<Provider, ProviderHealth>,
    pub freshness: Freshness,
    pub fallback_fields: Vec<EconomicField>,
}

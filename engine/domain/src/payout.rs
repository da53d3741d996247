use crate::economic::{EconomicField, EconomicIndicators};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNEMPLOYMENT_FACTOR_FLOOR: f64 = 0.5;
pub const INFLATION_FACTOR_FLOOR: f64 = 0.8;
pub const INCOME_SHARE: f64 = 0.1;
pub const SENTIMENT_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutFactors {
    pub unemployment: f64,
    pub inflation: f64,
    pub cost_of_living: f64,
    pub sentiment: f64,
    pub population: u64,
    pub unemployment_factor: f64,
    pub inflation_factor: f64,
    pub cost_of_living_factor: f64,
    pub sentiment_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutBreakdown {
    pub base_payout: u64,
    pub adjusted_payout: u64,
    pub total_cost: u64,
    pub factors: PayoutFactors,
    pub explanation: Vec<String>,
    pub confidence: f64,
    pub simulated: bool,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("{field} must be a finite number in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Total program cost overflows for payout {payout} and population {population}")]
    Overflow { payout: u64, population: u64 },
}

/// Derives the payout breakdown from economic indicators and a sentiment score.
///
/// Rounding happens after the base payout and after the sentiment adjustment, half
/// toward positive infinity, so every monetary figure is a whole currency unit.
pub fn calculate_payout(
    indicators: &EconomicIndicators,
    sentiment: f64,
    confidence: f64,
    computed_at: DateTime<Utc>,
) -> Result<PayoutBreakdown, InvalidInputError> {
    validate(indicators, sentiment)?;

    let unemployment_factor = (indicators.unemployment / 10.0).max(UNEMPLOYMENT_FACTOR_FLOOR);
    let inflation_factor = (indicators.inflation / 5.0).max(INFLATION_FACTOR_FLOOR);
    let cost_of_living_factor = indicators.cost_of_living / 100.0;

    let base_payout = round_half_up(
        indicators.average_income
            * INCOME_SHARE
            * unemployment_factor
            * inflation_factor
            * cost_of_living_factor,
    ) as u64;

    let sentiment_multiplier = 1.0 + sentiment * SENTIMENT_WEIGHT;
    let adjusted_payout = round_half_up(base_payout as f64 * sentiment_multiplier) as u64;

    let total_cost = adjusted_payout
        .checked_mul(indicators.population)
        .ok_or(InvalidInputError::Overflow {
            payout: adjusted_payout,
            population: indicators.population,
        })?;

    let factors = PayoutFactors {
        unemployment: indicators.unemployment,
        inflation: indicators.inflation,
        cost_of_living: indicators.cost_of_living,
        sentiment,
        population: indicators.population,
        unemployment_factor,
        inflation_factor,
        cost_of_living_factor,
        sentiment_multiplier,
    };

    let explanation = explain(
        &factors,
        indicators.average_income,
        base_payout,
        adjusted_payout,
        total_cost,
    );

    Ok(PayoutBreakdown {
        base_payout,
        adjusted_payout,
        total_cost,
        factors,
        explanation,
        confidence,
        simulated: false,
        computed_at,
    })
}

fn validate(indicators: &EconomicIndicators, sentiment: f64) -> Result<(), InvalidInputError> {
    let checks = [
        (EconomicField::Unemployment, indicators.unemployment),
        (EconomicField::Inflation, indicators.inflation),
        (EconomicField::CostOfLiving, indicators.cost_of_living),
        (EconomicField::AverageIncome, indicators.average_income),
        (EconomicField::Population, indicators.population as f64),
    ];
    for (field, value) in checks {
        let bounds = field.bounds();
        if !bounds.contains(value) {
            return Err(InvalidInputError::OutOfRange {
                field: field.as_str(),
                value,
                min: bounds.min,
                max: bounds.max,
            });
        }
    }

    if !(sentiment.is_finite() && (-1.0..=1.0).contains(&sentiment)) {
        return Err(InvalidInputError::OutOfRange {
            field: "sentiment",
            value: sentiment,
            min: -1.0,
            max: 1.0,
        });
    }
    Ok(())
}

/// Nearest integer with halves rounded up (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn explain(
    factors: &PayoutFactors,
    average_income: f64,
    base_payout: u64,
    adjusted_payout: u64,
    total_cost: u64,
) -> Vec<String> {
    let sentiment_line = if factors.sentiment > 0.0 {
        format!(
            "Sentiment analysis of recent news (positive, {}) increases payout by {:.1}% to ${}",
            factors.sentiment,
            (factors.sentiment * 100.0 * SENTIMENT_WEIGHT).abs(),
            group_thousands(adjusted_payout)
        )
    } else if factors.sentiment < 0.0 {
        format!(
            "Sentiment analysis of recent news (negative, {}) decreases payout by {:.1}% to ${}",
            factors.sentiment,
            (factors.sentiment * 100.0 * SENTIMENT_WEIGHT).abs(),
            group_thousands(adjusted_payout)
        )
    } else {
        format!(
            "Sentiment analysis of recent news is neutral and leaves the payout at ${}",
            group_thousands(adjusted_payout)
        )
    };

    vec![
        format!(
            "Base calculation considers unemployment ({}%), inflation ({}%), and cost of living ({})",
            factors.unemployment, factors.inflation, factors.cost_of_living
        ),
        format!(
            "Factors: unemployment {} (floor {}), inflation {} (floor {}), cost of living {}",
            factors.unemployment_factor,
            UNEMPLOYMENT_FACTOR_FLOOR,
            factors.inflation_factor,
            INFLATION_FACTOR_FLOOR,
            factors.cost_of_living_factor
        ),
        format!(
            "Base payout: ${} from 10% of average income (${}) scaled by the factors",
            group_thousands(base_payout),
            average_income
        ),
        sentiment_line,
        format!(
            "Total program cost: ${} for {} residents",
            group_thousands(total_cost),
            group_thousands(factors.population)
        ),
    ]
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

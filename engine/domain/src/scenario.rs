use crate::economic::EconomicOverrides;
use serde::{Deserialize, Serialize};

/// Canned set of overrides for what-if simulations.
///
/// `reference_sentiment` describes the mood the scenario was written for; simulations
/// still use the live news sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub overrides: EconomicOverrides,
    pub reference_sentiment: f64,
}

impl Scenario {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        (unemployment, inflation, cost_of_living): (f64, f64, f64),
        reference_sentiment: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            overrides: EconomicOverrides {
                unemployment: Some(unemployment),
                inflation: Some(inflation),
                cost_of_living: Some(cost_of_living),
                ..Default::default()
            },
            reference_sentiment,
        }
    }

    pub fn library() -> Vec<Scenario> {
        vec![
            Scenario::new(
                "crisis",
                "Economic Crisis",
                "High unemployment, rising inflation",
                (12.5, 6.2, 115.0),
                -0.6,
            ),
            Scenario::new(
                "boom",
                "Economic Boom",
                "Low unemployment, stable prices",
                (3.2, 2.1, 95.0),
                0.7,
            ),
            Scenario::new(
                "disaster",
                "Natural Disaster",
                "Emergency response scenario",
                (15.0, 4.5, 125.0),
                -0.8,
            ),
        ]
    }

    pub fn find(id: &str) -> Option<Scenario> {
        Self::library().into_iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }
}

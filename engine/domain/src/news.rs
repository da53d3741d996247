use crate::sentiment::SentimentAnalysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article as returned by the news provider, before any filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredArticle {
    pub title: String,
    pub description: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Unbounded lexicon score averaged over title and description.
    pub raw_score: f64,
    /// `raw_score` damped into [-1, 1].
    pub sentiment: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSnapshot {
    pub articles: Vec<ScoredArticle>,
    pub aggregate_sentiment: f64,
    pub articles_analyzed: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

impl NewsSnapshot {
    /// Replaces the snapshot wholesale when the analysis covered at least one
    /// article. Returns whether anything changed; an empty analysis keeps the
    /// last known sentiment.
    pub fn apply(&mut self, analysis: SentimentAnalysis, now: DateTime<Utc>) -> bool {
        if analysis.count == 0 {
            return false;
        }
        *self = NewsSnapshot {
            articles: analysis.articles,
            aggregate_sentiment: analysis.aggregate,
            articles_analyzed: analysis.count,
            last_updated: Some(now),
        };
        true
    }
}

//! Lexicon-based news sentiment.
//!
//! Each word in the AFINN-165 lexicon carries an integer valence in [-5, 5]. A text
//! scores the sum of the valences of its tokens, with a token's valence flipped when
//! the word right before it is a negator ("not good" scores -3).
//!
//! Tokens are lowercase runs of letters, digits, apostrophes and hyphens, so
//! contractions and hyphenated entries such as "short-sighted" match as one word.

use crate::news::{RawArticle, ScoredArticle};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Compresses unbounded lexicon sums into a multiplier-friendly range.
pub const DAMPING_FACTOR: f64 = 0.1;
pub const RETAINED_ARTICLES: usize = 5;

/// AFINN-165 word list, one `word<TAB>valence` pair per line.
const AFINN_165: &str = include_str!("../data/afinn-165.tsv");

lazy_static! {
    static ref LEXICON: HashMap<&'static str, i32> = AFINN_165
        .lines()
        .filter_map(|line| {
            let (word, valence) = line.split_once('\t')?;
            Some((word, valence.trim().parse::<i32>().ok()?))
        })
        .collect();

    static ref NEGATORS: HashSet<&'static str> = [
        "not", "no", "never", "neither", "nor", "without", "cannot",
        "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
        "won't", "can't", "shouldn't", "wouldn't",
    ]
    .into_iter()
    .collect();
}

/// Sums lexicon valences over the tokens of `text`.
pub fn score_text(text: &str) -> i32 {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut score = 0;
    let mut previous: Option<&str> = None;
    for token in normalized.split_whitespace() {
        if let Some(valence) = LEXICON.get(token) {
            let negated = previous.map(|p| NEGATORS.contains(p)).unwrap_or(false);
            score += if negated { -valence } else { *valence };
        }
        previous = Some(token);
    }
    score
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentAnalysis {
    /// The most recent qualifying articles, newest first.
    pub articles: Vec<ScoredArticle>,
    /// Damped mean over every qualifying article, in [-1, 1].
    pub aggregate: f64,
    /// Number of qualifying articles.
    pub count: usize,
}

/// Scores a batch of articles.
///
/// Articles missing a title or description are skipped entirely. The aggregate and
/// count cover every qualifying article; only the newest [`RETAINED_ARTICLES`] are
/// kept for display.
pub fn analyze(articles: &[RawArticle]) -> SentimentAnalysis {
    let mut scored: Vec<ScoredArticle> = articles.iter().filter_map(score_article).collect();

    let count = scored.len();
    if count == 0 {
        return SentimentAnalysis::default();
    }

    let total: f64 = scored.iter().map(|a| a.raw_score).sum();
    let aggregate = damp(total / count as f64);

    // Option orders None first, so reversing puts undated articles last.
    scored.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    scored.truncate(RETAINED_ARTICLES);

    SentimentAnalysis {
        articles: scored,
        aggregate,
        count,
    }
}

fn score_article(article: &RawArticle) -> Option<ScoredArticle> {
    let title = article.title.as_deref().filter(|t| !t.trim().is_empty())?;
    let description = article
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())?;

    let raw_score = (score_text(title) + score_text(description)) as f64 / 2.0;

    Some(ScoredArticle {
        title: title.to_string(),
        description: description.to_string(),
        source: article
            .source
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        published_at: article.published_at,
        raw_score,
        sentiment: damp(raw_score),
    })
}

fn damp(raw: f64) -> f64 {
    (raw * DAMPING_FACTOR).clamp(-1.0, 1.0)
}

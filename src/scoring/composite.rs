//! Composite scorer: weighted combination over defined categories

use crate::error::ScoreError;
use crate::models::{Category, CompositeScore, IndicatorVector};
use crate::scoring::normalize::{category_score, ScoringConfig};
use crate::scoring::weights::CategoryWeights;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Combine already-normalized category sub-scores into a composite score.
///
/// Nominal weights are renormalized over the defined categories, so the
/// total stays a true weighted average of available evidence; undefined
/// categories never pad the score with an assumed-neutral value. With zero
/// defined categories there is no score, only `InsufficientData`.
pub fn combine(
    symbol: &str,
    as_of: NaiveDate,
    category_scores: &BTreeMap<Category, Option<f64>>,
) -> Result<CompositeScore, ScoreError> {
    let defined: BTreeMap<Category, f64> = category_scores
        .iter()
        .filter_map(|(c, v)| v.map(|v| (*c, v)))
        .collect();

    if defined.is_empty() {
        return Err(ScoreError::InsufficientData {
            symbol: symbol.to_string(),
        });
    }

    let weight_sum: f64 = defined.keys().map(|c| CategoryWeights::get(*c)).sum();
    let weighted_total: f64 = defined
        .iter()
        .map(|(c, score)| CategoryWeights::get(*c) / weight_sum * score)
        .sum();
    let confidence = defined.len() as f64 / Category::ALL.len() as f64;

    Ok(CompositeScore {
        symbol: symbol.to_string(),
        as_of,
        category_scores: defined,
        weighted_total,
        confidence,
    })
}

/// Score one asset straight from its indicator vector.
pub fn score_vector(
    symbol: &str,
    as_of: NaiveDate,
    vector: &IndicatorVector,
    config: &ScoringConfig,
) -> Result<CompositeScore, ScoreError> {
    let scores: BTreeMap<Category, Option<f64>> = Category::ALL
        .iter()
        .map(|c| (*c, category_score(vector, *c, config)))
        .collect();
    combine(symbol, as_of, &scores)
}

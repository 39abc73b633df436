use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator category. Each category carries a nominal weight in the
/// composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Pattern,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Trend,
        Category::Momentum,
        Category::Volatility,
        Category::Volume,
        Category::Pattern,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Trend => "trend",
            Category::Momentum => "momentum",
            Category::Volatility => "volatility",
            Category::Volume => "volume",
            Category::Pattern => "pattern",
        }
    }
}

/// Per-asset mapping of indicator name to value, grouped by category.
///
/// Entries are `None` when the series was shorter than the indicator's
/// minimum lookback. A partially defined vector is normal; it never makes
/// the aggregation fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorVector {
    pub entries: BTreeMap<Category, BTreeMap<String, Option<f64>>>,
}

impl IndicatorVector {
    pub fn insert(&mut self, category: Category, name: impl Into<String>, value: Option<f64>) {
        self.entries
            .entry(category)
            .or_default()
            .insert(name.into(), value);
    }

    pub fn category(&self, category: Category) -> Option<&BTreeMap<String, Option<f64>>> {
        self.entries.get(&category)
    }

    /// Defined values for one category, in indicator-name order.
    pub fn defined(&self, category: Category) -> Vec<f64> {
        self.entries
            .get(&category)
            .map(|m| m.values().filter_map(|v| *v).collect())
            .unwrap_or_default()
    }
}

/// Composite 0-10 technical-health score for one asset on one cycle.
///
/// `weighted_total` is a convex combination of the defined category scores
/// with the nominal weights renormalized over defined categories only.
/// Created once per asset per cycle, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub category_scores: BTreeMap<Category, f64>,
    pub weighted_total: f64,
    pub confidence: f64,
}

impl CompositeScore {
    /// Human rating bands, matching the original report wording.
    pub fn rating(&self) -> &'static str {
        if self.weighted_total >= 8.0 {
            "strong bullish"
        } else if self.weighted_total >= 6.5 {
            "bullish"
        } else if self.weighted_total >= 4.5 {
            "neutral"
        } else if self.weighted_total >= 3.0 {
            "bearish"
        } else {
            "strong bearish"
        }
    }
}

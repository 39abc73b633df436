//! Nominal category weights

use crate::models::Category;

/// Nominal category weights. They sum to 1.0; the composite scorer
/// renormalizes them over the defined categories of each vector.
pub struct CategoryWeights;

impl CategoryWeights {
    pub const TREND: f64 = 0.30;
    pub const MOMENTUM: f64 = 0.25;
    pub const VOLATILITY: f64 = 0.20;
    pub const VOLUME: f64 = 0.15;
    pub const PATTERN: f64 = 0.10;

    /// Get the nominal weight for a category
    pub fn get(category: Category) -> f64 {
        match category {
            Category::Trend => Self::TREND,
            Category::Momentum => Self::MOMENTUM,
            Category::Volatility => Self::VOLATILITY,
            Category::Volume => Self::VOLUME,
            Category::Pattern => Self::PATTERN,
        }
    }

    /// Verify weights sum to 1.0
    pub fn verify() -> bool {
        let sum: f64 = Category::ALL.iter().map(|c| Self::get(*c)).sum();
        (sum - 1.0).abs() < 0.001
    }
}

//! Composite scoring interfaces.

pub mod composite;
pub mod normalize;
pub mod weights;

pub use composite::{combine, score_vector};
pub use normalize::ScoringConfig;
pub use weights::CategoryWeights;

//! Shared data models spanning the engine layers.

pub mod candle;
pub mod score;

pub use candle::{AssetSeries, Candle};
pub use score::{Category, CompositeScore, IndicatorVector};

pub mod aggregator;
pub mod math;

pub mod momentum;
pub mod pattern;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use aggregator::aggregate;

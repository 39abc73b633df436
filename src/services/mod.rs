//! Collaborator boundaries and shared run state

pub mod market_data;
pub mod provider;
pub mod renderer;
pub mod store;

pub use market_data::MarketDataProvider;
pub use provider::HttpMarketDataProvider;
pub use renderer::{ArtifactRenderer, ScoreCardRenderer};
pub use store::SeriesStore;

//! Scheduled job executors for the daily and weekly chains

pub mod context;
pub mod handlers;

pub use context::JobContext;
pub use handlers::{default_executors, AnalysisJob, DataUpdateJob, PortfolioTrackingJob, PublishJob};

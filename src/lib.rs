//! marketpulse: daily market technical-health scoring orchestrator
//!
//! A single long-lived process runs a fixed calendar of dependent jobs
//! (data update, analysis/scoring, publish, weekly portfolio tracking),
//! turns raw indicator vectors into composite 0-10 scores per asset, and
//! republishes artifacts atomically to a statically served directory.

pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod publish;
pub mod scheduler;
pub mod scoring;
pub mod services;

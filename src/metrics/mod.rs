//! Prometheus metrics for job execution and scoring

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub job_runs_total: IntCounterVec,
    pub job_duration_seconds: HistogramVec,
    pub assets_scored_total: IntCounter,
    pub score_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let job_runs_total = IntCounterVec::new(
            Opts::new("job_runs_total", "Terminal job run outcomes"),
            &["job", "outcome"],
        )?;
        registry.register(Box::new(job_runs_total.clone()))?;

        let job_duration_seconds = HistogramVec::new(
            HistogramOpts::new("job_duration_seconds", "Wall-clock duration of job runs"),
            &["job"],
        )?;
        registry.register(Box::new(job_duration_seconds.clone()))?;

        let assets_scored_total = IntCounter::new(
            "assets_scored_total",
            "Assets that produced a composite score",
        )?;
        registry.register(Box::new(assets_scored_total.clone()))?;

        let score_failures_total = IntCounter::new(
            "score_failures_total",
            "Per-asset scoring failures (insufficient data)",
        )?;
        registry.register(Box::new(score_failures_total.clone()))?;

        Ok(Self {
            registry,
            job_runs_total,
            job_duration_seconds,
            assets_scored_total,
            score_failures_total,
        })
    }

    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

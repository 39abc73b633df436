//! Error taxonomy shared across the orchestrator

use thiserror::Error;

/// Errors from the market-data collaborator.
///
/// Everything except `NotFound` is considered transient at the job level and
/// subject to the job's retry policy.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited by data provider")]
    RateLimited,
    #[error("no series available for symbol {0}")]
    NotFound(String),
    #[error("data provider request timed out")]
    Timeout,
    #[error("data provider transport error: {0}")]
    Transport(String),
    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether a retry inside the provider client is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited | ProviderError::Timeout | ProviderError::Transport(_)
        )
    }
}

/// Per-asset scoring failure. Isolated per asset, never fails the whole job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("insufficient data: no category produced a defined score for {symbol}")]
    InsufficientData { symbol: String },
}

/// Errors reported by a delegated job worker back to the scheduler.
#[derive(Debug, Error)]
pub enum JobError {
    /// Collaborator failure the retry policy should absorb.
    #[error("transient collaborator error: {0}")]
    Transient(String),
    /// The worker exceeded the job's wall-clock budget.
    #[error("job exceeded its timeout")]
    Timeout,
    /// The job ran but produced nothing usable.
    #[error("job produced no usable output: {0}")]
    Empty(String),
}

/// Chart/report rendering collaborator failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render io error for {symbol}: {source}")]
    Io {
        symbol: String,
        #[source]
        source: std::io::Error,
    },
    #[error("render serialization error for {symbol}: {source}")]
    Serde {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Artifact publishing failures.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("source artifact missing: {0}")]
    MissingSource(String),
    #[error("publish io error for {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Unrecoverable configuration problems. Fatal at startup only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid calendar: {0}")]
    Calendar(String),
    #[error("job {job} depends on unknown job {dependency}")]
    UnknownDependency { job: String, dependency: String },
    #[error("dependency cycle involving job {0}")]
    DependencyCycle(String),
    #[error("duplicate job name {0}")]
    DuplicateJob(String),
    #[error("invalid trigger for job {job}: {reason}")]
    Trigger { job: String, reason: String },
    #[error("failed to read calendar file {path}: {source}")]
    CalendarFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse calendar file {path}: {source}")]
    CalendarParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration value for {key}: {value}")]
    Value { key: String, value: String },
}

/// Checkpoint log read/write failures.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

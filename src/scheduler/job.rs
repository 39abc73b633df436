//! Job definitions, per-cycle run state, and worker reports

use crate::error::JobError;
use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a job fires within its cycle. Times are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    Daily { at: NaiveTime },
    Weekly { on: Weekday, at: NaiveTime },
}

impl Trigger {
    /// Cycle key for the cycle containing `now`: the calendar date for
    /// daily jobs, the ISO week for weekly jobs.
    pub fn cycle_key(&self, now: DateTime<Utc>) -> String {
        match self {
            Trigger::Daily { .. } => now.date_naive().to_string(),
            Trigger::Weekly { .. } => {
                let week = now.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }

    /// The trigger instant within the cycle containing `now`.
    pub fn fire_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Trigger::Daily { at } => Utc
                .from_utc_datetime(&now.date_naive().and_time(*at)),
            Trigger::Weekly { on, at } => {
                let today = now.date_naive();
                let offset = on.num_days_from_monday() as i64
                    - today.weekday().num_days_from_monday() as i64;
                let day = today + chrono::Duration::days(offset);
                Utc.from_utc_datetime(&day.and_time(*at))
            }
        }
    }

    /// Jobs sharing a dependency edge must share a cadence, otherwise
    /// their cycle keys can never match.
    pub fn same_cadence(&self, other: &Trigger) -> bool {
        matches!(
            (self, other),
            (Trigger::Daily { .. }, Trigger::Daily { .. })
                | (Trigger::Weekly { .. }, Trigger::Weekly { .. })
        )
    }
}

/// Static description of one scheduled job, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_secs: u64,
    pub dependency_timeout_secs: u64,
}

impl JobSpec {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    pub fn dependency_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.dependency_timeout_secs as i64)
    }
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// Collaborator error, retries exhausted.
    Error,
    /// The run exceeded its wall-clock budget, retries exhausted.
    Timeout,
    /// An upstream dependency never reached `Succeeded` in time.
    DependencyTimeout,
    /// An upstream dependency failed terminally; this job never ran.
    UpstreamFailure,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureCause::Error => "error",
            FailureCause::Timeout => "timeout",
            FailureCause::DependencyTimeout => "dependency_timeout",
            FailureCause::UpstreamFailure => "upstream_failure",
        };
        f.write_str(s)
    }
}

/// Per-cycle job state machine.
///
/// `Pending -> Waiting -> Running -> {Succeeded | Failed}` with
/// `Failed -> Retrying -> Running` while attempts remain. `Succeeded` and
/// retry-exhausted `Failed` are terminal for the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Waiting,
    Running,
    Retrying { until: DateTime<Utc> },
    Succeeded,
    Failed { cause: FailureCause },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Waiting => "waiting",
            JobState::Running => "running",
            JobState::Retrying { .. } => "retrying",
            JobState::Succeeded => "succeeded",
            JobState::Failed { .. } => "failed",
        }
    }
}

/// Mutable run record for one job within one cycle. Only the scheduler
/// loop writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub job: String,
    pub cycle: String,
    pub state: JobState,
    pub attempt: u32,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl JobRun {
    pub fn new(job: impl Into<String>, cycle: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            cycle: cycle.into(),
            state: JobState::Pending,
            attempt: 0,
            last_run_at: None,
            last_error: None,
        }
    }
}

/// Outcome message a delegated worker sends back to the scheduler loop.
#[derive(Debug)]
pub struct JobReport {
    pub job: String,
    pub cycle: String,
    pub attempt: u32,
    pub outcome: Result<String, JobError>,
    pub elapsed: Duration,
}

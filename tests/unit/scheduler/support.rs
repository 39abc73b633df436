//! Scheduler test harness: scripted executors and fixed clocks

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use marketpulse::error::JobError;
use marketpulse::scheduler::{
    Calendar, CheckpointLog, ExecutorMap, JobExecutor, JobRun, JobSpec, JobState, Scheduler,
    Trigger,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for a stub job.
pub enum StubBehavior {
    Succeed,
    FailAlways,
    /// Fail the first `n` calls, then succeed.
    FailTimes(usize),
    /// Take this long, then succeed.
    Sleep(Duration),
    /// Never finish within any sane test timeout.
    Hang,
}

pub struct StubExecutor {
    pub name: String,
    pub behavior: StubBehavior,
    pub calls: AtomicUsize,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl StubExecutor {
    pub fn new(name: &str, behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            events: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn with_events(
        name: &str,
        behavior: StubBehavior,
        events: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            events,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobExecutor for StubExecutor {
    async fn execute(&self) -> Result<String, JobError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("{}:start", self.name));
        let outcome = match &self.behavior {
            StubBehavior::Succeed => Ok("ok".to_string()),
            StubBehavior::FailAlways => Err(JobError::Transient("scripted failure".to_string())),
            StubBehavior::FailTimes(n) => {
                if call < *n {
                    Err(JobError::Transient("scripted failure".to_string()))
                } else {
                    Ok("ok".to_string())
                }
            }
            StubBehavior::Sleep(d) => {
                tokio::time::sleep(*d).await;
                Ok("ok".to_string())
            }
            StubBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok("unreachable".to_string())
            }
        };
        if outcome.is_ok() {
            self.events.lock().unwrap().push(format!("{}:done", self.name));
        }
        outcome
    }
}

pub fn executors(stubs: &[Arc<StubExecutor>]) -> ExecutorMap {
    stubs
        .iter()
        .map(|s| (s.name.clone(), s.clone() as Arc<dyn JobExecutor>))
        .collect()
}

/// Daily job firing at `hh:mm` UTC with fast retries and a short timeout.
pub fn daily_job(name: &str, hh: u32, mm: u32, deps: &[&str], max_retries: u32) -> JobSpec {
    JobSpec {
        name: name.to_string(),
        trigger: Trigger::Daily {
            at: chrono::NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
        },
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
        timeout_secs: 5,
        max_retries,
        retry_backoff_secs: 0,
        dependency_timeout_secs: 3600,
    }
}

pub fn weekly_job(name: &str, on: chrono::Weekday, hh: u32, mm: u32) -> JobSpec {
    JobSpec {
        name: name.to_string(),
        trigger: Trigger::Weekly {
            on,
            at: chrono::NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
        },
        depends_on: Vec::new(),
        timeout_secs: 5,
        max_retries: 0,
        retry_backoff_secs: 0,
        dependency_timeout_secs: 3600,
    }
}

/// Build a scheduler over a throwaway checkpoint file.
pub fn scheduler(specs: Vec<JobSpec>, stubs: &[Arc<StubExecutor>]) -> (Scheduler, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = CheckpointLog::new(dir.path().join("runs.jsonl"));
    let calendar = Calendar::from_specs(specs).unwrap();
    let sched = Scheduler::new(calendar, executors(stubs), checkpoint, None).unwrap();
    (sched, dir)
}

/// Monday 2025-06-02 at `hh:mm:ss` UTC.
pub fn monday_at(hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hh, mm, ss).unwrap()
}

/// Tuesday 2025-06-03 at `hh:mm:ss` UTC, same ISO week as `monday_at`.
pub fn tuesday_at(hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 3, hh, mm, ss).unwrap()
}

pub fn run_of(sched: &Scheduler, job: &str) -> JobRun {
    sched
        .runs()
        .into_iter()
        .find(|r| r.job == job)
        .unwrap_or_else(|| panic!("no run record for {job}"))
}

pub fn state_of(sched: &Scheduler, job: &str) -> JobState {
    run_of(sched, job).state
}

/// Give delegated workers time to finish and report.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

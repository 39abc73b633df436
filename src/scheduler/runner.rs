//! Scheduler loop and per-cycle state machine
//!
//! One cooperative loop owns every job record: trigger polling, dependency
//! resolution, retry timers, and worker reports all mutate state from
//! `tick`. The actual work of a job runs in a delegated tokio task bounded
//! by the job's timeout, reporting back over a channel, so a slow job never
//! delays trigger detection for the others.

use crate::error::{CheckpointError, ConfigError, JobError};
use crate::metrics::Metrics;
use crate::scheduler::calendar::Calendar;
use crate::scheduler::checkpoint::{CheckpointLog, TransitionRecord};
use crate::scheduler::job::{FailureCause, JobReport, JobRun, JobSpec, JobState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// The work delegated for one job run. Implementations live in the jobs
/// module; the scheduler only sees success/failure plus a detail line.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self) -> Result<String, JobError>;
}

pub type ExecutorMap = HashMap<String, Arc<dyn JobExecutor>>;

const MAX_BACKOFF_EXPONENT: u32 = 6;

fn backoff_with_jitter(base: Duration, attempt: u32) -> Duration {
    let exp = attempt.min(MAX_BACKOFF_EXPONENT);
    let scaled = base.saturating_mul(2u32.saturating_pow(exp));
    let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis().max(1) as u64 / 2);
    scaled + Duration::from_millis(jitter_ms)
}

enum DepsStatus {
    Met,
    Outstanding,
    FailedUpstream,
}

pub struct Scheduler {
    calendar: Calendar,
    executors: ExecutorMap,
    checkpoint: CheckpointLog,
    metrics: Option<Arc<Metrics>>,
    runs: HashMap<String, JobRun>,
    report_tx: mpsc::UnboundedSender<JobReport>,
    report_rx: mpsc::UnboundedReceiver<JobReport>,
    snapshot_tx: watch::Sender<Vec<JobRun>>,
}

impl Scheduler {
    pub fn new(
        calendar: Calendar,
        executors: ExecutorMap,
        checkpoint: CheckpointLog,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self, ConfigError> {
        for spec in calendar.jobs() {
            if !executors.contains_key(&spec.name) {
                return Err(ConfigError::Calendar(format!(
                    "no executor registered for job {}",
                    spec.name
                )));
            }
        }
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Ok(Self {
            calendar,
            executors,
            checkpoint,
            metrics,
            runs: HashMap::new(),
            report_tx,
            report_rx,
            snapshot_tx,
        })
    }

    /// Observable run state, refreshed after every tick. Feeds the status
    /// endpoint and health checks.
    pub fn subscribe(&self) -> watch::Receiver<Vec<JobRun>> {
        self.snapshot_tx.subscribe()
    }

    /// Replay the checkpoint log for the cycles containing `now`.
    ///
    /// Terminal outcomes are honored across the restart: a job already
    /// `Succeeded` this cycle will not re-run. A run interrupted
    /// mid-`Running` (or parked in `Waiting`/`Retrying`) resumes from
    /// `Pending`.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), CheckpointError> {
        let latest = self.checkpoint.load_latest()?;
        for spec in self.calendar.jobs() {
            let cycle = spec.trigger.cycle_key(now);
            if let Some(record) = latest.get(&(spec.name.clone(), cycle.clone())) {
                let mut run = JobRun::new(&spec.name, &cycle);
                if record.state.is_terminal() {
                    run.state = record.state.clone();
                    run.attempt = record.attempt;
                } else {
                    info!(
                        job = %spec.name,
                        cycle = %cycle,
                        interrupted = record.state.label(),
                        "resuming interrupted run from pending"
                    );
                }
                self.runs.insert(spec.name.clone(), run);
            }
        }
        Ok(())
    }

    /// One cooperative scheduling pass at the given instant.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.drain_reports(now);
        self.roll_cycles(now);
        self.advance(now);
        self.publish_snapshot();
    }

    /// Current run records, sorted by job name.
    pub fn runs(&self) -> Vec<JobRun> {
        let mut runs: Vec<JobRun> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.job.cmp(&b.job));
        runs
    }

    /// Drive the scheduler until shutdown flips.
    pub async fn run(mut self, poll: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(poll);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(poll = ?poll, "scheduler loop started");
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(Utc::now()),
                _ = shutdown.changed() => break,
            }
        }
        info!("scheduler loop stopped");
    }

    fn drain_reports(&mut self, now: DateTime<Utc>) {
        let mut reports = Vec::new();
        while let Ok(report) = self.report_rx.try_recv() {
            reports.push(report);
        }
        for report in reports {
            self.apply_report(report, now);
        }
    }

    /// Open a fresh `Pending` run whenever a job's cycle key moves on, and
    /// finalize stragglers left over from the previous cycle.
    fn roll_cycles(&mut self, now: DateTime<Utc>) {
        for spec in self.calendar.jobs().to_vec() {
            let cycle = spec.trigger.cycle_key(now);
            match self.runs.get(&spec.name) {
                None => {
                    let run = JobRun::new(&spec.name, &cycle);
                    self.runs.insert(spec.name.clone(), run);
                    self.record_transition(&spec.name, now);
                }
                Some(run) if run.cycle != cycle => match &run.state {
                    JobState::Running => {
                        // Bounded by the job timeout; the report finalizes it.
                    }
                    JobState::Pending => {
                        self.runs.insert(spec.name.clone(), JobRun::new(&spec.name, &cycle));
                        self.record_transition(&spec.name, now);
                    }
                    JobState::Waiting => {
                        self.transition(
                            &spec.name,
                            JobState::Failed {
                                cause: FailureCause::DependencyTimeout,
                            },
                            now,
                        );
                    }
                    JobState::Retrying { .. } => {
                        self.transition(
                            &spec.name,
                            JobState::Failed {
                                cause: FailureCause::Error,
                            },
                            now,
                        );
                    }
                    JobState::Succeeded | JobState::Failed { .. } => {
                        self.runs.insert(spec.name.clone(), JobRun::new(&spec.name, &cycle));
                        self.record_transition(&spec.name, now);
                    }
                },
                Some(_) => {}
            }
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        for spec in self.calendar.jobs().to_vec() {
            let Some(run) = self.runs.get(&spec.name) else {
                continue;
            };
            let cycle = run.cycle.clone();
            match run.state.clone() {
                JobState::Pending => {
                    if now < spec.trigger.fire_time(now) || cycle != spec.trigger.cycle_key(now) {
                        continue;
                    }
                    match self.deps_status(&spec, &cycle) {
                        DepsStatus::Met => self.dispatch(&spec, now),
                        DepsStatus::FailedUpstream => self.transition(
                            &spec.name,
                            JobState::Failed {
                                cause: FailureCause::UpstreamFailure,
                            },
                            now,
                        ),
                        DepsStatus::Outstanding => {
                            self.transition(&spec.name, JobState::Waiting, now)
                        }
                    }
                }
                JobState::Waiting => match self.deps_status(&spec, &cycle) {
                    DepsStatus::Met => self.dispatch(&spec, now),
                    DepsStatus::FailedUpstream => self.transition(
                        &spec.name,
                        JobState::Failed {
                            cause: FailureCause::UpstreamFailure,
                        },
                        now,
                    ),
                    DepsStatus::Outstanding => {
                        let deadline = spec.trigger.fire_time(now) + spec.dependency_timeout();
                        if now >= deadline {
                            self.transition(
                                &spec.name,
                                JobState::Failed {
                                    cause: FailureCause::DependencyTimeout,
                                },
                                now,
                            );
                        }
                    }
                },
                JobState::Retrying { until } => {
                    if now >= until {
                        self.dispatch(&spec, now);
                    }
                }
                JobState::Running | JobState::Succeeded | JobState::Failed { .. } => {}
            }
        }
    }

    fn deps_status(&self, spec: &JobSpec, cycle: &str) -> DepsStatus {
        let mut all_met = true;
        for dep in &spec.depends_on {
            match self.runs.get(dep) {
                Some(run) if run.cycle == cycle => match &run.state {
                    JobState::Succeeded => {}
                    JobState::Failed { .. } => return DepsStatus::FailedUpstream,
                    _ => all_met = false,
                },
                _ => all_met = false,
            }
        }
        if all_met {
            DepsStatus::Met
        } else {
            DepsStatus::Outstanding
        }
    }

    fn dispatch(&mut self, spec: &JobSpec, now: DateTime<Utc>) {
        let Some(executor) = self.executors.get(&spec.name).cloned() else {
            // Unreachable after construction-time validation.
            error!(job = %spec.name, "no executor for job");
            self.transition(
                &spec.name,
                JobState::Failed {
                    cause: FailureCause::Error,
                },
                now,
            );
            return;
        };
        let (cycle, attempt) = {
            let Some(run) = self.runs.get_mut(&spec.name) else {
                return;
            };
            run.last_run_at = Some(now);
            (run.cycle.clone(), run.attempt)
        };
        self.transition(&spec.name, JobState::Running, now);

        let tx = self.report_tx.clone();
        let job = spec.name.clone();
        let timeout = spec.timeout();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(timeout, executor.execute()).await {
                Ok(result) => result,
                // Cancellation of the worker future is the forced stop.
                Err(_elapsed) => Err(JobError::Timeout),
            };
            let _ = tx.send(JobReport {
                job,
                cycle,
                attempt,
                outcome,
                elapsed: started.elapsed(),
            });
        });
    }

    fn apply_report(&mut self, report: JobReport, now: DateTime<Utc>) {
        let Some(spec) = self.calendar.get(&report.job).cloned() else {
            return;
        };
        let stale = match self.runs.get(&report.job) {
            Some(run) => {
                run.cycle != report.cycle
                    || run.attempt != report.attempt
                    || run.state != JobState::Running
            }
            None => true,
        };
        if stale {
            debug!(job = %report.job, cycle = %report.cycle, "dropping stale worker report");
            return;
        }

        match report.outcome {
            Ok(detail) => {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .job_runs_total
                        .with_label_values(&[&report.job, "succeeded"])
                        .inc();
                    metrics
                        .job_duration_seconds
                        .with_label_values(&[&report.job])
                        .observe(report.elapsed.as_secs_f64());
                }
                info!(
                    job = %report.job,
                    cycle = %report.cycle,
                    attempt = report.attempt,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    detail = %detail,
                    "job succeeded"
                );
                self.transition(&report.job, JobState::Succeeded, now);
            }
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .job_runs_total
                        .with_label_values(&[&report.job, "failed"])
                        .inc();
                }
                let cause = match err {
                    JobError::Timeout => FailureCause::Timeout,
                    _ => FailureCause::Error,
                };
                if let Some(run) = self.runs.get_mut(&report.job) {
                    run.last_error = Some(err.to_string());
                }
                let attempt = report.attempt;
                if attempt < spec.max_retries {
                    let delay = backoff_with_jitter(spec.retry_backoff(), attempt);
                    let until = now
                        + chrono::Duration::from_std(delay)
                            .unwrap_or_else(|_| chrono::Duration::zero());
                    warn!(
                        job = %report.job,
                        cycle = %report.cycle,
                        attempt,
                        cause = %cause,
                        error = %err,
                        retry_at = %until,
                        "job attempt failed, retry scheduled"
                    );
                    if let Some(run) = self.runs.get_mut(&report.job) {
                        run.attempt = attempt + 1;
                    }
                    self.transition(&report.job, JobState::Retrying { until }, now);
                } else {
                    error!(
                        job = %report.job,
                        cycle = %report.cycle,
                        attempt,
                        cause = %cause,
                        error = %err,
                        "job failed terminally, retries exhausted"
                    );
                    self.transition(&report.job, JobState::Failed { cause }, now);
                }
            }
        }
    }

    /// Apply a state change, logging the transition and appending it to
    /// the checkpoint log.
    fn transition(&mut self, job: &str, new_state: JobState, now: DateTime<Utc>) {
        let Some(run) = self.runs.get_mut(job) else {
            return;
        };
        let previous = run.state.label();
        run.state = new_state;
        let cause = match &run.state {
            JobState::Failed { cause } => Some(cause.to_string()),
            _ => None,
        };
        info!(
            job = %run.job,
            cycle = %run.cycle,
            from = previous,
            to = run.state.label(),
            attempt = run.attempt,
            cause = cause.as_deref().unwrap_or("-"),
            "job transition"
        );
        self.record_transition(job, now);
    }

    fn record_transition(&mut self, job: &str, now: DateTime<Utc>) {
        let Some(run) = self.runs.get(job) else {
            return;
        };
        let record = TransitionRecord {
            job: run.job.clone(),
            cycle: run.cycle.clone(),
            state: run.state.clone(),
            attempt: run.attempt,
            at: now,
        };
        if let Err(e) = self.checkpoint.append(&record) {
            // The in-memory machine stays authoritative for this process;
            // only restart resumption degrades.
            error!(job = %job, error = %e, "failed to append checkpoint record");
        }
    }

    fn publish_snapshot(&self) {
        let _ = self.snapshot_tx.send_replace(self.runs());
    }
}

//! Scheduler state-machine tests driven by a synthetic clock
//!
//! `tick` takes an explicit instant, so these tests jump time forward at
//! will; only worker completion needs real (tens of milliseconds) waiting.

use crate::scheduler_support::*;
use chrono::Weekday;
use marketpulse::scheduler::{FailureCause, JobState, Trigger};
use std::time::Duration;

#[tokio::test]
async fn job_never_runs_before_its_fire_time() {
    let stub = StubExecutor::new("fetch", StubBehavior::Succeed);
    let (mut sched, _dir) = scheduler(vec![daily_job("fetch", 10, 10, &[], 0)], &[stub.clone()]);

    sched.tick(monday_at(10, 9, 59));
    assert_eq!(state_of(&sched, "fetch"), JobState::Pending);
    assert_eq!(stub.call_count(), 0);

    sched.tick(monday_at(10, 10, 0));
    assert_eq!(state_of(&sched, "fetch"), JobState::Running);
    settle().await;
    sched.tick(monday_at(10, 10, 1));
    assert_eq!(state_of(&sched, "fetch"), JobState::Succeeded);
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn dependent_waits_until_its_dependency_succeeds() {
    let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let fetch = StubExecutor::with_events(
        "fetch",
        StubBehavior::Sleep(Duration::from_millis(100)),
        events.clone(),
    );
    let report = StubExecutor::with_events("report", StubBehavior::Succeed, events.clone());
    let (mut sched, _dir) = scheduler(
        vec![
            daily_job("fetch", 10, 10, &[], 0),
            daily_job("report", 10, 10, &["fetch"], 0),
        ],
        &[fetch, report],
    );

    sched.tick(monday_at(10, 10, 0));
    assert_eq!(state_of(&sched, "fetch"), JobState::Running);
    assert_eq!(state_of(&sched, "report"), JobState::Waiting);

    tokio::time::sleep(Duration::from_millis(150)).await;
    sched.tick(monday_at(10, 10, 1));
    assert_eq!(state_of(&sched, "fetch"), JobState::Succeeded);
    assert_eq!(state_of(&sched, "report"), JobState::Running);

    settle().await;
    sched.tick(monday_at(10, 10, 2));
    assert_eq!(state_of(&sched, "report"), JobState::Succeeded);

    let events = events.lock().unwrap().clone();
    let fetch_done = events.iter().position(|e| e == "fetch:done").unwrap();
    let report_start = events.iter().position(|e| e == "report:start").unwrap();
    assert!(fetch_done < report_start, "dependent started before dependency finished");
}

#[tokio::test]
async fn upstream_failure_fails_the_dependent_without_running_it() {
    let fetch = StubExecutor::new("fetch", StubBehavior::FailAlways);
    let report = StubExecutor::new("report", StubBehavior::Succeed);
    let (mut sched, _dir) = scheduler(
        vec![
            daily_job("fetch", 10, 10, &[], 0),
            daily_job("report", 10, 10, &["fetch"], 0),
        ],
        &[fetch, report.clone()],
    );

    sched.tick(monday_at(10, 10, 0));
    settle().await;
    sched.tick(monday_at(10, 10, 1));
    assert_eq!(
        state_of(&sched, "fetch"),
        JobState::Failed {
            cause: FailureCause::Error
        }
    );
    assert_eq!(
        state_of(&sched, "report"),
        JobState::Failed {
            cause: FailureCause::UpstreamFailure
        }
    );
    assert_eq!(report.call_count(), 0);
}

#[tokio::test]
async fn transient_failures_retry_then_succeed() {
    let stub = StubExecutor::new("fetch", StubBehavior::FailTimes(2));
    let (mut sched, _dir) = scheduler(vec![daily_job("fetch", 10, 10, &[], 2)], &[stub.clone()]);

    sched.tick(monday_at(10, 10, 0));
    settle().await;
    // zero backoff: each tick converts the failure report into an
    // immediate re-dispatch
    sched.tick(monday_at(10, 10, 5));
    settle().await;
    sched.tick(monday_at(10, 10, 10));
    settle().await;
    sched.tick(monday_at(10, 10, 15));

    let run = run_of(&sched, "fetch");
    assert_eq!(run.state, JobState::Succeeded);
    assert_eq!(run.attempt, 2);
    assert_eq!(stub.call_count(), 3);
}

#[tokio::test]
async fn exhausted_retries_end_in_terminal_failure() {
    let stub = StubExecutor::new("fetch", StubBehavior::FailAlways);
    let (mut sched, _dir) = scheduler(vec![daily_job("fetch", 10, 10, &[], 1)], &[stub.clone()]);

    sched.tick(monday_at(10, 10, 0));
    settle().await;
    sched.tick(monday_at(10, 10, 5));
    settle().await;
    sched.tick(monday_at(10, 10, 10));

    let run = run_of(&sched, "fetch");
    assert_eq!(
        run.state,
        JobState::Failed {
            cause: FailureCause::Error
        }
    );
    assert!(run.last_error.is_some());
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn overrunning_job_is_cut_off_and_marked_timeout() {
    let stub = StubExecutor::new("fetch", StubBehavior::Hang);
    let mut spec = daily_job("fetch", 10, 10, &[], 0);
    spec.timeout_secs = 1;
    let (mut sched, _dir) = scheduler(vec![spec], &[stub]);

    sched.tick(monday_at(10, 10, 0));
    assert_eq!(state_of(&sched, "fetch"), JobState::Running);
    tokio::time::sleep(Duration::from_millis(1200)).await;
    sched.tick(monday_at(10, 10, 2));
    assert_eq!(
        state_of(&sched, "fetch"),
        JobState::Failed {
            cause: FailureCause::Timeout
        }
    );
}

#[tokio::test]
async fn stalled_dependency_times_the_dependent_out() {
    let fetch = StubExecutor::new("fetch", StubBehavior::Succeed);
    let report = StubExecutor::new("report", StubBehavior::Succeed);
    // fetch fires at 11:00, long after report wants to run
    let mut report_spec = daily_job("report", 10, 10, &["fetch"], 0);
    report_spec.dependency_timeout_secs = 60;
    let (mut sched, _dir) = scheduler(
        vec![daily_job("fetch", 11, 0, &[], 0), report_spec],
        &[fetch, report.clone()],
    );

    sched.tick(monday_at(10, 10, 0));
    assert_eq!(state_of(&sched, "report"), JobState::Waiting);
    sched.tick(monday_at(10, 12, 0));
    assert_eq!(
        state_of(&sched, "report"),
        JobState::Failed {
            cause: FailureCause::DependencyTimeout
        }
    );
    assert_eq!(report.call_count(), 0);
}

#[tokio::test]
async fn new_day_opens_a_fresh_cycle() {
    let stub = StubExecutor::new("fetch", StubBehavior::Succeed);
    let (mut sched, _dir) = scheduler(vec![daily_job("fetch", 10, 10, &[], 0)], &[stub.clone()]);

    sched.tick(monday_at(10, 10, 0));
    settle().await;
    sched.tick(monday_at(10, 10, 1));
    let run = run_of(&sched, "fetch");
    assert_eq!(run.state, JobState::Succeeded);
    assert_eq!(run.cycle, "2025-06-02");

    sched.tick(tuesday_at(9, 0, 0));
    let run = run_of(&sched, "fetch");
    assert_eq!(run.state, JobState::Pending);
    assert_eq!(run.cycle, "2025-06-03");
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn weekly_cycle_spans_the_whole_iso_week() {
    let stub = StubExecutor::new("portfolio", StubBehavior::Succeed);
    let (mut sched, _dir) =
        scheduler(vec![weekly_job("portfolio", Weekday::Mon, 10, 20)], &[stub.clone()]);

    sched.tick(monday_at(10, 20, 0));
    settle().await;
    sched.tick(monday_at(10, 20, 1));
    let run = run_of(&sched, "portfolio");
    assert_eq!(run.state, JobState::Succeeded);
    assert_eq!(run.cycle, "2025-W23");

    // Tuesday is still week 23: no new run, no second execution
    sched.tick(tuesday_at(10, 20, 0));
    let run = run_of(&sched, "portfolio");
    assert_eq!(run.state, JobState::Succeeded);
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn weekly_fire_time_lands_on_the_trigger_weekday() {
    let trigger = Trigger::Weekly {
        on: Weekday::Mon,
        at: chrono::NaiveTime::from_hms_opt(10, 20, 0).unwrap(),
    };
    // asked from a Tuesday, the fire time is the Monday just past
    assert_eq!(trigger.fire_time(tuesday_at(15, 0, 0)), monday_at(10, 20, 0));
    assert_eq!(trigger.cycle_key(tuesday_at(15, 0, 0)), "2025-W23");
}

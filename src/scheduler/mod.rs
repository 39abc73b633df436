//! Job orchestration: calendar, state machine, checkpointing

pub mod calendar;
pub mod checkpoint;
pub mod job;
pub mod runner;

pub use calendar::Calendar;
pub use checkpoint::{CheckpointLog, TransitionRecord};
pub use job::{FailureCause, JobReport, JobRun, JobSpec, JobState, Trigger};
pub use runner::{ExecutorMap, JobExecutor, Scheduler};

//! Job calendar: static configuration of the day's job graph
//!
//! Loaded once at startup, either the built-in default schedule or a JSON
//! calendar file. Validation is strict: a malformed calendar aborts startup
//! rather than running a partially valid schedule.

use crate::error::ConfigError;
use crate::scheduler::job::{JobSpec, Trigger};
use chrono::{NaiveTime, Weekday};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

const DEFAULT_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_SECS: u64 = 60;
const DEFAULT_DEPENDENCY_TIMEOUT_SECS: u64 = 3600;

/// Validated job graph, jobs in topological order.
#[derive(Debug, Clone)]
pub struct Calendar {
    jobs: Vec<JobSpec>,
}

#[derive(Debug, Deserialize)]
struct CalendarFile {
    jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    name: String,
    /// `"daily HH:MM"` or `"weekly <weekday> HH:MM"`, UTC.
    trigger: String,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    retry_backoff_secs: u64,
    #[serde(default = "default_dependency_timeout")]
    dependency_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_backoff() -> u64 {
    DEFAULT_RETRY_BACKOFF_SECS
}
fn default_dependency_timeout() -> u64 {
    DEFAULT_DEPENDENCY_TIMEOUT_SECS
}

fn parse_time(job: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ConfigError::Trigger {
        job: job.to_string(),
        reason: format!("invalid time {value:?}, expected HH:MM"),
    })
}

fn parse_trigger(job: &str, value: &str) -> Result<Trigger, ConfigError> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["daily", at] => Ok(Trigger::Daily {
            at: parse_time(job, at)?,
        }),
        ["weekly", day, at] => {
            let on = Weekday::from_str(day).map_err(|_| ConfigError::Trigger {
                job: job.to_string(),
                reason: format!("unknown weekday {day:?}"),
            })?;
            Ok(Trigger::Weekly {
                on,
                at: parse_time(job, at)?,
            })
        }
        _ => Err(ConfigError::Trigger {
            job: job.to_string(),
            reason: format!("unparseable trigger {value:?}"),
        }),
    }
}

impl Calendar {
    /// The built-in production schedule: the daily
    /// data-update -> analysis -> publish chain plus the independent
    /// weekly portfolio chain.
    pub fn default_calendar() -> Self {
        let daily = |name: &str, at: &str, deps: &[&str]| JobSpec {
            name: name.to_string(),
            trigger: Trigger::Daily {
                at: NaiveTime::parse_from_str(at, "%H:%M").expect("static time"),
            },
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_secs: DEFAULT_RETRY_BACKOFF_SECS,
            dependency_timeout_secs: DEFAULT_DEPENDENCY_TIMEOUT_SECS,
        };
        let jobs = vec![
            daily("data-update", "10:10", &[]),
            daily("analysis", "10:40", &["data-update"]),
            daily("publish", "10:50", &["analysis"]),
            JobSpec {
                name: "portfolio-tracking".to_string(),
                trigger: Trigger::Weekly {
                    on: Weekday::Mon,
                    at: NaiveTime::parse_from_str("10:20", "%H:%M").expect("static time"),
                },
                depends_on: Vec::new(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                max_retries: DEFAULT_MAX_RETRIES,
                retry_backoff_secs: DEFAULT_RETRY_BACKOFF_SECS,
                dependency_timeout_secs: DEFAULT_DEPENDENCY_TIMEOUT_SECS,
            },
        ];
        Self::from_specs(jobs).expect("default calendar is valid")
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::CalendarFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: CalendarFile =
            serde_json::from_str(&raw).map_err(|e| ConfigError::CalendarParse {
                path: path.display().to_string(),
                source: e,
            })?;
        let specs = file
            .jobs
            .into_iter()
            .map(|entry| {
                Ok(JobSpec {
                    trigger: parse_trigger(&entry.name, &entry.trigger)?,
                    name: entry.name,
                    depends_on: entry.depends_on,
                    timeout_secs: entry.timeout_secs,
                    max_retries: entry.max_retries,
                    retry_backoff_secs: entry.retry_backoff_secs,
                    dependency_timeout_secs: entry.dependency_timeout_secs,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::from_specs(specs)
    }

    /// Validate and topologically order a job set.
    pub fn from_specs(specs: Vec<JobSpec>) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::Calendar("no jobs configured".to_string()));
        }

        let mut by_name: HashMap<&str, &JobSpec> = HashMap::new();
        for spec in &specs {
            if by_name.insert(spec.name.as_str(), spec).is_some() {
                return Err(ConfigError::DuplicateJob(spec.name.clone()));
            }
        }

        for spec in &specs {
            for dep in &spec.depends_on {
                let dep_spec =
                    by_name
                        .get(dep.as_str())
                        .ok_or_else(|| ConfigError::UnknownDependency {
                            job: spec.name.clone(),
                            dependency: dep.clone(),
                        })?;
                if !spec.trigger.same_cadence(&dep_spec.trigger) {
                    return Err(ConfigError::Calendar(format!(
                        "job {} and its dependency {} run on different cadences",
                        spec.name, dep
                    )));
                }
            }
        }

        // Kahn ordering; leftovers mean a cycle.
        let mut indegree: HashMap<&str, usize> = specs
            .iter()
            .map(|s| (s.name.as_str(), s.depends_on.len()))
            .collect();
        let mut ordered: Vec<JobSpec> = Vec::with_capacity(specs.len());
        let mut placed: HashSet<String> = HashSet::new();
        while ordered.len() < specs.len() {
            let next = specs.iter().find(|s| {
                !placed.contains(&s.name) && indegree.get(s.name.as_str()) == Some(&0)
            });
            let Some(next) = next else {
                let stuck = specs
                    .iter()
                    .find(|s| !placed.contains(&s.name))
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                return Err(ConfigError::DependencyCycle(stuck));
            };
            placed.insert(next.name.clone());
            for spec in &specs {
                if spec.depends_on.contains(&next.name) {
                    if let Some(d) = indegree.get_mut(spec.name.as_str()) {
                        *d -= 1;
                    }
                }
            }
            ordered.push(next.clone());
        }

        Ok(Self { jobs: ordered })
    }

    /// Jobs in topological order.
    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    pub fn get(&self, name: &str) -> Option<&JobSpec> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

//! Structured submission options.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local};
use serde_json::Value;

use crate::error::{BatchError, BatchResult};

/// When a job should become eligible to start.
#[derive(Debug, Clone, Copy)]
pub enum Delay {
    /// An absolute point in time.
    At(DateTime<Local>),
    /// A duration measured from the moment of submission.
    In(Duration),
}

impl Delay {
    /// Resolve against `now`; the result must be strictly in the future.
    pub(crate) fn resolve(&self, now: DateTime<Local>) -> BatchResult<DateTime<Local>> {
        let resolved = match self {
            Delay::At(at) => *at,
            Delay::In(duration) => now + *duration,
        };
        if resolved <= now {
            return Err(BatchError::InvalidArgument(format!(
                "delay resolves to {}, which is not in the future",
                resolved.format("%Y-%m-%dT%H:%M:%S")
            )));
        }
        Ok(resolved)
    }
}

/// Options for a single submit call.
///
/// The default submits the script as-is with no directives. List- and
/// map-valued fields accumulate across repeated builder calls:
///
/// ```
/// use batchq::SubmitOptions;
/// use chrono::Duration;
///
/// let options = SubmitOptions::new()
///     .with_queue("express")
///     .with_walltime(Duration::hours(10))
///     .with_dependency("job1")
///     .with_dependency("job2")
///     .with_dry_run(true);
/// # assert_eq!(options.depends_on.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Complete, scheduler-ready directive strings, passed through ahead
    /// of every assembled directive.
    pub directives: Vec<String>,

    /// Treat the job script as a template and render it before submission.
    pub render: bool,

    /// Return the assembled command string instead of executing it.
    pub dry_run: bool,

    /// Job IDs that must finish successfully before this job starts.
    pub depends_on: Vec<String>,

    /// Earliest start time for the job.
    pub delay: Option<Delay>,

    /// Queue (PBS) or partition (Slurm) to submit into.
    pub queue: Option<String>,

    /// Requested walltime.
    pub walltime: Option<Duration>,

    /// Storage mounts to attach (PBS only).
    pub storage: Vec<String>,

    /// Environment variables for the job; values must be JSON scalars.
    pub variables: BTreeMap<String, Value>,

    /// Extra key/value pairs available to command and job-script
    /// interpolation.
    pub context: BTreeMap<String, String>,
}

impl SubmitOptions {
    /// Empty options: submit the script untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw directive string.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Render the job script from a template.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Assemble the command without executing it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Append a job ID this job depends on.
    pub fn with_dependency(mut self, job_id: impl Into<String>) -> Self {
        self.depends_on.push(job_id.into());
        self
    }

    /// Delay the start of the job.
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Submit into a named queue or partition.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Request a walltime.
    pub fn with_walltime(mut self, walltime: Duration) -> Self {
        self.walltime = Some(walltime);
        self
    }

    /// Append a storage mount identifier.
    pub fn with_storage(mut self, mount: impl Into<String>) -> Self {
        self.storage.push(mount.into());
        self
    }

    /// Set an environment variable for the job.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Add an interpolation context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Render a scalar variable value for directives or the environment.
pub(crate) fn scalar_to_string(value: &Value) -> BatchResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(BatchError::InvalidArgument(format!(
            "variable values must be scalar, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_delay_at_future() {
        let now = Local.with_ymd_and_hms(2024, 7, 26, 12, 0, 0).unwrap();
        let at = Local.with_ymd_and_hms(2024, 7, 26, 13, 15, 0).unwrap();
        assert_eq!(Delay::At(at).resolve(now).unwrap(), at);
    }

    #[test]
    fn test_delay_at_past_rejected() {
        let now = Local.with_ymd_and_hms(2024, 7, 26, 12, 0, 0).unwrap();
        let at = Local.with_ymd_and_hms(2024, 7, 26, 11, 0, 0).unwrap();
        assert!(matches!(
            Delay::At(at).resolve(now),
            Err(BatchError::InvalidArgument(_))
        ));
        // The boundary counts as "not in the future".
        assert!(Delay::At(now).resolve(now).is_err());
    }

    #[test]
    fn test_delay_in_resolves_relative() {
        let now = Local.with_ymd_and_hms(2024, 7, 26, 12, 0, 0).unwrap();
        let resolved = Delay::In(Duration::minutes(90)).resolve(now).unwrap();
        assert_eq!(
            resolved,
            Local.with_ymd_and_hms(2024, 7, 26, 13, 30, 0).unwrap()
        );
        assert!(Delay::In(Duration::minutes(-5)).resolve(now).is_err());
    }

    #[test]
    fn test_builder_accumulates() {
        let options = SubmitOptions::new()
            .with_directive("-q express")
            .with_dependency("job1")
            .with_dependency("job2")
            .with_storage("gdata/rp23")
            .with_variable("var1", 1234)
            .with_variable("var2", "abcd")
            .with_context("project", "rp23");

        assert_eq!(options.directives, vec!["-q express"]);
        assert_eq!(options.depends_on, vec!["job1", "job2"]);
        assert_eq!(options.storage, vec!["gdata/rp23"]);
        assert_eq!(options.variables.len(), 2);
        assert_eq!(options.context.get("project").map(String::as_str), Some("rp23"));
        assert!(!options.dry_run);
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Value::from(1234)).unwrap(), "1234");
        assert_eq!(scalar_to_string(&Value::from("abcd")).unwrap(), "abcd");
        assert_eq!(scalar_to_string(&Value::from(true)).unwrap(), "true");
        assert!(scalar_to_string(&Value::Null).is_err());
        assert!(scalar_to_string(&serde_json::json!(["a", "b"])).is_err());
    }
}

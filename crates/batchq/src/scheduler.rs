//! The scheduler capability interface and the caller-facing client.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde_json::Value;
use tracing::debug;

use crate::directives::{self, DirectiveSet};
use crate::error::{BatchError, BatchResult};
use crate::job::Job;
use crate::options::SubmitOptions;
use crate::script::ScriptManager;
use crate::shell::{self, CommandRunner};
use crate::status::GenericStatus;
use crate::template;

/// Which scheduler variant an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    /// PBS / PBS Pro / Torque.
    Pbs,
    /// Slurm.
    Slurm,
    /// Development-mode mock (echo-backed).
    Mock,
}

impl SchedulerKind {
    /// Lowercase name of the scheduler.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerKind::Pbs => "pbs",
            SchedulerKind::Slurm => "slurm",
            SchedulerKind::Mock => "mock",
        }
    }
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command templates for one scheduler's control surface.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandSet {
    pub submit: &'static str,
    pub status: &'static str,
    pub delete: &'static str,
    pub hold: &'static str,
    pub release: &'static str,
}

/// Status of one job: the generic translation plus the scheduler's raw
/// record for caller inspection.
#[derive(Debug, Clone)]
pub struct JobStatus {
    /// Generic status, `None` when the native code has no mapping.
    pub generic: Option<GenericStatus>,
    /// The unmodified native status record.
    pub native: Value,
}

/// Raw result of an adapter-level submit.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Dry run: the assembled command line, never executed.
    Command(String),
    /// The scheduler accepted the job and assigned this ID.
    JobId(String),
}

/// Capability interface implemented by each scheduler adapter.
///
/// Adapters are pass-throughs to the external scheduler's own state: no
/// job state machine lives in-process, and every operation blocks until
/// the underlying command completes.
pub trait Scheduler: Send + Sync {
    /// Which scheduler this adapter drives.
    fn kind(&self) -> SchedulerKind;

    /// Submit a job script (or template, when rendering is requested).
    fn submit(&self, script: &Path, options: &SubmitOptions) -> BatchResult<SubmitOutcome>;

    /// Query the status of a job.
    fn status(&self, job_id: &str) -> BatchResult<JobStatus>;

    /// Hold a job, returning the command's raw output.
    fn hold(&self, job_id: &str) -> BatchResult<String>;

    /// Release a held job, returning the command's raw output.
    fn release(&self, job_id: &str) -> BatchResult<String>;

    /// Delete (cancel) a job, returning the command's raw output.
    fn delete(&self, job_id: &str) -> BatchResult<String>;

    /// List rendered job scripts currently on disk.
    fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>>;

    /// Sweep expired rendered job scripts, returning the number removed.
    fn clean_job_scripts(&self, force: bool) -> BatchResult<usize>;
}

/// Result of [`Client::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Dry run: the assembled command line, never executed.
    DryRun(String),
    /// The job was accepted; the handle has auto-update enabled.
    Submitted(Job),
}

impl Submission {
    /// The assembled command line, for dry runs.
    pub fn command(&self) -> Option<&str> {
        match self {
            Submission::DryRun(command) => Some(command),
            Submission::Submitted(_) => None,
        }
    }

    /// The job handle, for real submissions.
    pub fn job(self) -> Option<Job> {
        match self {
            Submission::DryRun(_) => None,
            Submission::Submitted(job) => Some(job),
        }
    }
}

/// Caller-facing handle over one scheduler adapter.
///
/// Cloning is cheap; clones share the adapter. Job handles minted by
/// [`submit`] and [`job`] hold only a weak reference to the adapter, so a
/// `Client` (or another owner) must stay alive for handles to operate.
///
/// [`submit`]: Client::submit
/// [`job`]: Client::job
#[derive(Clone)]
pub struct Client {
    inner: Arc<dyn Scheduler>,
}

impl Client {
    /// Wrap a scheduler adapter.
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { inner: scheduler }
    }

    /// Which scheduler this client drives.
    pub fn kind(&self) -> SchedulerKind {
        self.inner.kind()
    }

    /// Submit a job script.
    ///
    /// With `dry_run` set the assembled command string is returned and no
    /// subprocess runs; otherwise the returned handle has already fetched
    /// its first status.
    pub fn submit(
        &self,
        script: impl AsRef<Path>,
        options: SubmitOptions,
    ) -> BatchResult<Submission> {
        match self.inner.submit(script.as_ref(), &options)? {
            SubmitOutcome::Command(command) => Ok(Submission::DryRun(command)),
            SubmitOutcome::JobId(job_id) => {
                let job = Job::bind(job_id, Arc::downgrade(&self.inner), true)?;
                Ok(Submission::Submitted(job))
            }
        }
    }

    /// Query the status of a job by ID.
    pub fn status(&self, job_id: &str) -> BatchResult<JobStatus> {
        self.inner.status(job_id)
    }

    /// Whether the job is currently queued.
    pub fn is_queued(&self, job_id: &str) -> BatchResult<bool> {
        Ok(self.status(job_id)?.generic == Some(GenericStatus::Queued))
    }

    /// Whether the job is currently running.
    pub fn is_running(&self, job_id: &str) -> BatchResult<bool> {
        Ok(self.status(job_id)?.generic == Some(GenericStatus::Running))
    }

    /// Hold a job.
    pub fn hold(&self, job_id: &str) -> BatchResult<String> {
        self.inner.hold(job_id)
    }

    /// Release a held job.
    pub fn release(&self, job_id: &str) -> BatchResult<String> {
        self.inner.release(job_id)
    }

    /// Delete (cancel) a job.
    pub fn delete(&self, job_id: &str) -> BatchResult<String> {
        self.inner.delete(job_id)
    }

    /// Construct a handle for an already submitted job.
    ///
    /// With `auto_update` set the handle fetches its status immediately.
    pub fn job(&self, job_id: impl Into<String>, auto_update: bool) -> BatchResult<Job> {
        Job::bind(job_id.into(), Arc::downgrade(&self.inner), auto_update)
    }

    /// List rendered job scripts currently on disk.
    pub fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>> {
        self.inner.list_job_scripts()
    }

    /// Sweep expired rendered job scripts, returning the number removed.
    pub fn clean_job_scripts(&self, force: bool) -> BatchResult<usize> {
        self.inner.clean_job_scripts(force)
    }
}

/// Shared submit flow: render, assemble, interpolate, execute.
pub(crate) fn submit_with(
    runner: &dyn CommandRunner,
    scripts: &ScriptManager,
    commands: &CommandSet,
    directive_set: &DirectiveSet,
    script: &Path,
    options: &SubmitOptions,
) -> BatchResult<SubmitOutcome> {
    debug!("Submitting {}", script.display());

    let assembly = directives::assemble(directive_set, options, Local::now())?;

    // Feedback entries win over caller-supplied context keys.
    let mut context = options.context.clone();
    context.extend(assembly.context.clone());

    let job_script = if options.render {
        scripts.render(script, &context)?
    } else {
        script.to_path_buf()
    };

    context.insert("directives".to_string(), assembly.directive_string());
    context.insert("job_script".to_string(), job_script.display().to_string());

    let command = template::interpolate(commands.submit, &context)?;

    if options.dry_run {
        debug!("Dry run requested; returning assembled command");
        return Ok(SubmitOutcome::Command(command));
    }

    let stdout = shell::run_command(runner, &command, &assembly.env)?;
    let job_id = extract_job_id(&stdout)?;
    debug!("Scheduler accepted job {}", job_id);
    Ok(SubmitOutcome::JobId(job_id))
}

/// Interpolate a single-job command template and run it.
pub(crate) fn run_job_command(
    runner: &dyn CommandRunner,
    command_template: &str,
    job_id: &str,
) -> BatchResult<String> {
    let context = BTreeMap::from([("job_id".to_string(), job_id.to_string())]);
    let command = template::interpolate(command_template, &context)?;
    shell::run_command(runner, &command, &BTreeMap::new())
}

/// The accepted job ID is the final whitespace-separated token of the
/// submit command's stdout (`qsub` prints the ID alone, `sbatch` prints
/// `Submitted batch job <id>`).
fn extract_job_id(stdout: &str) -> BatchResult<String> {
    stdout
        .split_whitespace()
        .last()
        .map(str::to_string)
        .ok_or_else(|| {
            BatchError::ParseError("submit command produced no output to read a job ID from".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::PoisonError;

    #[test]
    fn test_extract_job_id() {
        assert_eq!(extract_job_id("132058409.gadi-pbs").unwrap(), "132058409.gadi-pbs");
        assert_eq!(extract_job_id("Submitted batch job 1234\n").unwrap(), "1234");
        assert!(extract_job_id("  \n").is_err());
    }

    #[test]
    fn test_scheduler_kind_display() {
        assert_eq!(SchedulerKind::Pbs.to_string(), "pbs");
        assert_eq!(SchedulerKind::Slurm.to_string(), "slurm");
        assert_eq!(SchedulerKind::Mock.to_string(), "mock");
    }

    #[test]
    fn test_submission_accessors() {
        let dry = Submission::DryRun("qsub test.sh".to_string());
        assert_eq!(dry.command(), Some("qsub test.sh"));
        assert!(dry.job().is_none());
    }

    /// Minimal in-memory adapter for exercising the client facade.
    struct StubScheduler {
        statuses: Mutex<Vec<Option<GenericStatus>>>,
    }

    impl StubScheduler {
        fn new(statuses: Vec<Option<GenericStatus>>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
            }
        }
    }

    impl Scheduler for StubScheduler {
        fn kind(&self) -> SchedulerKind {
            SchedulerKind::Mock
        }

        fn submit(&self, _script: &Path, options: &SubmitOptions) -> BatchResult<SubmitOutcome> {
            if options.dry_run {
                Ok(SubmitOutcome::Command("stub submit".to_string()))
            } else {
                Ok(SubmitOutcome::JobId("stub-1".to_string()))
            }
        }

        fn status(&self, job_id: &str) -> BatchResult<JobStatus> {
            let mut statuses = self
                .statuses
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let generic = statuses
                .pop()
                .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;
            Ok(JobStatus {
                generic,
                native: serde_json::json!({ "job_state": "stub" }),
            })
        }

        fn hold(&self, _job_id: &str) -> BatchResult<String> {
            Ok(String::new())
        }

        fn release(&self, _job_id: &str) -> BatchResult<String> {
            Ok(String::new())
        }

        fn delete(&self, _job_id: &str) -> BatchResult<String> {
            Ok(String::new())
        }

        fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>> {
            Ok(Vec::new())
        }

        fn clean_job_scripts(&self, _force: bool) -> BatchResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_client_submit_wraps_job_handle() {
        let client = Client::new(Arc::new(StubScheduler::new(vec![Some(
            GenericStatus::Queued,
        )])));
        let submission = client.submit("test.sh", SubmitOptions::new()).unwrap();
        let job = submission.job().unwrap();
        assert_eq!(job.id(), "stub-1");
        // Status was fetched once on construction.
        assert_eq!(job.last_status(), Some(GenericStatus::Queued));
    }

    #[test]
    fn test_client_is_queued_and_running() {
        let client = Client::new(Arc::new(StubScheduler::new(vec![
            Some(GenericStatus::Running),
            Some(GenericStatus::Queued),
        ])));
        assert!(client.is_queued("stub-1").unwrap());
        assert!(client.is_running("stub-1").unwrap());
    }

    #[test]
    fn test_client_dry_run_has_no_handle() {
        let client = Client::new(Arc::new(StubScheduler::new(Vec::new())));
        let submission = client
            .submit("test.sh", SubmitOptions::new().with_dry_run(true))
            .unwrap();
        assert_eq!(submission.command(), Some("stub submit"));
    }
}

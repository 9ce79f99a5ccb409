//! Echo-backed mock adapter for development without a scheduler.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{BatchError, BatchResult};
use crate::options::SubmitOptions;
use crate::pbs;
use crate::scheduler::{self, CommandSet, JobStatus, Scheduler, SchedulerKind, SubmitOutcome};
use crate::script::ScriptManager;
use crate::shell::{CommandRunner, SystemRunner};
use crate::status::{MatchOn, StatusCatalog};

/// Every command is an `echo`, so submissions run end to end with nothing
/// installed. The submit echo reflects the script path back as the final
/// stdout token, which therefore becomes the job ID; status always reports
/// queued.
const COMMANDS: CommandSet = CommandSet {
    submit: "echo{directives} {job_script}",
    status: "echo Q",
    delete: "echo Deleted {job_id}",
    hold: "echo Held {job_id}",
    release: "echo Released {job_id}",
};

/// Adapter that fakes a scheduler with `echo`.
///
/// Intended for development mode and tests: submissions, holds, releases
/// and deletions all succeed, scripts are rendered and swept for real, and
/// directives are assembled PBS-style so dry runs show realistic flags.
pub struct MockAdapter {
    runner: Box<dyn CommandRunner>,
    scripts: ScriptManager,
    catalog: StatusCatalog,
}

impl MockAdapter {
    /// Create an adapter with default configuration.
    pub fn new() -> BatchResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create an adapter with the given configuration.
    pub fn with_config(config: ClientConfig) -> BatchResult<Self> {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    /// Create an adapter with a custom command runner.
    pub fn with_runner(
        config: ClientConfig,
        runner: Box<dyn CommandRunner>,
    ) -> BatchResult<Self> {
        Ok(Self {
            runner,
            scripts: ScriptManager::new(&config),
            catalog: StatusCatalog::new(pbs::templates::STATUSES, MatchOn::Short)?,
        })
    }
}

impl Scheduler for MockAdapter {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Mock
    }

    fn submit(&self, script: &Path, options: &SubmitOptions) -> BatchResult<SubmitOutcome> {
        scheduler::submit_with(
            &*self.runner,
            &self.scripts,
            &COMMANDS,
            &pbs::templates::DIRECTIVES,
            script,
            options,
        )
    }

    fn status(&self, job_id: &str) -> BatchResult<JobStatus> {
        let stdout = scheduler::run_job_command(&*self.runner, COMMANDS.status, job_id)?;
        let code = stdout
            .split_whitespace()
            .next()
            .ok_or_else(|| BatchError::ParseError("mock status echoed nothing".to_string()))?;
        let generic = self.catalog.translate(code);
        debug!("Job {} state {} translates to {:?}", job_id, code, generic);
        Ok(JobStatus {
            generic,
            native: serde_json::json!({ "job_state": code }),
        })
    }

    fn hold(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, COMMANDS.hold, job_id)
    }

    fn release(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, COMMANDS.release, job_id)
    }

    fn delete(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, COMMANDS.delete, job_id)
    }

    fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>> {
        self.scripts.list()
    }

    fn clean_job_scripts(&self, force: bool) -> BatchResult<usize> {
        self.scripts.sweep(force)
    }
}

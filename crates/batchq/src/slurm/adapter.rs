//! Slurm adapter: job control through sbatch, squeue, scancel and scontrol.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::BatchResult;
use crate::options::SubmitOptions;
use crate::scheduler::{self, JobStatus, Scheduler, SchedulerKind, SubmitOutcome};
use crate::script::ScriptManager;
use crate::shell::{CommandRunner, SystemRunner};
use crate::slurm::{parser, templates};
use crate::status::{MatchOn, StatusCatalog};

/// Adapter for Slurm schedulers.
///
/// Slurm reports long-form state names through `squeue --json`, one record
/// per job. Job environment variables are passed as an overlay on the
/// `sbatch` subprocess environment rather than as a directive.
pub struct SlurmAdapter {
    runner: Box<dyn CommandRunner>,
    scripts: ScriptManager,
    catalog: StatusCatalog,
}

impl SlurmAdapter {
    /// Create an adapter with default configuration.
    pub fn new() -> BatchResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create an adapter with the given configuration.
    pub fn with_config(config: ClientConfig) -> BatchResult<Self> {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    /// Create an adapter with a custom command runner, so tests can verify
    /// command composition without a scheduler installed.
    pub fn with_runner(
        config: ClientConfig,
        runner: Box<dyn CommandRunner>,
    ) -> BatchResult<Self> {
        Ok(Self {
            runner,
            scripts: ScriptManager::new(&config),
            catalog: StatusCatalog::new(templates::STATUSES, MatchOn::Long)?,
        })
    }
}

impl Scheduler for SlurmAdapter {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Slurm
    }

    fn submit(&self, script: &Path, options: &SubmitOptions) -> BatchResult<SubmitOutcome> {
        scheduler::submit_with(
            &*self.runner,
            &self.scripts,
            &templates::COMMANDS,
            &templates::DIRECTIVES,
            script,
            options,
        )
    }

    fn status(&self, job_id: &str) -> BatchResult<JobStatus> {
        let stdout =
            scheduler::run_job_command(&*self.runner, templates::COMMANDS.status, job_id)?;
        let (code, native) = parser::parse_status(&stdout, job_id)?;
        let generic = self.catalog.translate(&code);
        debug!("Job {} state {} translates to {:?}", job_id, code, generic);
        Ok(JobStatus { generic, native })
    }

    fn hold(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, templates::COMMANDS.hold, job_id)
    }

    fn release(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, templates::COMMANDS.release, job_id)
    }

    fn delete(&self, job_id: &str) -> BatchResult<String> {
        scheduler::run_job_command(&*self.runner, templates::COMMANDS.delete, job_id)
    }

    fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>> {
        self.scripts.list()
    }

    fn clean_job_scripts(&self, force: bool) -> BatchResult<usize> {
        self.scripts.sweep(force)
    }
}

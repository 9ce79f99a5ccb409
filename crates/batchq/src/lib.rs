//! Uniform client interface to HPC batch schedulers
//!
//! This crate wraps PBS-style and Slurm-style schedulers behind one API, so
//! code that submits and tracks batch jobs does not change when it moves
//! between clusters.
//!
//! # Overview
//!
//! A [`Client`] drives one scheduler adapter through its native commands:
//! 1. **Submission**: assemble directives from structured options, render
//!    job scripts from templates, run the submit command
//! 2. **Tracking**: query status and translate native codes into a generic
//!    vocabulary
//! 3. **Control**: hold, release and delete jobs
//! 4. **Housekeeping**: list and sweep rendered job scripts
//!
//! # Supported Schedulers
//!
//! | Scheduler | Commands | Detection probe |
//! |-----------|----------|-----------------|
//! | PBS Pro / OpenPBS / Torque | qsub, qstat, qdel, qhold, qrls | `which qsub` |
//! | Slurm | sbatch, squeue, scancel, scontrol | `which sbatch` |
//! | Mock (dev mode) | echo | `which ls`, gated by `BATCHQ_DEV_MODE=1` |
//!
//! Every operation runs the scheduler command synchronously and returns
//! when it exits; the scheduler itself remains the source of truth for job
//! state.
//!
//! # Example: Submit and Track
//!
//! ```ignore
//! use batchq::{get_client, SubmitOptions};
//! use chrono::Duration;
//!
//! fn main() -> batchq::BatchResult<()> {
//!     // Detect the installed scheduler (PBS or Slurm)
//!     let client = get_client()?;
//!
//!     let options = SubmitOptions::new()
//!         .with_queue("express")
//!         .with_walltime(Duration::hours(10))
//!         .with_variable("run_id", 42);
//!
//!     let mut job = client.submit("run.sh", options)?.job().unwrap();
//!     println!("Submitted {}", job.id());
//!
//!     while !job.is_finished() {
//!         std::thread::sleep(std::time::Duration::from_secs(30));
//!         job.status()?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Example: Templated Job Scripts
//!
//! ```ignore
//! use batchq::{get_client, SubmitOptions};
//!
//! // run.sh.j2 contains: ./model --steps {{steps}} --queue {{queue}}
//! let options = SubmitOptions::new()
//!     .with_render(true)
//!     .with_queue("normal")
//!     .with_context("steps", "1000");
//!
//! // The rendered copy lands in the script directory with a random
//! // suffix; the submit command references the rendered path.
//! let job = client.submit("run.sh.j2", options)?;
//! ```
//!
//! # Example: Dry Runs
//!
//! ```ignore
//! use batchq::{get_client, SubmitOptions};
//!
//! let submission = client.submit(
//!     "test.sh",
//!     SubmitOptions::new().with_queue("express").with_dry_run(true),
//! )?;
//! assert_eq!(submission.command(), Some("qsub -q express test.sh"));
//! ```

pub mod config;
mod directives;
pub mod error;
pub mod factory;
pub mod job;
pub mod mock;
pub mod options;
pub mod pbs;
pub mod scheduler;
pub mod script;
pub mod shell;
pub mod slurm;
pub mod status;
mod template;

// Re-exports
pub use config::{ClientConfig, SCRIPT_DIR_ENV};
pub use error::{BatchError, BatchResult};
pub use factory::{DEV_MODE_ENV, detect, get_client, get_client_with};
pub use job::Job;
pub use mock::MockAdapter;
pub use options::{Delay, SubmitOptions};
pub use pbs::PbsAdapter;
pub use scheduler::{
    Client, JobStatus, Scheduler, SchedulerKind, Submission, SubmitOutcome,
};
pub use script::ScriptManager;
pub use shell::{CommandOutput, CommandRunner, ScriptedRunner, SystemRunner};
pub use slurm::SlurmAdapter;
pub use status::{GenericStatus, MatchOn, StatusCatalog, StatusCode};

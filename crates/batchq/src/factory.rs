//! Scheduler auto-detection.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{BatchError, BatchResult};
use crate::mock::MockAdapter;
use crate::pbs::PbsAdapter;
use crate::scheduler::Client;
use crate::shell::{CommandRunner, SystemRunner};
use crate::slurm::SlurmAdapter;

/// Environment variable enabling the echo-backed mock adapter. Detection
/// considers the mock only when this is set to `1`.
pub const DEV_MODE_ENV: &str = "BATCHQ_DEV_MODE";

/// Detect the installed scheduler and return a client for it.
///
/// Probes for scheduler commands with `which`, in a fixed order: `ls`
/// (mock, dev mode only), then `qsub` (PBS), then `sbatch` (Slurm). The
/// first hit wins.
pub fn get_client() -> BatchResult<Client> {
    get_client_with(ClientConfig::default())
}

/// Detect the installed scheduler and return a client with the given
/// configuration.
pub fn get_client_with(config: ClientConfig) -> BatchResult<Client> {
    let dev_mode = std::env::var(DEV_MODE_ENV).is_ok_and(|value| value == "1");
    detect(&SystemRunner, dev_mode, config)
}

/// Detection with an explicit probe runner and dev flag.
/// [`get_client_with`] calls this with the system runner and the
/// environment-controlled flag; tests script the probes instead.
pub fn detect(
    runner: &dyn CommandRunner,
    dev_mode: bool,
    config: ClientConfig,
) -> BatchResult<Client> {
    if dev_mode && command_exists(runner, "ls")? {
        debug!("Dev mode enabled; using the mock adapter");
        return Ok(Client::new(Arc::new(MockAdapter::with_config(config)?)));
    }
    if command_exists(runner, "qsub")? {
        debug!("Detected PBS (qsub found)");
        return Ok(Client::new(Arc::new(PbsAdapter::with_config(config)?)));
    }
    if command_exists(runner, "sbatch")? {
        debug!("Detected Slurm (sbatch found)");
        return Ok(Client::new(Arc::new(SlurmAdapter::with_config(config)?)));
    }
    Err(BatchError::NoSchedulerDetected)
}

/// Whether `which` resolves the command. A nonzero exit is a clean miss;
/// failing to spawn `which` itself is an error.
fn command_exists(runner: &dyn CommandRunner, command: &str) -> BatchResult<bool> {
    let argv = vec!["which".to_string(), command.to_string()];
    let output = runner.run(&argv, &std::collections::BTreeMap::new())?;
    Ok(output.success())
}

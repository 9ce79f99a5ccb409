//! Parser for PBS qstat JSON output.

use serde_json::Value;

use crate::error::{BatchError, BatchResult};

/// Extract one job's native record and short state code from
/// `qstat -f -F json` output.
///
/// Relevant output shape:
/// ```text
/// {
///     "timestamp": 1722000000,
///     "pbs_version": "2021.1.3",
///     "Jobs": {
///         "132058409.gadi-pbs": {
///             "Job_Name": "test",
///             "job_state": "Q",
///             "queue": "normal-exec"
///         }
///     }
/// }
/// ```
///
/// The record is keyed by the full job ID. A present `Jobs` object without
/// the requested ID means the scheduler no longer knows the job.
pub(crate) fn parse_status(raw: &str, job_id: &str) -> BatchResult<(String, Value)> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| BatchError::ParseError(format!("qstat output is not valid JSON: {e}")))?;

    let jobs = parsed
        .get("Jobs")
        .and_then(Value::as_object)
        .ok_or_else(|| BatchError::ParseError("qstat output has no Jobs object".to_string()))?;

    let native = jobs
        .get(job_id)
        .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;

    let state = native
        .get("job_state")
        .and_then(Value::as_str)
        .ok_or_else(|| BatchError::ParseError(format!("job {job_id} record has no job_state")))?;

    Ok((state.to_string(), native.clone()))
}

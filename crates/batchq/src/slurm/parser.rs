//! Parser for Slurm squeue JSON output.

use serde_json::Value;

use crate::error::{BatchError, BatchResult};

/// Extract one job's native record and long state code from
/// `squeue -j <id> --json` output.
///
/// Relevant output shape:
/// ```text
/// {
///     "meta": { "slurm": { "version": { "major": 23 } } },
///     "jobs": [
///         {
///             "job_id": 1234,
///             "name": "test",
///             "job_state": ["PENDING"],
///             "partition": "main"
///         }
///     ]
/// }
/// ```
///
/// The query names a single job, so the first array element is the record;
/// `job_state` is an array and its first element carries the state. An
/// empty `jobs` array means the scheduler no longer knows the job.
pub(crate) fn parse_status(raw: &str, job_id: &str) -> BatchResult<(String, Value)> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| BatchError::ParseError(format!("squeue output is not valid JSON: {e}")))?;

    let jobs = parsed
        .get("jobs")
        .and_then(Value::as_array)
        .ok_or_else(|| BatchError::ParseError("squeue output has no jobs array".to_string()))?;

    let native = jobs
        .first()
        .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;

    let state = native
        .get("job_state")
        .and_then(Value::as_array)
        .and_then(|states| states.first())
        .and_then(Value::as_str)
        .ok_or_else(|| BatchError::ParseError(format!("job {job_id} record has no job_state")))?;

    Ok((state.to_string(), native.clone()))
}

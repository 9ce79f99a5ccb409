//! Error handling for batch scheduler operations.

use thiserror::Error;

/// Result type for scheduler operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that can occur while talking to a batch scheduler.
#[derive(Error, Debug)]
pub enum BatchError {
    /// No recognizable scheduler binary was found on the host.
    #[error("unable to detect a scheduler: no control binary found on this host")]
    NoSchedulerDetected,

    /// A scheduler command exited with a nonzero status.
    #[error("command failed with exit code {exit_code}: {command} - {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Template placeholders remained unresolved after rendering.
    #[error("undefined template variables: {}", names.join(", "))]
    UndefinedVariable { names: Vec<String> },

    /// A submission option was malformed or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Job not found in the scheduler's status response.
    #[error("job not found: {0}")]
    NotFound(String),

    /// Scheduler response could not be parsed.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Two status records in one catalog share a native code.
    #[error("duplicate status code in catalog: {code}")]
    DuplicateStatusCode { code: String },

    /// The adapter behind a job handle has been dropped.
    #[error("scheduler adapter is no longer available for this job handle")]
    SchedulerDropped,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BatchError::NotFound("132058409.gadi-pbs".to_string());
        assert_eq!(err.to_string(), "job not found: 132058409.gadi-pbs");

        let err = BatchError::CommandFailed {
            command: "qstat -f -F json 1".to_string(),
            exit_code: 153,
            stderr: "qstat: Unknown Job Id 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command failed with exit code 153: qstat -f -F json 1 - qstat: Unknown Job Id 1"
        );

        let err = BatchError::UndefinedVariable {
            names: vec!["ncpus".to_string(), "mem".to_string()],
        };
        assert_eq!(err.to_string(), "undefined template variables: ncpus, mem");

        let err = BatchError::DuplicateStatusCode {
            code: "Q".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate status code in catalog: Q");
    }
}

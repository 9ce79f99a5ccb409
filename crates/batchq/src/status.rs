//! Scheduler-agnostic status vocabulary and per-scheduler code catalogs.

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, BatchResult};

/// Generic job status, independent of any particular scheduler.
///
/// Every variant carries a stable one-letter code (the PBS short codes,
/// reused as the cross-scheduler vocabulary) available via [`code`].
///
/// [`code`]: GenericStatus::code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericStatus {
    /// Job is waiting in the queue.
    Queued,
    /// Job is running.
    Running,
    /// Job is held.
    Held,
    /// Job is suspended.
    Suspended,
    /// Job is exiting after having run.
    Exiting,
    /// Job is finished.
    Finished,
    /// Job was moved to another server.
    Moved,
    /// Job is being moved to a new location.
    Moving,
    /// Job is waiting for its submitter-assigned start time.
    Waiting,
    /// Array job has at least one running subjob.
    HasSubjob,
    /// Subjob has completed execution or has been deleted.
    SubjobCompleted,
    /// Cycle-harvesting job is suspended due to keyboard activity.
    CycleHarvesting,
}

impl GenericStatus {
    /// One-letter wire code for this status.
    pub fn code(&self) -> &'static str {
        match self {
            GenericStatus::Queued => "Q",
            GenericStatus::Running => "R",
            GenericStatus::Held => "H",
            GenericStatus::Suspended => "S",
            GenericStatus::Exiting => "E",
            GenericStatus::Finished => "F",
            GenericStatus::Moved => "M",
            GenericStatus::Moving => "T",
            GenericStatus::Waiting => "W",
            GenericStatus::HasSubjob => "B",
            GenericStatus::SubjobCompleted => "X",
            GenericStatus::CycleHarvesting => "U",
        }
    }

    /// Whether the job has left the scheduler for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenericStatus::Finished | GenericStatus::SubjobCompleted)
    }
}

impl std::fmt::Display for GenericStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One native status code as reported by a scheduler.
#[derive(Debug, Clone, Copy)]
pub struct StatusCode {
    /// Short-form native code (e.g. PBS `Q`, Slurm `PD`).
    pub short: &'static str,
    /// Long-form native code where the scheduler has one (e.g. `PENDING`).
    pub long: Option<&'static str>,
    /// Human-readable description from the scheduler's documentation.
    pub description: &'static str,
    /// Mapped generic status, if this code has an equivalent.
    pub generic: Option<GenericStatus>,
}

/// Which native attribute a catalog matches raw codes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOn {
    /// Match the short code (PBS `qstat` reports single letters).
    Short,
    /// Match the long code (Slurm `squeue --json` reports long forms).
    Long,
}

/// Ordered, immutable table of native status codes for one scheduler.
///
/// Lookup scans in declaration order and returns the first record whose
/// matched attribute equals the raw code. Codes must be unique per catalog;
/// construction fails on a duplicate rather than letting a later record
/// shadow an earlier one.
#[derive(Debug, Clone, Copy)]
pub struct StatusCatalog {
    codes: &'static [StatusCode],
    match_on: MatchOn,
}

impl StatusCatalog {
    /// Build a catalog over a static code table, validating uniqueness of
    /// every short code and every present long code.
    pub fn new(codes: &'static [StatusCode], match_on: MatchOn) -> BatchResult<Self> {
        let mut shorts: Vec<&str> = Vec::with_capacity(codes.len());
        let mut longs: Vec<&str> = Vec::with_capacity(codes.len());

        for code in codes {
            if shorts.contains(&code.short) {
                return Err(BatchError::DuplicateStatusCode {
                    code: code.short.to_string(),
                });
            }
            shorts.push(code.short);

            if let Some(long) = code.long {
                if longs.contains(&long) {
                    return Err(BatchError::DuplicateStatusCode {
                        code: long.to_string(),
                    });
                }
                longs.push(long);
            }
        }

        Ok(Self { codes, match_on })
    }

    /// Find the first record matching a raw native code.
    pub fn find(&self, native: &str) -> Option<&StatusCode> {
        self.codes.iter().find(|code| match self.match_on {
            MatchOn::Short => code.short == native,
            MatchOn::Long => code.long == Some(native),
        })
    }

    /// Translate a raw native code into a generic status.
    ///
    /// Returns `None` when the code is unknown to the catalog or known but
    /// deliberately unmapped.
    pub fn translate(&self, native: &str) -> Option<GenericStatus> {
        self.find(native).and_then(|code| code.generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: &[StatusCode] = &[
        StatusCode {
            short: "Q",
            long: Some("QUEUED"),
            description: "Job is queued",
            generic: Some(GenericStatus::Queued),
        },
        StatusCode {
            short: "R",
            long: Some("RUNNING"),
            description: "Job is running",
            generic: Some(GenericStatus::Running),
        },
        StatusCode {
            short: "Z",
            long: Some("ZOMBIE"),
            description: "No generic equivalent",
            generic: None,
        },
    ];

    #[test]
    fn test_translate_short() {
        let catalog = StatusCatalog::new(CODES, MatchOn::Short).unwrap();
        assert_eq!(catalog.translate("Q"), Some(GenericStatus::Queued));
        assert_eq!(catalog.translate("R"), Some(GenericStatus::Running));
        assert_eq!(catalog.translate("QUEUED"), None);
    }

    #[test]
    fn test_translate_long() {
        let catalog = StatusCatalog::new(CODES, MatchOn::Long).unwrap();
        assert_eq!(catalog.translate("QUEUED"), Some(GenericStatus::Queued));
        assert_eq!(catalog.translate("Q"), None);
    }

    #[test]
    fn test_unknown_and_unmapped_codes() {
        let catalog = StatusCatalog::new(CODES, MatchOn::Short).unwrap();
        assert_eq!(catalog.translate("??"), None);
        assert_eq!(catalog.translate("Z"), None);
        assert!(catalog.find("Z").is_some());
    }

    #[test]
    fn test_duplicate_short_code_rejected() {
        const DUP: &[StatusCode] = &[
            StatusCode {
                short: "Q",
                long: None,
                description: "first",
                generic: Some(GenericStatus::Queued),
            },
            StatusCode {
                short: "Q",
                long: None,
                description: "second",
                generic: Some(GenericStatus::Running),
            },
        ];
        let err = StatusCatalog::new(DUP, MatchOn::Short).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateStatusCode { code } if code == "Q"));
    }

    #[test]
    fn test_duplicate_long_code_rejected() {
        const DUP: &[StatusCode] = &[
            StatusCode {
                short: "PD",
                long: Some("PENDING"),
                description: "first",
                generic: Some(GenericStatus::Queued),
            },
            StatusCode {
                short: "PG",
                long: Some("PENDING"),
                description: "second",
                generic: None,
            },
        ];
        let err = StatusCatalog::new(DUP, MatchOn::Long).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateStatusCode { code } if code == "PENDING"));
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(GenericStatus::Queued.code(), "Q");
        assert_eq!(GenericStatus::Running.code(), "R");
        assert_eq!(GenericStatus::Held.code(), "H");
        assert_eq!(GenericStatus::CycleHarvesting.code(), "U");
        assert_eq!(GenericStatus::Queued.to_string(), "Q");
    }

    #[test]
    fn test_terminal_states() {
        assert!(GenericStatus::Finished.is_terminal());
        assert!(GenericStatus::SubjobCompleted.is_terminal());
        assert!(!GenericStatus::Running.is_terminal());
        assert!(!GenericStatus::Held.is_terminal());
    }
}

//! Command, directive, and status tables for PBS.

use crate::directives::{DirectiveSet, VariableStyle, WalltimeStyle};
use crate::scheduler::CommandSet;
use crate::status::{GenericStatus, StatusCode};

pub(crate) const COMMANDS: CommandSet = CommandSet {
    submit: "qsub{directives} {job_script}",
    status: "qstat -f -F json {job_id}",
    delete: "qdel {job_id}",
    hold: "qhold {job_id}",
    release: "qrls {job_id}",
};

pub(crate) const DIRECTIVES: DirectiveSet = DirectiveSet {
    depends_on: "-W depend=afterok:{depends_on_str}",
    delay: "-a {delay_str}",
    queue: "-q {queue}",
    walltime: "-l walltime={walltime_str}",
    storage: Some("-l storage={storage_str}"),
    delay_fmt: "%Y%m%d%H%M.%S",
    walltime_style: WalltimeStyle::Clock,
    variable_style: VariableStyle::Directive,
};

/// PBS job states, per the PBS Professional reference guide. PBS reports
/// single-letter codes only, and every code has a generic translation.
pub(crate) const STATUSES: &[StatusCode] = &[
    StatusCode {
        short: "B",
        long: None,
        description: "Array job has at least one subjob running",
        generic: Some(GenericStatus::HasSubjob),
    },
    StatusCode {
        short: "E",
        long: None,
        description: "Job is exiting after having run",
        generic: Some(GenericStatus::Exiting),
    },
    StatusCode {
        short: "F",
        long: None,
        description: "Job is finished",
        generic: Some(GenericStatus::Finished),
    },
    StatusCode {
        short: "H",
        long: None,
        description: "Job is held",
        generic: Some(GenericStatus::Held),
    },
    StatusCode {
        short: "M",
        long: None,
        description: "Job was moved to another server",
        generic: Some(GenericStatus::Moved),
    },
    StatusCode {
        short: "Q",
        long: None,
        description: "Job is queued",
        generic: Some(GenericStatus::Queued),
    },
    StatusCode {
        short: "R",
        long: None,
        description: "Job is running",
        generic: Some(GenericStatus::Running),
    },
    StatusCode {
        short: "S",
        long: None,
        description: "Job is suspended",
        generic: Some(GenericStatus::Suspended),
    },
    StatusCode {
        short: "T",
        long: None,
        description: "Job is being moved to new location",
        generic: Some(GenericStatus::Moving),
    },
    StatusCode {
        short: "U",
        long: None,
        description: "Cycle-harvesting job is suspended due to keyboard activity",
        generic: Some(GenericStatus::CycleHarvesting),
    },
    StatusCode {
        short: "W",
        long: None,
        description: "Job is waiting for its submitter-assigned start time to be reached",
        generic: Some(GenericStatus::Waiting),
    },
    StatusCode {
        short: "X",
        long: None,
        description: "Subjob has completed execution or has been deleted",
        generic: Some(GenericStatus::SubjobCompleted),
    },
];

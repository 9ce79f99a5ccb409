//! Command, directive, and status tables for Slurm.

use crate::directives::{DirectiveSet, VariableStyle, WalltimeStyle};
use crate::scheduler::CommandSet;
use crate::status::{GenericStatus, StatusCode};

pub(crate) const COMMANDS: CommandSet = CommandSet {
    submit: "sbatch{directives} {job_script}",
    status: "squeue -j {job_id} --json",
    delete: "scancel {job_id}",
    hold: "scontrol hold {job_id}",
    release: "scontrol release {job_id}",
};

pub(crate) const DIRECTIVES: DirectiveSet = DirectiveSet {
    depends_on: "--dependency=afterok:{depends_on_str}",
    delay: "--begin={delay_str}",
    queue: "-p {queue}",
    walltime: "--time {walltime_str}",
    storage: None,
    delay_fmt: "%Y-%m-%dT%H:%M:%S",
    walltime_style: WalltimeStyle::Minutes,
    variable_style: VariableStyle::Environment,
};

/// Slurm job states, per the squeue manual. `squeue --json` reports the
/// long form. Only the four states with a clear cross-scheduler meaning
/// carry a generic translation; the rest surface as native-only.
pub(crate) const STATUSES: &[StatusCode] = &[
    StatusCode {
        short: "BF",
        long: Some("BOOT_FAIL"),
        description: "Job terminated due to launch failure, typically due to a hardware failure (e.g. unable to boot the node or block and the job can not be requeued).",
        generic: None,
    },
    StatusCode {
        short: "CA",
        long: Some("CANCELLED"),
        description: "Job was explicitly cancelled by the user or system administrator.  The job may or may not have been initiated.",
        generic: None,
    },
    StatusCode {
        short: "CD",
        long: Some("COMPLETED"),
        description: "Job has terminated all processes on all nodes with an exit code of zero.",
        generic: Some(GenericStatus::Finished),
    },
    StatusCode {
        short: "CF",
        long: Some("CONFIGURING"),
        description: "Job has been allocated resources, but are waiting for them to become ready for use (e.g. booting).",
        generic: None,
    },
    StatusCode {
        short: "CG",
        long: Some("COMPLETING"),
        description: "Job is in the process of completing. Some processes on some nodes may still be active.",
        generic: None,
    },
    StatusCode {
        short: "DL",
        long: Some("DEADLINE"),
        description: "Job terminated on deadline.",
        generic: None,
    },
    StatusCode {
        short: "F",
        long: Some("FAILED"),
        description: "Job terminated with non-zero exit code or other failure condition.",
        generic: None,
    },
    StatusCode {
        short: "NF",
        long: Some("NODE_FAIL"),
        description: "Job terminated due to failure of one or more allocated nodes.",
        generic: None,
    },
    StatusCode {
        short: "OOM",
        long: Some("OUT_OF_MEMORY"),
        description: "Job experienced out of memory error.",
        generic: None,
    },
    StatusCode {
        short: "PD",
        long: Some("PENDING"),
        description: "Job is awaiting resource allocation.",
        generic: Some(GenericStatus::Queued),
    },
    StatusCode {
        short: "PR",
        long: Some("PREEMPTED"),
        description: "Job terminated due to preemption.",
        generic: None,
    },
    StatusCode {
        short: "R",
        long: Some("RUNNING"),
        description: "Job currently has an allocation.",
        generic: Some(GenericStatus::Running),
    },
    StatusCode {
        short: "RD",
        long: Some("RESV_DEL_HOLD"),
        description: "Job is being held after requested reservation was deleted.",
        generic: None,
    },
    StatusCode {
        short: "RF",
        long: Some("REQUEUE_FED"),
        description: "Job is being requeued by a federation.",
        generic: None,
    },
    StatusCode {
        short: "RH",
        long: Some("REQUEUE_HOLD"),
        description: "Held job is being requeued.",
        generic: None,
    },
    StatusCode {
        short: "RQ",
        long: Some("REQUEUED"),
        description: "Completing job is being requeued.",
        generic: None,
    },
    StatusCode {
        short: "RS",
        long: Some("RESIZING"),
        description: "Job is about to change size.",
        generic: None,
    },
    StatusCode {
        short: "RV",
        long: Some("REVOKED"),
        description: "Sibling was removed from cluster due to other cluster starting the job.",
        generic: None,
    },
    StatusCode {
        short: "SI",
        long: Some("SIGNALING"),
        description: "Job is being signaled.",
        generic: None,
    },
    StatusCode {
        short: "SE",
        long: Some("SPECIAL_EXIT"),
        description: "The job was requeued in a special state. This state can be set by users, typically in EpilogSlurmctld, if the job has terminated with a particular exit value.",
        generic: None,
    },
    StatusCode {
        short: "SO",
        long: Some("STAGE_OUT"),
        description: "Job is staging out files.",
        generic: None,
    },
    StatusCode {
        short: "ST",
        long: Some("STOPPED"),
        description: "Job has an allocation, but execution has been stopped with SIGSTOP signal.  CPUS have been retained by this job.",
        generic: None,
    },
    StatusCode {
        short: "S",
        long: Some("SUSPENDED"),
        description: "Job has an allocation, but execution has been suspended and CPUs have been released for other jobs.",
        generic: Some(GenericStatus::Suspended),
    },
    StatusCode {
        short: "TO",
        long: Some("TIMEOUT"),
        description: "Job terminated upon reaching its time limit.",
        generic: None,
    },
];

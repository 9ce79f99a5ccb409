//! PBS (Portable Batch System) scheduler support.
//!
//! Covers PBS Pro, OpenPBS and Torque variants. The adapter mirrors the
//! Slurm adapter's interface so callers can switch schedulers without
//! changing submission code.

mod adapter;
mod parser;
pub(crate) mod templates;

pub use adapter::PbsAdapter;

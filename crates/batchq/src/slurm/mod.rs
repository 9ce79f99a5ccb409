//! Slurm scheduler support.
//!
//! The adapter mirrors the PBS adapter's interface so callers can switch
//! schedulers without changing submission code.

mod adapter;
mod parser;
pub(crate) mod templates;

pub use adapter::SlurmAdapter;

//! Directive assembly: structured submission options into scheduler-native
//! command-line flags.
//!
//! Each scheduler contributes a [`DirectiveSet`] of flag templates and
//! rendering rules; [`assemble`] applies them in a fixed order (caller
//! passthrough, dependency, delay, queue, walltime, storage, variables) so
//! assembled commands are deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local};
use serde_json::Value;
use tracing::debug;

use crate::error::{BatchError, BatchResult};
use crate::options::{SubmitOptions, scalar_to_string};
use crate::template;

/// How a scheduler renders a walltime duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalltimeStyle {
    /// `H:MM:SS` with unpadded hours (PBS).
    Clock,
    /// Integer total minutes, rounded down (Slurm).
    Minutes,
}

/// How a scheduler receives job environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VariableStyle {
    /// A single `-v k1=v1,k2=v2` directive (PBS).
    Directive,
    /// An overlay on the submit subprocess environment (Slurm).
    Environment,
}

/// Directive templates and rendering rules for one scheduler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DirectiveSet {
    pub depends_on: &'static str,
    pub delay: &'static str,
    pub queue: &'static str,
    pub walltime: &'static str,
    /// `None` when the scheduler has no storage directive.
    pub storage: Option<&'static str>,
    /// strftime pattern for the delay timestamp.
    pub delay_fmt: &'static str,
    pub walltime_style: WalltimeStyle,
    pub variable_style: VariableStyle,
}

/// Product of directive assembly.
#[derive(Debug, Default)]
pub(crate) struct Assembly {
    /// Directive tokens in final order, caller passthrough first.
    pub directives: Vec<String>,
    /// Context entries fed back into command and job-script interpolation.
    pub context: BTreeMap<String, String>,
    /// Environment overlay for the submit subprocess.
    pub env: BTreeMap<String, String>,
}

impl Assembly {
    /// Render the directive list for the submit command template: a single
    /// leading space plus space-joined tokens, or nothing at all.
    pub fn directive_string(&self) -> String {
        if self.directives.is_empty() {
            String::new()
        } else {
            format!(" {}", self.directives.join(" "))
        }
    }
}

/// Assemble the directive list for one submit call.
pub(crate) fn assemble(
    set: &DirectiveSet,
    options: &SubmitOptions,
    now: DateTime<Local>,
) -> BatchResult<Assembly> {
    let mut assembly = Assembly {
        directives: options.directives.clone(),
        ..Assembly::default()
    };

    if !options.depends_on.is_empty() {
        let ids: Vec<&str> = options
            .depends_on
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(BatchError::InvalidArgument(
                "dependency list is empty after normalization".to_string(),
            ));
        }
        debug!("Job dependency specified: {}", ids.join(":"));
        let ctx = single("depends_on_str", ids.join(":"));
        assembly
            .directives
            .push(template::interpolate(set.depends_on, &ctx)?);
    }

    if let Some(delay) = &options.delay {
        let resolved = delay.resolve(now)?;
        let delay_str = resolved.format(set.delay_fmt).to_string();
        debug!("Delay specified: {}", delay_str);
        let ctx = single("delay_str", delay_str);
        assembly
            .directives
            .push(template::interpolate(set.delay, &ctx)?);
    }

    if let Some(queue) = &options.queue {
        let ctx = single("queue", queue.clone());
        assembly
            .directives
            .push(template::interpolate(set.queue, &ctx)?);
        assembly.context.insert("queue".to_string(), queue.clone());
    }

    if let Some(walltime) = options.walltime {
        let walltime_str = render_walltime(walltime, set.walltime_style)?;
        let ctx = single("walltime_str", walltime_str.clone());
        assembly
            .directives
            .push(template::interpolate(set.walltime, &ctx)?);
        assembly
            .context
            .insert("walltime_str".to_string(), walltime_str);
    }

    if !options.storage.is_empty() {
        let Some(storage_template) = set.storage else {
            return Err(BatchError::InvalidArgument(
                "storage mounts are not supported by this scheduler".to_string(),
            ));
        };
        let storage_str = options.storage.join("+");
        let ctx = single("storage_str", storage_str.clone());
        assembly
            .directives
            .push(template::interpolate(storage_template, &ctx)?);
        assembly
            .context
            .insert("storage_str".to_string(), storage_str);
    }

    if !options.variables.is_empty() {
        match set.variable_style {
            VariableStyle::Directive => {
                assembly
                    .directives
                    .push(render_variables_directive(&options.variables)?);
            }
            VariableStyle::Environment => {
                for (key, value) in &options.variables {
                    assembly.env.insert(key.clone(), scalar_to_string(value)?);
                }
            }
        }
    }

    Ok(assembly)
}

/// Render a walltime duration in the scheduler's format.
fn render_walltime(walltime: Duration, style: WalltimeStyle) -> BatchResult<String> {
    let seconds = walltime.num_seconds();
    if seconds <= 0 {
        return Err(BatchError::InvalidArgument(
            "walltime must be positive".to_string(),
        ));
    }
    Ok(match style {
        WalltimeStyle::Clock => format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        ),
        WalltimeStyle::Minutes => (seconds / 60).to_string(),
    })
}

/// Render the PBS-style `-v` directive, quoting values with whitespace.
fn render_variables_directive(variables: &BTreeMap<String, Value>) -> BatchResult<String> {
    let mut formatted = Vec::with_capacity(variables.len());
    for (key, value) in variables {
        let value = scalar_to_string(value)?;
        if value.contains(char::is_whitespace) {
            formatted.push(format!("\"{}={}\"", key, shell_quote(&value)));
        } else {
            formatted.push(format!("{key}={value}"));
        }
    }
    Ok(format!("-v {}", formatted.join(",")))
}

/// POSIX single-quote a value, escaping embedded single quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// One-entry interpolation context.
fn single(key: &str, value: String) -> BTreeMap<String, String> {
    BTreeMap::from([(key.to_string(), value)])
}

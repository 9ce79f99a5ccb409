//! Client configuration.

use std::path::PathBuf;

use chrono::Duration;

/// Environment variable overriding the rendered job-script directory.
pub const SCRIPT_DIR_ENV: &str = "BATCHQ_SCRIPT_DIR";

/// Configuration shared by every scheduler adapter.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory where rendered job scripts are written.
    pub script_dir: PathBuf,

    /// Age after which a rendered job script becomes eligible for cleanup.
    /// `None` disables age-based expiry (forced sweeps still apply).
    pub script_expiry: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            script_dir: default_script_dir(),
            script_expiry: Some(Duration::hours(1)),
        }
    }
}

impl ClientConfig {
    /// Set the rendered job-script directory.
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    /// Set (or disable, with `None`) the job-script expiry window.
    pub fn with_script_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.script_expiry = expiry;
        self
    }
}

/// Default location for rendered job scripts.
///
/// `$BATCHQ_SCRIPT_DIR` wins; otherwise `~/.batchq/job_scripts`.
fn default_script_dir() -> PathBuf {
    std::env::var(SCRIPT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".batchq")
                .join("job_scripts")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expiry_is_one_hour() {
        let config = ClientConfig::default();
        assert_eq!(config.script_expiry, Some(Duration::hours(1)));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::default()
            .with_script_dir("/tmp/scripts")
            .with_script_expiry(None);
        assert_eq!(config.script_dir, PathBuf::from("/tmp/scripts"));
        assert_eq!(config.script_expiry, None);
    }
}

//! Rendered job-script files: naming, writing, listing and expiry.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use rand::Rng;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::BatchResult;
use crate::template;

/// Length of the random filename suffix.
const SUFFIX_LENGTH: usize = 8;

/// Alphabet for the random filename suffix.
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Owns the job-script directory: renders templates into uniquely named
/// files, lists them, and expires old ones.
///
/// Filename uniqueness is probabilistic (random suffix), not guaranteed;
/// sweeps racing against concurrent renders only tolerate files vanishing
/// between listing and deletion.
#[derive(Debug, Clone)]
pub struct ScriptManager {
    dir: PathBuf,
    expiry: Option<Duration>,
}

impl ScriptManager {
    /// Create a manager over the configured script directory.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            dir: config.script_dir.clone(),
            expiry: config.script_expiry,
        }
    }

    /// The job-script directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render a template file into a freshly named script on disk.
    ///
    /// The directory is created on demand. Nothing is written when the
    /// template has unresolved placeholders.
    pub fn render(
        &self,
        template_path: &Path,
        context: &BTreeMap<String, String>,
    ) -> BatchResult<PathBuf> {
        let text = fs::read_to_string(template_path)?;
        let rendered = template::render_script(&text, context)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(script_filename(template_path, SUFFIX_LENGTH));
        fs::write(&path, rendered)?;
        debug!("Rendered job script: {}", path.display());
        Ok(path)
    }

    /// List entries directly inside the script directory (non-recursive).
    ///
    /// A directory that does not exist yet lists as empty.
    pub fn list(&self) -> BatchResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    /// Delete expired job scripts, returning the number removed.
    ///
    /// With expiry disabled the sweep is a no-op unless `force` is set; a
    /// forced sweep deletes every regular file regardless of age. Anything
    /// that is not a regular file is skipped, and a file vanishing between
    /// listing and deletion is not an error.
    pub fn sweep(&self, force: bool) -> BatchResult<usize> {
        let threshold = match (force, self.expiry) {
            (false, None) => {
                debug!("Job script expiry disabled; skipping sweep");
                return Ok(0);
            }
            (false, Some(expiry)) => Some(Local::now() - expiry),
            (true, _) => None,
        };

        let mut removed = 0;
        for path in self.list()? {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            if let Some(threshold) = threshold {
                let modified: DateTime<Local> = metadata.modified()?.into();
                if modified > threshold {
                    continue;
                }
            }

            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if removed > 0 {
            debug!("Removed {} expired job script(s)", removed);
        }
        Ok(removed)
    }
}

/// Build an output filename from a template path:
/// `<stem>_<random suffix><ext>`, suffix drawn from `A-Z0-9`.
pub(crate) fn script_filename(template: &Path, suffix_length: usize) -> String {
    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("job_script");
    let ext = template
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..suffix_length)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    format!("{stem}_{suffix}{ext}")
}

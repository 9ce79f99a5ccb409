//! Job handles: thin, ID-carrying views onto a scheduler adapter.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::debug;

use crate::error::{BatchError, BatchResult};
use crate::scheduler::Scheduler;
use crate::status::GenericStatus;

/// Handle to one scheduler job.
///
/// A handle stores the job ID and a cached copy of the last status it saw;
/// the scheduler itself remains the source of truth. The adapter is held
/// through a weak reference, so dropping the owning [`Client`] leaves the
/// handle intact but inert: operations then fail with
/// [`BatchError::SchedulerDropped`].
///
/// [`Client`]: crate::Client
#[derive(Debug)]
pub struct Job {
    id: String,
    scheduler: Option<Weak<dyn Scheduler>>,
    status: Option<GenericStatus>,
    native: Option<Value>,
    auto_update: bool,
}

impl Job {
    /// Bind a handle to an adapter, fetching the first status when
    /// `auto_update` is set.
    pub(crate) fn bind(
        id: String,
        scheduler: Weak<dyn Scheduler>,
        auto_update: bool,
    ) -> BatchResult<Self> {
        let mut job = Self {
            id,
            scheduler: Some(scheduler),
            status: None,
            native: None,
            auto_update,
        };
        if job.auto_update {
            job.update()?;
        }
        Ok(job)
    }

    /// Handle with no adapter behind it. Useful for carrying a job ID
    /// through code that may never touch the scheduler; every scheduler
    /// operation fails with [`BatchError::SchedulerDropped`].
    pub fn detached(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scheduler: None,
            status: None,
            native: None,
            auto_update: false,
        }
    }

    /// The scheduler-assigned job ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether mutating operations refresh the cached status.
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Enable or disable status refresh after mutating operations.
    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.auto_update = auto_update;
    }

    /// The cached generic status from the most recent fetch, if any.
    pub fn last_status(&self) -> Option<GenericStatus> {
        self.status
    }

    /// The cached native status record from the most recent fetch, if any.
    pub fn native_status(&self) -> Option<&Value> {
        self.native.as_ref()
    }

    /// Fetch the current status from the scheduler and cache it.
    ///
    /// Returns `None` when the scheduler reports a status code with no
    /// generic translation; [`native_status`](Job::native_status) still
    /// holds the raw record in that case.
    pub fn status(&mut self) -> BatchResult<Option<GenericStatus>> {
        self.update()?;
        Ok(self.status)
    }

    /// Whether the cached status is terminal.
    pub fn is_finished(&self) -> bool {
        self.status.is_some_and(|status| status.is_terminal())
    }

    /// Hold the job. Refreshes the cached status when auto-update is on.
    pub fn hold(&mut self) -> BatchResult<()> {
        self.scheduler()?.hold(&self.id)?;
        debug!("Held job {}", self.id);
        if self.auto_update {
            self.update()?;
        }
        Ok(())
    }

    /// Release the job. Refreshes the cached status when auto-update is on.
    pub fn release(&mut self) -> BatchResult<()> {
        self.scheduler()?.release(&self.id)?;
        debug!("Released job {}", self.id);
        if self.auto_update {
            self.update()?;
        }
        Ok(())
    }

    /// Delete (cancel) the job. Never refreshes the cached status: the
    /// scheduler forgets the job, so a follow-up query would only fail.
    pub fn delete(&self) -> BatchResult<()> {
        self.scheduler()?.delete(&self.id)?;
        debug!("Deleted job {}", self.id);
        Ok(())
    }

    fn update(&mut self) -> BatchResult<()> {
        let status = self.scheduler()?.status(&self.id)?;
        self.status = status.generic;
        self.native = Some(status.native);
        Ok(())
    }

    fn scheduler(&self) -> BatchResult<Arc<dyn Scheduler>> {
        self.scheduler
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(BatchError::SchedulerDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SubmitOptions;
    use crate::scheduler::{JobStatus, SchedulerKind, SubmitOutcome};
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, PoisonError};

    /// Records which operations ran and replays a scripted status sequence.
    struct RecordingScheduler {
        ops: Mutex<Vec<&'static str>>,
        statuses: Mutex<Vec<Option<GenericStatus>>>,
    }

    impl RecordingScheduler {
        fn new(mut statuses: Vec<Option<GenericStatus>>) -> Self {
            // Stored reversed so pop() yields them in order.
            statuses.reverse();
            Self {
                ops: Mutex::new(Vec::new()),
                statuses: Mutex::new(statuses),
            }
        }

        fn record(&self, op: &'static str) {
            self.ops
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(op);
        }

        fn ops(&self) -> Vec<&'static str> {
            self.ops
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl Scheduler for RecordingScheduler {
        fn kind(&self) -> SchedulerKind {
            SchedulerKind::Mock
        }

        fn submit(&self, _script: &Path, _options: &SubmitOptions) -> BatchResult<SubmitOutcome> {
            self.record("submit");
            Ok(SubmitOutcome::JobId("rec-1".to_string()))
        }

        fn status(&self, job_id: &str) -> BatchResult<JobStatus> {
            self.record("status");
            let generic = self
                .statuses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop()
                .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;
            Ok(JobStatus {
                generic,
                native: serde_json::json!({}),
            })
        }

        fn hold(&self, _job_id: &str) -> BatchResult<String> {
            self.record("hold");
            Ok(String::new())
        }

        fn release(&self, _job_id: &str) -> BatchResult<String> {
            self.record("release");
            Ok(String::new())
        }

        fn delete(&self, _job_id: &str) -> BatchResult<String> {
            self.record("delete");
            Ok(String::new())
        }

        fn list_job_scripts(&self) -> BatchResult<Vec<PathBuf>> {
            Ok(Vec::new())
        }

        fn clean_job_scripts(&self, _force: bool) -> BatchResult<usize> {
            Ok(0)
        }
    }

    fn bind(
        scheduler: &Arc<RecordingScheduler>,
        auto_update: bool,
    ) -> BatchResult<Job> {
        let scheduler: Arc<dyn Scheduler> = scheduler.clone();
        let weak: Weak<dyn Scheduler> = Arc::downgrade(&scheduler);
        Job::bind("rec-1".to_string(), weak, auto_update)
    }

    #[test]
    fn test_bind_with_auto_update_fetches_status() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![Some(GenericStatus::Queued)]));
        let job = bind(&scheduler, true).unwrap();
        assert_eq!(job.last_status(), Some(GenericStatus::Queued));
        assert_eq!(scheduler.ops(), vec!["status"]);
    }

    #[test]
    fn test_bind_without_auto_update_skips_fetch() {
        let scheduler = Arc::new(RecordingScheduler::new(Vec::new()));
        let job = bind(&scheduler, false).unwrap();
        assert_eq!(job.last_status(), None);
        assert!(scheduler.ops().is_empty());
    }

    #[test]
    fn test_status_refreshes_cache() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![
            Some(GenericStatus::Queued),
            Some(GenericStatus::Running),
        ]));
        let mut job = bind(&scheduler, true).unwrap();
        assert_eq!(job.status().unwrap(), Some(GenericStatus::Running));
        assert_eq!(job.last_status(), Some(GenericStatus::Running));
    }

    #[test]
    fn test_hold_and_release_refresh_when_auto_update() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![
            Some(GenericStatus::Queued),
            Some(GenericStatus::Held),
            Some(GenericStatus::Queued),
        ]));
        let mut job = bind(&scheduler, true).unwrap();
        job.hold().unwrap();
        assert_eq!(job.last_status(), Some(GenericStatus::Held));
        job.release().unwrap();
        assert_eq!(job.last_status(), Some(GenericStatus::Queued));
        assert_eq!(
            scheduler.ops(),
            vec!["status", "hold", "status", "release", "status"]
        );
    }

    #[test]
    fn test_hold_without_auto_update_does_not_refresh() {
        let scheduler = Arc::new(RecordingScheduler::new(Vec::new()));
        let mut job = bind(&scheduler, false).unwrap();
        job.hold().unwrap();
        assert_eq!(scheduler.ops(), vec!["hold"]);
    }

    #[test]
    fn test_delete_never_refreshes() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![Some(GenericStatus::Queued)]));
        let job = bind(&scheduler, true).unwrap();
        job.delete().unwrap();
        assert_eq!(scheduler.ops(), vec!["status", "delete"]);
    }

    #[test]
    fn test_detached_handle_has_no_scheduler() {
        let mut job = Job::detached("9999.gadi-pbs");
        assert_eq!(job.id(), "9999.gadi-pbs");
        assert_eq!(job.last_status(), None);
        assert!(matches!(
            job.status(),
            Err(BatchError::SchedulerDropped)
        ));
    }

    #[test]
    fn test_dropped_scheduler_leaves_handle_inert() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![Some(GenericStatus::Queued)]));
        let mut job = bind(&scheduler, true).unwrap();
        drop(scheduler);
        assert!(matches!(job.status(), Err(BatchError::SchedulerDropped)));
        // The cache from before the drop is still readable.
        assert_eq!(job.last_status(), Some(GenericStatus::Queued));
    }

    #[test]
    fn test_is_finished_tracks_terminal_status() {
        let scheduler = Arc::new(RecordingScheduler::new(vec![
            Some(GenericStatus::Running),
            Some(GenericStatus::Finished),
        ]));
        let mut job = bind(&scheduler, true).unwrap();
        assert!(!job.is_finished());
        job.status().unwrap();
        assert!(job.is_finished());
    }
}

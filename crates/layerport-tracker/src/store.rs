//! Job state store: a single cell holding the active job, if any.

use layerport_core::{Job, JobId, JobUpdate};

/// Holds at most one job. Updates are applied in arrival order; there is no
/// sequence or timestamp check.
#[derive(Debug, Default)]
pub struct JobStore {
    job: Option<Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// Replace the active job wholesale.
    pub fn set(&mut self, job: Job) {
        self.job = Some(job);
    }

    pub fn clear(&mut self) {
        self.job = None;
    }

    /// Whether events for `job_id` may touch the store: either it is the
    /// active job or no job is active yet.
    pub fn accepts(&self, job_id: &JobId) -> bool {
        match &self.job {
            Some(job) => &job.job_id == job_id,
            None => true,
        }
    }

    /// Merge a partial update onto the active job.
    ///
    /// With no active job the update's id is adopted as the active job (an
    /// event may beat the upload response). Updates for any other job are
    /// ignored. Returns whether the update was applied.
    pub fn merge(&mut self, update: JobUpdate) -> bool {
        match &mut self.job {
            None => {
                self.job = Some(Job::from(update));
                true
            }
            Some(job) if job.job_id == update.job_id => {
                job.apply(update);
                true
            }
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerport_core::JobStatus;

    fn active(status: &str, progress: u32) -> JobStore {
        let mut store = JobStore::new();
        store.set(Job::from(
            JobUpdate::new(JobId::from("abc"))
                .with_status(status)
                .with_progress(progress),
        ));
        store
    }

    #[test]
    fn merge_retains_status_when_absent() {
        let mut store = active("converting", 40);
        assert!(store.merge(JobUpdate::new(JobId::from("abc")).with_progress(65)));

        let job = store.get().unwrap();
        assert_eq!(job.status, Some(JobStatus::from("converting")));
        assert_eq!(job.progress, Some(65));
    }

    #[test]
    fn merge_overrides_status_when_present() {
        let mut store = active("converting", 40);
        store.merge(JobUpdate::new(JobId::from("abc")).with_status("exporting"));
        let job = store.get().unwrap();
        assert_eq!(job.status, Some(JobStatus::from("exporting")));
        assert_eq!(job.progress, Some(40));
    }

    #[test]
    fn merge_is_last_applied_wins() {
        // Arrival order is trusted; a lower progress arriving later still wins.
        let mut store = active("converting", 80);
        store.merge(JobUpdate::new(JobId::from("abc")).with_progress(30));
        assert_eq!(store.get().unwrap().progress, Some(30));
    }

    #[test]
    fn merge_adopts_unknown_job_when_empty() {
        let mut store = JobStore::new();
        assert!(store.merge(
            JobUpdate::new(JobId::from("early"))
                .with_status("starting")
                .with_progress(5)
        ));
        let job = store.get().unwrap();
        assert_eq!(job.job_id.as_str(), "early");
        assert_eq!(job.progress, Some(5));
    }

    #[test]
    fn merge_ignores_other_jobs() {
        let mut store = active("converting", 40);
        assert!(!store.merge(JobUpdate::new(JobId::from("other")).with_progress(99)));
        assert_eq!(store.get().unwrap().job_id.as_str(), "abc");
        assert_eq!(store.get().unwrap().progress, Some(40));
        assert!(!store.accepts(&JobId::from("other")));
    }

    #[test]
    fn set_replaces_wholesale() {
        let mut store = active("converting", 40);
        let mut finished = Job::new(JobId::from("abc"));
        finished.status = Some(JobStatus::from("completed"));
        store.set(finished.clone());
        assert_eq!(store.get(), Some(&finished));
        assert_eq!(store.get().unwrap().progress, None);
    }

    #[test]
    fn clear_empties() {
        let mut store = active("error", 10);
        store.clear();
        assert!(store.get().is_none());
        assert!(store.accepts(&JobId::from("anything")));
    }
}

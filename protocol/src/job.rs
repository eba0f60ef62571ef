use chrono::DateTime;
use chrono::Utc;

use crate::JobId;
use crate::JobStatus;
use crate::VideoRequest;

/// A persistent record of one video-generation request through its lifecycle.
///
/// See `JobStatus::can_transition_to` for the legal status DAG; this type
/// itself does not enforce the invariants (the store does, at write time) but
/// documents them so callers can reason locally about a given snapshot:
///
/// - `status == Completed` implies `video_url` and `completed_at` are set.
/// - `status.is_active() || status == Completed` implies `provider_job_id` is set.
/// - `status == Failed` implies `error_message` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub user_id: String,
    pub provider_job_id: Option<String>,
    pub status: JobStatus,
    pub request: VideoRequest,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub credits_used: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn satisfies_invariants(&self) -> bool {
        if self.status == JobStatus::Completed
            && (self.video_url.is_none() || self.completed_at.is_none())
        {
            return false;
        }
        if (self.status.is_active() || self.status == JobStatus::Completed)
            && self.provider_job_id.is_none()
        {
            return false;
        }
        if self.status == JobStatus::Failed && self.error_message.is_none() {
            return false;
        }
        true
    }
}

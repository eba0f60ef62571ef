use chrono::DateTime;
use chrono::Utc;
use videogen_protocol::Job;
use videogen_protocol::JobId;
use videogen_protocol::JobStatus;
use videogen_protocol::VideoRequest;

use crate::error::StoreError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) provider_job_id: Option<String>,
    pub(crate) status: String,
    pub(crate) request_json: String,
    pub(crate) video_url: Option<String>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) credits_used: Option<i64>,
    pub(crate) error_message: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) completed_at: Option<i64>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::parse(&row.status).map_err(|source| StoreError::MalformedStatus {
            job_id: row.id.clone(),
            source,
        })?;
        let request: VideoRequest =
            serde_json::from_str(&row.request_json).map_err(|source| StoreError::MalformedRequest {
                job_id: row.id.clone(),
                source,
            })?;
        let id = JobId::from_string(&row.id)
            .map_err(|err| StoreError::Database(sqlx::Error::Decode(Box::new(err))))?;
        Ok(Job {
            id,
            user_id: row.user_id,
            provider_job_id: row.provider_job_id,
            status,
            request,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            credits_used: row.credits_used,
            error_message: row.error_message,
            created_at: epoch_millis_to_datetime(row.created_at),
            updated_at: epoch_millis_to_datetime(row.updated_at),
            completed_at: row.completed_at.map(epoch_millis_to_datetime),
        })
    }
}

/// Job timestamps are stored with millisecond resolution so that
/// `updated_at asc` ordering (the poll worker's fairness queue) reliably
/// breaks ties between jobs touched within the same second.
pub(crate) fn epoch_millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Fields a worker may patch on an existing job. `None` leaves a column
/// untouched; use `Patch::clear_*` style helpers are unnecessary here because
/// the pipeline never needs to null out a previously-set field.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub provider_job_id: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub credits_used: Option<i64>,
    pub error_message: Option<String>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

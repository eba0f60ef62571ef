use chrono::Utc;
use sqlx::QueryBuilder;
use sqlx::Sqlite;
use videogen_protocol::Job;
use videogen_protocol::JobId;
use videogen_protocol::JobStatus;
use videogen_protocol::VideoRequest;

use crate::error::Result;
use crate::error::StoreError;
use crate::model::JobPatch;
use crate::model::JobRow;
use crate::ControlPlaneStore;

const JOB_COLUMNS: &str = r#"
    id, user_id, provider_job_id, status, request_json, video_url,
    thumbnail_url, credits_used, error_message, created_at, updated_at,
    completed_at
"#;

impl ControlPlaneStore {
    /// Inserts a new job in `pending` state. Never called with any other
    /// starting status: intake owns this exclusively.
    pub async fn insert_job(&self, user_id: &str, request: &VideoRequest) -> Result<Job> {
        let id = JobId::new();
        let now = Utc::now().timestamp_millis();
        let request_json = serde_json::to_string(request)
            .map_err(|source| StoreError::MalformedRequest {
                job_id: id.to_string(),
                source,
            })?;

        sqlx::query(
            r#"
INSERT INTO jobs (
    id, user_id, provider_job_id, status, request_json, video_url,
    thumbnail_url, credits_used, error_message, created_at, updated_at,
    completed_at
) VALUES (?, ?, NULL, ?, ?, NULL, NULL, NULL, NULL, ?, ?, NULL)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(JobStatus::Pending.as_str())
        .bind(request_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))
    }

    pub async fn get_by_id(&self, id: JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Job::try_from).transpose()
    }

    /// Up to `limit` rows in `pending` (or the legacy `created` synonym),
    /// oldest `created_at` first.
    pub async fn select_pending(&self, limit: u32) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
SELECT {JOB_COLUMNS} FROM jobs
WHERE status IN ('pending', 'created')
ORDER BY created_at ASC
LIMIT ?
            "#
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    /// Up to `limit` rows in `{submitted, queued, rendering}` (or the legacy
    /// `created` synonym), oldest `updated_at` first so every active job
    /// gets a fair turn under a bounded worker batch.
    pub async fn select_active(&self, limit: u32) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
SELECT {JOB_COLUMNS} FROM jobs
WHERE status IN ('submitted', 'queued', 'rendering', 'created')
ORDER BY updated_at ASC
LIMIT ?
            "#
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
SELECT {JOB_COLUMNS} FROM jobs
WHERE user_id = ?
ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    /// Applies `patch`, stamping `updated_at` (and `completed_at` iff
    /// transitioning to `completed`). Last-write-wins: callers are trusted to
    /// only move a job forward along the status DAG, since only one worker
    /// ever handles a job in a given state.
    pub async fn update(&self, id: JobId, patch: &JobPatch) -> Result<Job> {
        let now = Utc::now().timestamp_millis();
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE jobs SET updated_at = ");
        builder.push_bind(now);

        if let Some(status) = patch.status {
            builder.push(", status = ");
            builder.push_bind(status.as_str());
            if status == JobStatus::Completed {
                builder.push(", completed_at = ");
                builder.push_bind(now);
            }
        }
        if let Some(provider_job_id) = &patch.provider_job_id {
            builder.push(", provider_job_id = ");
            builder.push_bind(provider_job_id.clone());
        }
        if let Some(video_url) = &patch.video_url {
            builder.push(", video_url = ");
            builder.push_bind(video_url.clone());
        }
        if let Some(thumbnail_url) = &patch.thumbnail_url {
            builder.push(", thumbnail_url = ");
            builder.push_bind(thumbnail_url.clone());
        }
        if let Some(credits_used) = patch.credits_used {
            builder.push(", credits_used = ");
            builder.push_bind(credits_used);
        }
        if let Some(error_message) = &patch.error_message {
            builder.push(", error_message = ");
            builder.push_bind(error_message.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id.to_string());

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::JobNotFound(id.to_string()));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use videogen_protocol::AspectRatio;
    use videogen_protocol::CaptionStyle;
    use videogen_protocol::VoiceMode;

    fn sample_request() -> VideoRequest {
        VideoRequest {
            script_text: Some("hello world".to_string()),
            audio_url: None,
            voice_mode: VoiceMode::Tts,
            avatar_id: "avatar-1".to_string(),
            voice_id: "voice-1".to_string(),
            accent_id: None,
            product_image_url: "https://example.com/p.png".to_string(),
            product_name: None,
            aspect_ratio: AspectRatio::Portrait9x16,
            captions: CaptionStyle {
                enabled: true,
                style_id: "bold".to_string(),
            },
            visual_style: None,
        }
    }

    #[tokio::test]
    async fn inserted_job_is_pending_and_round_trips() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        let job = store.insert_job("user-1", &sample_request()).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.provider_job_id.is_none());

        let fetched = store.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(fetched, job);
    }

    #[tokio::test]
    async fn select_pending_orders_oldest_first() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        let first = store.insert_job("user-1", &sample_request()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.insert_job("user-1", &sample_request()).await.unwrap();

        let pending = store.select_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
        assert_eq!(pending[1].id, second.id);
    }

    #[tokio::test]
    async fn select_pending_respects_limit() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        for _ in 0..5 {
            store.insert_job("user-1", &sample_request()).await.unwrap();
        }
        let pending = store.select_pending(3).await.unwrap();
        assert_eq!(pending.len(), 3);
    }

    #[tokio::test]
    async fn update_to_completed_stamps_completed_at() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        let job = store.insert_job("user-1", &sample_request()).await.unwrap();

        store
            .update(
                job.id,
                &JobPatch {
                    status: Some(JobStatus::Submitted),
                    provider_job_id: Some("prov-1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let completed = store
            .update(
                job.id,
                &JobPatch {
                    status: Some(JobStatus::Completed),
                    video_url: Some("https://cdn.example.com/v.mp4".to_string()),
                    credits_used: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(completed.status, JobStatus::Completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.video_url.as_deref(), Some("https://cdn.example.com/v.mp4"));
        assert!(completed.satisfies_invariants());
    }

    #[tokio::test]
    async fn active_jobs_are_ordered_least_recently_updated_first() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        let a = store.insert_job("user-1", &sample_request()).await.unwrap();
        let b = store.insert_job("user-1", &sample_request()).await.unwrap();

        store
            .update(a.id, &JobPatch { status: Some(JobStatus::Submitted), provider_job_id: Some("p-a".into()), ..Default::default() })
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store
            .update(b.id, &JobPatch { status: Some(JobStatus::Submitted), provider_job_id: Some("p-b".into()), ..Default::default() })
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        // Touch `a` again so it moves to the tail of the active queue.
        store
            .update(a.id, &JobPatch { status: Some(JobStatus::Queued), ..Default::default() })
            .await
            .unwrap();

        let active = store.select_active(10).await.unwrap();
        assert_eq!(active[0].id, b.id);
        assert_eq!(active[1].id, a.id);
    }

    #[tokio::test]
    async fn list_by_user_is_newest_first_and_scoped() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        store.insert_job("user-1", &sample_request()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let last = store.insert_job("user-1", &sample_request()).await.unwrap();
        store.insert_job("user-2", &sample_request()).await.unwrap();

        let jobs = store.list_by_user("user-1").await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, last.id);
    }
}

use videogen_protocol::JobStatus;
use videogen_provider::VideoProvider;
use videogen_store::ControlPlaneStore;
use videogen_store::JobPatch;
use videogen_store::StoreError;

pub const RATE_LIMIT_API: &str = "provider";
pub const POLL_WORKER_CALLER: &str = "poll-worker";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollWorkerReport {
    pub polled: u32,
    pub completed: u32,
    /// Rate-limit slots granted for this tick.
    pub slots: u32,
    pub reason: Option<&'static str>,
}

/// One cron tick of the poll worker: advance up to `batch_size` active jobs
/// (oldest-`updated_at`-first, so no job starves under a bounded batch).
///
/// Every failure here is transient from the job's point of view: a failed
/// `checkJobStatus` call leaves the row untouched for the next tick rather
/// than marking the job failed, since only the provider's own terminal
/// status should ever do that.
pub async fn run_poll_worker(
    store: &ControlPlaneStore,
    provider: &dyn VideoProvider,
    batch_size: u32,
) -> Result<PollWorkerReport, StoreError> {
    let candidates = store.select_active(batch_size).await?;
    if candidates.is_empty() {
        return Ok(PollWorkerReport {
            reason: Some("no_active_jobs"),
            ..Default::default()
        });
    }

    let granted = store
        .acquire_slots(RATE_LIMIT_API, POLL_WORKER_CALLER, candidates.len() as u32)
        .await?;
    if granted == 0 {
        return Ok(PollWorkerReport {
            reason: Some("rate_limited"),
            ..Default::default()
        });
    }

    let mut report = PollWorkerReport {
        slots: granted,
        ..Default::default()
    };
    for job in candidates.into_iter().take(granted as usize) {
        let Some(provider_job_id) = job.provider_job_id.as_deref() else {
            continue;
        };

        match provider.check_job_status(provider_job_id).await {
            Ok(status) => {
                let completed = status.status == JobStatus::Completed;
                store
                    .update(
                        job.id,
                        &JobPatch {
                            status: Some(status.status),
                            video_url: status.video_url,
                            thumbnail_url: status.thumbnail_url,
                            credits_used: status.credits_used,
                            error_message: status.error_message,
                            ..Default::default()
                        },
                    )
                    .await?;
                report.polled += 1;
                if completed {
                    report.completed += 1;
                }
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::debug!(job_id = %job.id, error = %err, "poll worker: checkJobStatus failed, retrying next tick");
                } else {
                    tracing::warn!(job_id = %job.id, error = %err, "poll worker: checkJobStatus failed with a non-transient error, retrying next tick anyway");
                }
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use videogen_protocol::AspectRatio;
    use videogen_protocol::CaptionStyle;
    use videogen_protocol::VideoRequest;
    use videogen_protocol::VoiceMode;
    use videogen_provider::stub::StubVideoProvider;
    use videogen_provider::JobStatusReport;
    use videogen_provider::ProviderError;

    fn sample_request() -> VideoRequest {
        VideoRequest {
            script_text: Some("hello".to_string()),
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

    async fn store_with_active_job(max_calls: u32) -> (ControlPlaneStore, videogen_protocol::Job) {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        store
            .seed_rate_limit(RATE_LIMIT_API, POLL_WORKER_CALLER, max_calls, 60)
            .await
            .unwrap();
        let job = store.insert_job("user-1", &sample_request()).await.unwrap();
        let job = store
            .update(
                job.id,
                &JobPatch {
                    status: Some(JobStatus::Rendering),
                    provider_job_id: Some("p1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (store, job)
    }

    #[tokio::test]
    async fn happy_path_marks_job_completed_with_video_url_and_credits() {
        let (store, job) = store_with_active_job(10).await;
        let provider = StubVideoProvider::new();
        provider.push_check_job_status(Ok(JobStatusReport {
            status: JobStatus::Completed,
            video_url: Some("https://v/1.mp4".to_string()),
            thumbnail_url: None,
            credits_used: Some(5),
            error_message: None,
            progress: None,
        }));

        let report = run_poll_worker(&store, &provider, 10).await.unwrap();
        assert_eq!(report.polled, 1);
        assert_eq!(report.completed, 1);

        let updated = store.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(updated.video_url.as_deref(), Some("https://v/1.mp4"));
        assert_eq!(updated.credits_used, Some(5));
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn transient_failure_leaves_job_unchanged() {
        let (store, job) = store_with_active_job(10).await;
        let before = store.get_by_id(job.id).await.unwrap().unwrap();

        let provider = StubVideoProvider::new();
        provider.push_check_job_status(Err(ProviderError::Transient {
            status: 503,
            message: "upstream timeout".to_string(),
        }));

        let report = run_poll_worker(&store, &provider, 10).await.unwrap();
        assert_eq!(report.polled, 0);

        let after = store.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(after.status, before.status);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn no_active_jobs_reports_cleanly() {
        let store = ControlPlaneStore::open_in_memory().await.unwrap();
        store
            .seed_rate_limit(RATE_LIMIT_API, POLL_WORKER_CALLER, 10, 60)
            .await
            .unwrap();
        let provider = StubVideoProvider::new();

        let report = run_poll_worker(&store, &provider, 10).await.unwrap();
        assert_eq!(report.reason, Some("no_active_jobs"));
    }
}

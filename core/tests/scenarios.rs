//! End-to-end pipeline scenarios spanning intake, the submit worker, and the
//! poll worker together, distinct from each module's own narrower unit tests.

#![allow(unused_crate_dependencies)]

use videogen_core::accept_request;
use videogen_core::run_poll_worker;
use videogen_core::run_submit_worker;
use videogen_core::IntakeDefaults;
use videogen_core::PartialVideoRequest;
use videogen_core::POLL_WORKER_CALLER;
use videogen_core::RATE_LIMIT_API;
use videogen_core::SUBMIT_WORKER_CALLER;
use videogen_protocol::AspectRatio;
use videogen_protocol::JobStatus;
use videogen_provider::stub::StubVideoProvider;
use videogen_provider::CreateJobOutcome;
use videogen_provider::JobStatusReport;
use videogen_store::ControlPlaneStore;

fn defaults() -> IntakeDefaults {
    IntakeDefaults {
        avatar_id: "default-avatar".to_string(),
        voice_id: "default-voice".to_string(),
        script_text: "a default script".to_string(),
        product_image_url: "https://cdn.example.com/default.png".to_string(),
        aspect_ratio: AspectRatio::Portrait9x16,
        captions_enabled: true,
        caption_style: "default".to_string(),
    }
}

/// S1: happy path. Intake accepts a request, the submit worker promotes it,
/// the poll worker advances it to completion.
#[tokio::test]
async fn happy_path_from_intake_through_completion() {
    let store = ControlPlaneStore::open_in_memory().await.unwrap();
    store.seed_rate_limit(RATE_LIMIT_API, SUBMIT_WORKER_CALLER, 5, 60).await.unwrap();
    store.seed_rate_limit(RATE_LIMIT_API, POLL_WORKER_CALLER, 5, 60).await.unwrap();

    let job = accept_request(&store, "user-1", PartialVideoRequest::default(), &defaults())
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Pending);

    let provider = StubVideoProvider::new();
    provider.push_create_job(Ok(CreateJobOutcome {
        provider_job_id: "prov-1".to_string(),
        status: JobStatus::Queued,
    }));

    let submit_report = run_submit_worker(&store, &provider, 5).await.unwrap();
    assert_eq!(submit_report.submitted, 1);

    let submitted = store.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(submitted.status, JobStatus::Queued);
    assert_eq!(submitted.provider_job_id.as_deref(), Some("prov-1"));

    provider.push_check_job_status(Ok(JobStatusReport {
        status: JobStatus::Completed,
        video_url: Some("https://cdn.example.com/v.mp4".to_string()),
        thumbnail_url: Some("https://cdn.example.com/t.jpg".to_string()),
        credits_used: Some(3),
        error_message: None,
        progress: None,
    }));

    let poll_report = run_poll_worker(&store, &provider, 5).await.unwrap();
    assert_eq!(poll_report.completed, 1);

    let completed = store.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.video_url.as_deref(), Some("https://cdn.example.com/v.mp4"));
    assert!(completed.satisfies_invariants());
}

/// S2: rate-limit split between workers. 20 pending jobs, 10 active jobs,
/// submit budget 5/min, poll budget 10/min. One run of each worker moves
/// exactly its budget's worth; a second run in the same window is rate
/// limited.
#[tokio::test]
async fn rate_limit_split_between_workers() {
    let store = ControlPlaneStore::open_in_memory().await.unwrap();
    store.seed_rate_limit(RATE_LIMIT_API, SUBMIT_WORKER_CALLER, 5, 60).await.unwrap();
    store.seed_rate_limit(RATE_LIMIT_API, POLL_WORKER_CALLER, 10, 60).await.unwrap();

    // 20 pending jobs for the submit worker.
    for _ in 0..20 {
        accept_request(&store, "user-1", PartialVideoRequest::default(), &defaults())
            .await
            .unwrap();
    }
    // 10 already-active jobs for the poll worker.
    for i in 0..10 {
        let job = accept_request(&store, "user-1", PartialVideoRequest::default(), &defaults())
            .await
            .unwrap();
        store
            .update(
                job.id,
                &videogen_store::JobPatch {
                    status: Some(JobStatus::Rendering),
                    provider_job_id: Some(format!("active-{i}")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let provider = StubVideoProvider::new();
    for i in 0..5 {
        provider.push_create_job(Ok(CreateJobOutcome {
            provider_job_id: format!("p-{i}"),
            status: JobStatus::Queued,
        }));
    }
    for _ in 0..10 {
        provider.push_check_job_status(Ok(JobStatusReport {
            status: JobStatus::Rendering,
            video_url: None,
            thumbnail_url: None,
            credits_used: None,
            error_message: None,
            progress: Some(0.2),
        }));
    }

    let submit_report = run_submit_worker(&store, &provider, 30).await.unwrap();
    assert_eq!(submit_report.submitted, 5);
    assert_eq!(submit_report.slots, 5);

    let poll_report = run_poll_worker(&store, &provider, 30).await.unwrap();
    assert_eq!(poll_report.polled, 10);
    assert_eq!(poll_report.slots, 10);

    let submit_again = run_submit_worker(&store, &provider, 30).await.unwrap();
    assert_eq!(submit_again.reason, Some("rate_limited"));
    let poll_again = run_poll_worker(&store, &provider, 30).await.unwrap();
    assert_eq!(poll_again.reason, Some("rate_limited"));
}

/// S6: fairness under backlog. 100 active jobs, a poll batch size of 10 and
/// a matching budget, so every job has been polled at least once within 10
/// ticks thanks to `selectActive`'s oldest-`updatedAt`-first ordering.
#[tokio::test]
async fn fairness_under_backlog_polls_every_job_within_ten_ticks() {
    let store = ControlPlaneStore::open_in_memory().await.unwrap();
    // One window sized to cover all ten ticks: the scenario is about
    // `selectActive`'s fairness ordering, not window-boundary resets.
    store.seed_rate_limit(RATE_LIMIT_API, POLL_WORKER_CALLER, 100, 3600).await.unwrap();

    for i in 0..100 {
        let job = accept_request(&store, "user-1", PartialVideoRequest::default(), &defaults())
            .await
            .unwrap();
        store
            .update(
                job.id,
                &videogen_store::JobPatch {
                    status: Some(JobStatus::Rendering),
                    provider_job_id: Some(format!("p-{i}")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let provider = StubVideoProvider::new();
    for tick in 0..10 {
        for _ in 0..10 {
            provider.push_check_job_status(Ok(JobStatusReport {
                status: JobStatus::Rendering,
                video_url: None,
                thumbnail_url: None,
                credits_used: None,
                error_message: None,
                progress: None,
            }));
        }
        let report = run_poll_worker(&store, &provider, 10).await.unwrap();
        assert_eq!(report.polled, 10, "tick {tick} should poll a full batch");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let polled_ids: Vec<_> = provider
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            videogen_provider::stub::Call::CheckJobStatus(id) => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(polled_ids.len(), 100);
    for i in 0..100 {
        assert!(polled_ids.contains(&format!("p-{i}")), "job p-{i} was never polled");
    }
}

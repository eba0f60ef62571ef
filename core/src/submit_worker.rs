use videogen_protocol::JobStatus;
use videogen_provider::ProviderError;
use videogen_provider::VideoProvider;
use videogen_store::ControlPlaneStore;
use videogen_store::JobPatch;
use videogen_store::StoreError;

pub const RATE_LIMIT_API: &str = "provider";
pub const SUBMIT_WORKER_CALLER: &str = "submit-worker";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitWorkerReport {
    pub submitted: u32,
    pub failed: u32,
    /// Rate-limit slots granted for this tick.
    pub slots: u32,
    /// `"no_pending_jobs"` or `"rate_limited"` when the run did no work for a
    /// reason other than "nothing left to submit".
    pub reason: Option<&'static str>,
}

/// One cron tick of the submit worker: promote up to `batch_size` `pending`
/// jobs into provider-registered jobs, gated by the shared rate limiter.
///
/// Dispatch within the granted slots is sequential: the grant already
/// reserved quota, so there is no concurrency to exploit, and sequential
/// dispatch keeps the partial-failure semantics (stop on `RateLimited`,
/// fail the rest individually otherwise) simple to reason about.
pub async fn run_submit_worker(
    store: &ControlPlaneStore,
    provider: &dyn VideoProvider,
    batch_size: u32,
) -> Result<SubmitWorkerReport, StoreError> {
    let candidates = store.select_pending(batch_size).await?;
    if candidates.is_empty() {
        return Ok(SubmitWorkerReport {
            reason: Some("no_pending_jobs"),
            ..Default::default()
        });
    }

    let granted = store
        .acquire_slots(RATE_LIMIT_API, SUBMIT_WORKER_CALLER, candidates.len() as u32)
        .await?;
    if granted == 0 {
        return Ok(SubmitWorkerReport {
            reason: Some("rate_limited"),
            ..Default::default()
        });
    }

    let mut report = SubmitWorkerReport {
        slots: granted,
        ..Default::default()
    };
    for job in candidates.into_iter().take(granted as usize) {
        match provider.create_job(&job.request).await {
            Ok(outcome) => {
                store
                    .update(
                        job.id,
                        &JobPatch {
                            status: Some(outcome.status),
                            provider_job_id: Some(outcome.provider_job_id),
                            ..Default::default()
                        },
                    )
                    .await?;
                report.submitted += 1;
            }
            Err(ProviderError::RateLimited) => {
                tracing::info!(job_id = %job.id, "submit worker: rate limited mid-batch, stopping");
                break;
            }
            Err(err) => {
                // A timed-out or rejected createJob leaves the provider job id
                // unknown; retrying would risk a duplicate, so the job is
                // failed outright rather than left pending for another tick.
                tracing::warn!(job_id = %job.id, error = %err, "submit worker: createJob failed");
                store
                    .update(
                        job.id,
                        &JobPatch {
                            status: Some(JobStatus::Failed),
                            error_message: Some(err.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

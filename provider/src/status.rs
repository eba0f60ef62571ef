use videogen_protocol::JobStatus;

/// Maps the upstream provider's status vocabulary onto the internal status
/// set. Unrecognized strings map to `submitted` rather than erroring, since
/// an unknown-but-non-terminal upstream status still means "in flight".
pub(crate) fn normalize_status(upstream: &str) -> JobStatus {
    match upstream {
        "pending" | "queued" => JobStatus::Queued,
        "processing" | "rendering" => JobStatus::Rendering,
        "done" | "completed" => JobStatus::Completed,
        "failed" | "error" => JobStatus::Failed,
        _ => JobStatus::Submitted,
    }
}

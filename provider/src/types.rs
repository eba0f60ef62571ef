use videogen_protocol::JobStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateJobOutcome {
    pub provider_job_id: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub credits_used: Option<i64>,
    pub error_message: Option<String>,
    pub progress: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub gender: Option<String>,
    pub preview_url: Option<String>,
}

/// Each `(voice, accent)` pair the provider exposes is flattened into one
/// `Voice` whose `id` is the accent id, per the adapter's listVoices contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub gender: Option<String>,
    pub accent_name: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditBalance {
    pub credits: i64,
}

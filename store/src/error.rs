use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("rate limit row for ({api}, {caller}) is not seeded")]
    RateLimitRowMissing { api: String, caller: String },

    #[error("stored request payload for job {job_id} is not valid json")]
    MalformedRequest {
        job_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored status for job {job_id} is unrecognized")]
    MalformedStatus {
        job_id: String,
        #[source]
        source: videogen_protocol::ParseStatusError,
    },

    #[error("database operation failed")]
    Database(#[from] sqlx::Error),

    #[error("failed to run database migrations")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

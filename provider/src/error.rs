use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure modes of a call against the upstream video-generation service.
///
/// `is_transient` is what the workers actually branch on: everything else
/// about the variant (status code, message) is for logging.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("upstream provider returned a transient error ({status}): {message}")]
    Transient { status: u16, message: String },

    #[error("upstream provider rate limit exceeded")]
    RateLimited,

    #[error("upstream provider rejected the request ({status}): {message}")]
    Fatal { status: u16, message: String },

    #[error("request to upstream provider failed")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode upstream provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Transient failures (including `RateLimited`) never mark a job failed;
    /// only `Fatal` does. See the submit/poll worker error handling.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transient { .. } | ProviderError::RateLimited | ProviderError::Transport(_)
        )
    }
}

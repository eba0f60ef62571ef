//! Abstraction over the upstream AI video-generation service.
//!
//! Modeled as a capability interface (trait object, not inheritance): every
//! worker and handler depends on `dyn VideoProvider` so a second provider
//! could be added without touching the pipeline. `HttpVideoProvider` is the
//! only production implementation today; `stub::StubVideoProvider` backs the
//! worker tests.

mod error;
mod http;
pub mod stub;
mod status;
mod types;

pub use error::ProviderError;
pub use error::Result;
pub use http::HttpVideoProvider;
pub use types::Avatar;
pub use types::CreateJobOutcome;
pub use types::CreditBalance;
pub use types::JobStatusReport;
pub use types::Voice;

use async_trait::async_trait;
use videogen_protocol::VideoRequest;

#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn create_job(&self, request: &VideoRequest) -> Result<CreateJobOutcome>;
    async fn check_job_status(&self, provider_job_id: &str) -> Result<JobStatusReport>;
    async fn list_avatars(&self) -> Result<Vec<Avatar>>;
    async fn list_voices(&self) -> Result<Vec<Voice>>;
    async fn get_credit_balance(&self) -> Result<CreditBalance>;
}

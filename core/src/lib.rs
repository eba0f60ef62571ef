//! The job pipeline itself: request intake, the submit and poll workers, and
//! the client-facing status read helpers. Depends on `store` and `provider`
//! but knows nothing about HTTP.

mod error;
mod intake;
mod poll_worker;
mod status_read;
mod submit_worker;

pub use error::IntakeError;
pub use intake::accept_request;
pub use intake::IntakeDefaults;
pub use intake::PartialVideoRequest;
pub use poll_worker::run_poll_worker;
pub use poll_worker::PollWorkerReport;
pub use poll_worker::POLL_WORKER_CALLER;
pub use status_read::next_poll_delay;
pub use status_read::CacheDirective;
pub use status_read::FIRST_POLL_DELAY;
pub use submit_worker::run_submit_worker;
pub use submit_worker::SubmitWorkerReport;
pub use submit_worker::RATE_LIMIT_API;
pub use submit_worker::SUBMIT_WORKER_CALLER;

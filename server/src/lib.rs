//! HTTP surface over the job pipeline: request intake, status reads, and the
//! cron-triggered worker endpoints, wired together behind one `AppState`.

#![allow(unused_crate_dependencies)]

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

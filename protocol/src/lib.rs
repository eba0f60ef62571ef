//! Shared domain types for the video-generation control plane.
//!
//! Kept dependency-free of storage and transport concerns so that `store`,
//! `provider`, `core`, and `server` can all depend on it without pulling in
//! sqlx or reqwest.

mod job;
mod job_id;
mod status;
mod video_request;

pub use job::Job;
pub use job_id::JobId;
pub use status::JobStatus;
pub use status::ParseStatusError;
pub use video_request::AspectRatio;
pub use video_request::CaptionStyle;
pub use video_request::ParseAspectRatioError;
pub use video_request::VideoRequest;
pub use video_request::VoiceMode;

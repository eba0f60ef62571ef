use std::sync::Arc;

use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use videogen_core::accept_request;
use videogen_core::run_poll_worker;
use videogen_core::run_submit_worker;
use videogen_core::CacheDirective;
use videogen_core::PartialVideoRequest;
use videogen_protocol::AspectRatio;
use videogen_protocol::Job;
use videogen_protocol::JobId;
use videogen_protocol::VoiceMode;

use crate::error::ApiError;
use crate::state::AppState;

const USER_ID_HEADER: &str = "x-user-id";
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-video", post(generate_video))
        .route("/jobs/{id}", get(job_status))
        .route("/list-jobs", post(list_jobs))
        .route("/list-avatars", get(list_avatars))
        .route("/list-voices", get(list_voices))
        .route("/credit-balance", get(credit_balance))
        .route("/upload-product-image", post(upload_product_image))
        .route("/health", get(health))
        .route("/submit-worker", post(submit_worker))
        .route("/poll-worker", post(poll_worker))
        .with_state(state)
}

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_ID_HEADER} header")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoRequestBody {
    script_text: Option<String>,
    audio_url: Option<String>,
    voice_mode: Option<VoiceMode>,
    avatar_id: Option<String>,
    voice_id: Option<String>,
    accent_id: Option<String>,
    product_image_url: Option<String>,
    product_name: Option<String>,
    aspect_ratio: Option<AspectRatio>,
    captions_enabled: Option<bool>,
    visual_style: Option<String>,
}

impl From<GenerateVideoRequestBody> for PartialVideoRequest {
    fn from(body: GenerateVideoRequestBody) -> Self {
        PartialVideoRequest {
            script_text: body.script_text,
            audio_url: body.audio_url,
            voice_mode: body.voice_mode,
            avatar_id: body.avatar_id,
            voice_id: body.voice_id,
            accent_id: body.accent_id,
            product_image_url: body.product_image_url,
            product_name: body.product_name,
            aspect_ratio: body.aspect_ratio,
            captions_enabled: body.captions_enabled,
            visual_style: body.visual_style,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponseBody {
    job_id: String,
    status: &'static str,
}

async fn generate_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateVideoRequestBody>,
) -> Result<Response, ApiError> {
    let user_id = user_id(&headers)?;
    let defaults = state.intake_defaults();
    let job = accept_request(&state.store, &user_id, body.into(), &defaults).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateVideoResponseBody {
            job_id: job.id.to_string(),
            status: "pending",
        }),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponseBody {
    job_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobStatusResponseBody {
    fn from(job: &Job) -> Self {
        JobStatusResponseBody {
            job_id: job.id.to_string(),
            status: job.status.as_str(),
            video_url: job.video_url.clone(),
            thumbnail_url: job.thumbnail_url.clone(),
            credits_used: job.credits_used,
            error_message: job.error_message.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
            completed_at: job.completed_at,
        }
    }
}

async fn job_status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let job_id = JobId::from_string(&id).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let job = state
        .store
        .get_by_id(job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("job {id} not found")))?;

    let cache_control = CacheDirective::for_status(job.status).header_value();
    let body = JobStatusResponseBody::from(&job);
    Ok((
        [(axum::http::header::CACHE_CONTROL, cache_control)],
        Json(body),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
struct ListJobsResponseBody {
    jobs: Vec<JobStatusResponseBody>,
}

async fn list_jobs(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let user_id = user_id(&headers)?;
    let jobs = state.store.list_by_user(&user_id).await?;
    let jobs = jobs.iter().map(JobStatusResponseBody::from).collect();
    Ok(Json(ListJobsResponseBody { jobs }).into_response())
}

const PROVIDER_CACHE_CONTROL: &str = "max-age=3600";

async fn list_avatars(State(state): State<AppState>) -> Result<Response, ApiError> {
    let avatars = state.provider.list_avatars().await?;
    Ok((
        [(axum::http::header::CACHE_CONTROL, PROVIDER_CACHE_CONTROL)],
        Json(serde_json::json!({ "avatars": avatars_json(avatars) })),
    )
        .into_response())
}

fn avatars_json(avatars: Vec<videogen_provider::Avatar>) -> Vec<serde_json::Value> {
    avatars
        .into_iter()
        .map(|avatar| {
            serde_json::json!({
                "id": avatar.id,
                "name": avatar.name,
                "gender": avatar.gender,
                "previewUrl": avatar.preview_url,
            })
        })
        .collect()
}

async fn list_voices(State(state): State<AppState>) -> Result<Response, ApiError> {
    let voices = state.provider.list_voices().await?;
    let voices: Vec<_> = voices
        .into_iter()
        .map(|voice| {
            serde_json::json!({
                "id": voice.id,
                "name": voice.name,
                "gender": voice.gender,
                "accentName": voice.accent_name,
                "previewUrl": voice.preview_url,
            })
        })
        .collect();
    Ok((
        [(axum::http::header::CACHE_CONTROL, PROVIDER_CACHE_CONTROL)],
        Json(serde_json::json!({ "voices": voices })),
    )
        .into_response())
}

async fn credit_balance(State(state): State<AppState>) -> Result<Response, ApiError> {
    let balance = state.provider.get_credit_balance().await?;
    Ok((
        [(axum::http::header::CACHE_CONTROL, PROVIDER_CACHE_CONTROL)],
        Json(serde_json::json!({ "credits": balance.credits })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct UploadProductImageRequestBody {
    base64: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadProductImageResponseBody {
    url: String,
}

fn extension_for_mime_type(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some("image/png") => "png",
        _ => "jpg",
    }
}

async fn upload_product_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UploadProductImageRequestBody>,
) -> Result<Response, ApiError> {
    let user_id = user_id(&headers)?;
    if body.base64.is_empty() {
        return Err(ApiError::BadRequest("missing base64".to_string()));
    }

    let bytes = BASE64
        .decode(&body.base64)
        .map_err(|err| ApiError::BadRequest(format!("invalid base64: {err}")))?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }

    let extension = extension_for_mime_type(body.mime_type.as_deref());
    let timestamp = Utc::now().timestamp_millis();
    let suffix: String = {
        let mut rng = rand::thread_rng();
        (0..4).map(|_| format!("{:02x}", rng.r#gen::<u8>())).collect()
    };
    let filename = format!("{timestamp}-{suffix}.{extension}");

    let dir = state.config.product_image_upload_dir.join(&user_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;
    let path = dir.join(&filename);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;

    let url = format!("/product-images/{user_id}/{filename}");
    Ok((StatusCode::CREATED, Json(UploadProductImageResponseBody { url })).into_response())
}

#[derive(Debug, Serialize)]
struct HealthResponseBody {
    status: &'static str,
    env: HealthEnv,
}

#[derive(Debug, Serialize)]
struct HealthEnv {
    provider_configured: bool,
    store_configured: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponseBody> {
    Json(HealthResponseBody {
        status: "ok",
        env: HealthEnv {
            provider_configured: !state.config.provider_base_url.is_empty()
                && !state.config.provider_api_key.is_empty(),
            store_configured: state.config.database_url.as_os_str().len() > 0,
        },
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitWorkerResponseBody {
    submitted: u32,
    failed: u32,
    slots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

async fn submit_worker(State(state): State<AppState>) -> Result<Json<SubmitWorkerResponseBody>, ApiError> {
    let report = run_submit_worker(&state.store, provider_ref(&state.provider), state.config.submit_batch_size)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(SubmitWorkerResponseBody {
        submitted: report.submitted,
        failed: report.failed,
        slots: report.slots,
        reason: report.reason,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PollWorkerResponseBody {
    polled: u32,
    completed: u32,
    slots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

async fn poll_worker(State(state): State<AppState>) -> Result<Json<PollWorkerResponseBody>, ApiError> {
    let report = run_poll_worker(&state.store, provider_ref(&state.provider), state.config.poll_batch_size)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(PollWorkerResponseBody {
        polled: report.polled,
        completed: report.completed,
        slots: report.slots,
        reason: report.reason,
    }))
}

fn provider_ref(provider: &Arc<dyn videogen_provider::VideoProvider>) -> &dyn videogen_provider::VideoProvider {
    provider.as_ref()
}

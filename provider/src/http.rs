use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use videogen_protocol::AspectRatio;
use videogen_protocol::VideoRequest;
use videogen_protocol::VoiceMode;

use crate::error::ProviderError;
use crate::error::Result;
use crate::status::normalize_status;
use crate::types::Avatar;
use crate::types::CreateJobOutcome;
use crate::types::CreditBalance;
use crate::types::JobStatusReport;
use crate::types::Voice;
use crate::VideoProvider;

/// Thin wrapper over `reqwest::Client` carrying the upstream base URL and
/// credential. Construct once, reuse the inner `Client` for connection
/// pooling.
pub struct HttpVideoProvider {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpVideoProvider {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// Maps a non-2xx response into the right `ProviderError` variant and
    /// logs at the severity that matches how the caller should react:
    /// `RateLimited`/`Transient` are expected under normal operation,
    /// `Fatal` means the caller made a bad request.
    async fn error_for_status(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::debug!(%status, "provider rate limit hit");
            return ProviderError::RateLimited;
        }
        if status.is_server_error() {
            tracing::warn!(%status, %message, "provider returned a server error");
            return ProviderError::Transient {
                status: status.as_u16(),
                message,
            };
        }
        tracing::debug!(%status, %message, "provider rejected the request");
        ProviderError::Fatal {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobRequestBody<'a> {
    avatar_id: &'a str,
    voice_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    accent_id: Option<&'a str>,
    product_image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_name: Option<&'a str>,
    aspect_ratio: &'static str,
    captions_enabled: bool,
    caption_style: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    visual_style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// "9:16" (internal) -> "9x16" (provider wire form).
fn wire_aspect_ratio(ratio: AspectRatio) -> &'static str {
    match ratio {
        AspectRatio::Portrait9x16 => "9x16",
        AspectRatio::Square1x1 => "1x1",
        AspectRatio::Landscape16x9 => "16x9",
    }
}

fn build_create_job_body(request: &VideoRequest) -> CreateJobRequestBody<'_> {
    let (audio_url, text) = match (request.voice_mode, &request.audio_url) {
        (VoiceMode::UserAudio, Some(audio_url)) => (Some(audio_url.as_str()), None),
        _ => (None, request.script_text.as_deref()),
    };

    CreateJobRequestBody {
        avatar_id: &request.avatar_id,
        voice_id: &request.voice_id,
        accent_id: request.accent_id.as_deref(),
        product_image_url: &request.product_image_url,
        product_name: request.product_name.as_deref(),
        aspect_ratio: wire_aspect_ratio(request.aspect_ratio),
        captions_enabled: request.captions.enabled,
        caption_style: &request.captions.style_id,
        visual_style: request.visual_style.as_deref(),
        audio_url,
        text,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobResponseBody {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponseBody {
    status: String,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
    credits_used: Option<i64>,
    error_message: Option<String>,
    progress: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AvatarDto {
    id: String,
    name: String,
    gender: Option<String>,
    #[serde(rename = "previewUrl")]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListAvatarsResponseBody {
    avatars: Vec<AvatarDto>,
}

#[derive(Debug, Deserialize)]
struct AccentDto {
    id: String,
    name: String,
    #[serde(rename = "previewUrl")]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoiceDto {
    name: String,
    gender: Option<String>,
    #[serde(default)]
    accents: Vec<AccentDto>,
}

#[derive(Debug, Deserialize)]
struct ListVoicesResponseBody {
    voices: Vec<VoiceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreditBalanceResponseBody {
    credits: i64,
}

#[async_trait]
impl VideoProvider for HttpVideoProvider {
    async fn create_job(&self, request: &VideoRequest) -> Result<CreateJobOutcome> {
        let body = build_create_job_body(request);
        let response = self
            .authed(self.http.post(self.url("/jobs")).json(&body))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        let body: CreateJobResponseBody = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(CreateJobOutcome {
            provider_job_id: body.id,
            status: normalize_status(&body.status),
        })
    }

    async fn check_job_status(&self, provider_job_id: &str) -> Result<JobStatusReport> {
        let response = self
            .authed(self.http.get(self.url(&format!("/jobs/{provider_job_id}"))))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        let body: JobStatusResponseBody = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(JobStatusReport {
            status: normalize_status(&body.status),
            video_url: body.video_url,
            thumbnail_url: body.thumbnail_url,
            credits_used: body.credits_used,
            error_message: body.error_message,
            progress: body.progress,
        })
    }

    async fn list_avatars(&self) -> Result<Vec<Avatar>> {
        let response = self.authed(self.http.get(self.url("/avatars"))).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        let body: ListAvatarsResponseBody = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(body
            .avatars
            .into_iter()
            .map(|dto| Avatar {
                id: dto.id,
                name: dto.name,
                gender: dto.gender,
                preview_url: dto.preview_url,
            })
            .collect())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        let response = self.authed(self.http.get(self.url("/voices"))).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        let body: ListVoicesResponseBody = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(body
            .voices
            .into_iter()
            .flat_map(|voice| {
                let name = voice.name;
                let gender = voice.gender;
                voice.accents.into_iter().map(move |accent| Voice {
                    id: accent.id,
                    name: name.clone(),
                    gender: gender.clone(),
                    accent_name: Some(accent.name),
                    preview_url: accent.preview_url,
                })
            })
            .collect())
    }

    async fn get_credit_balance(&self) -> Result<CreditBalance> {
        let response = self
            .authed(self.http.get(self.url("/credit-balance")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        let body: CreditBalanceResponseBody = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(CreditBalance { credits: body.credits })
    }
}

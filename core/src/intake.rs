use videogen_protocol::AspectRatio;
use videogen_protocol::CaptionStyle;
use videogen_protocol::Job;
use videogen_protocol::VideoRequest;
use videogen_protocol::VoiceMode;
use videogen_store::ControlPlaneStore;

use crate::error::IntakeError;

/// Defaults intake falls back to when a caller omits a field. Built from the
/// ambient configuration at the call site; intake itself never reads the
/// environment.
#[derive(Debug, Clone)]
pub struct IntakeDefaults {
    pub avatar_id: String,
    pub voice_id: String,
    pub script_text: String,
    pub product_image_url: String,
    pub aspect_ratio: AspectRatio,
    pub captions_enabled: bool,
    pub caption_style: String,
}

/// Caller-supplied submission, every field optional. Mirrors `VideoRequest`
/// but without the validation and default-filling that turns it into one.
#[derive(Debug, Clone, Default)]
pub struct PartialVideoRequest {
    pub script_text: Option<String>,
    pub audio_url: Option<String>,
    pub voice_mode: Option<VoiceMode>,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub accent_id: Option<String>,
    pub product_image_url: Option<String>,
    pub product_name: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub captions_enabled: Option<bool>,
    pub visual_style: Option<String>,
}

fn fill_defaults(partial: PartialVideoRequest, defaults: &IntakeDefaults) -> VideoRequest {
    let voice_mode = partial.voice_mode.unwrap_or(VoiceMode::Tts);
    VideoRequest {
        script_text: partial
            .script_text
            .or_else(|| Some(defaults.script_text.clone()))
            .filter(|text| !text.is_empty()),
        audio_url: partial.audio_url,
        voice_mode,
        avatar_id: partial.avatar_id.unwrap_or_else(|| defaults.avatar_id.clone()),
        voice_id: partial.voice_id.unwrap_or_else(|| defaults.voice_id.clone()),
        accent_id: partial.accent_id,
        product_image_url: partial
            .product_image_url
            .unwrap_or_else(|| defaults.product_image_url.clone()),
        product_name: partial.product_name,
        aspect_ratio: partial.aspect_ratio.unwrap_or(defaults.aspect_ratio),
        captions: CaptionStyle {
            enabled: partial.captions_enabled.unwrap_or(defaults.captions_enabled),
            style_id: defaults.caption_style.clone(),
        },
        visual_style: partial.visual_style,
    }
}

fn validate(request: &VideoRequest) -> Result<(), IntakeError> {
    match request.voice_mode {
        VoiceMode::Tts => {
            if request.script_text.as_deref().unwrap_or_default().is_empty() {
                return Err(IntakeError::MissingScriptText);
            }
        }
        VoiceMode::UserAudio => {
            if request.audio_url.as_deref().unwrap_or_default().is_empty() {
                return Err(IntakeError::MissingAudioUrl);
            }
        }
    }
    Ok(())
}

/// Fills defaults, validates, and inserts a `pending` job. Never calls the
/// provider: submission to the upstream service is the submit worker's job.
pub async fn accept_request(
    store: &ControlPlaneStore,
    user_id: &str,
    partial: PartialVideoRequest,
    defaults: &IntakeDefaults,
) -> Result<Job, IntakeError> {
    let request = fill_defaults(partial, defaults);
    validate(&request)?;
    let job = store.insert_job(user_id, &request).await?;
    Ok(job)
}

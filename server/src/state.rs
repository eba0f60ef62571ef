use std::sync::Arc;

use videogen_config::AppConfig;
use videogen_core::IntakeDefaults;
use videogen_provider::VideoProvider;
use videogen_store::ControlPlaneStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ControlPlaneStore,
    pub provider: Arc<dyn VideoProvider>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn intake_defaults(&self) -> IntakeDefaults {
        let aspect_ratio = videogen_protocol::AspectRatio::parse(&self.config.default_aspect_ratio)
            .unwrap_or(videogen_protocol::AspectRatio::Portrait9x16);
        IntakeDefaults {
            avatar_id: self.config.default_avatar_id.clone(),
            voice_id: self.config.default_voice_id.clone(),
            script_text: self.config.default_script_text.clone(),
            product_image_url: self.config.default_product_image_url.clone(),
            aspect_ratio,
            captions_enabled: self.config.default_captions_enabled,
            caption_style: self.config.default_caption_style.clone(),
        }
    }
}

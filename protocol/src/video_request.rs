use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    Tts,
    UserAudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Portrait9x16,
    Square1x1,
    Landscape16x9,
}

#[derive(Debug, Error)]
#[error("invalid aspect ratio: {0}")]
pub struct ParseAspectRatioError(pub String);

impl AspectRatio {
    /// The internal wire form, e.g. `"9:16"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Square1x1 => "1:1",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParseAspectRatioError> {
        match value {
            "9:16" => Ok(Self::Portrait9x16),
            "1:1" => Ok(Self::Square1x1),
            "16:9" => Ok(Self::Landscape16x9),
            other => Err(ParseAspectRatioError(other.to_string())),
        }
    }
}

impl Serialize for AspectRatio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        AspectRatio::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionStyle {
    pub enabled: bool,
    pub style_id: String,
}

/// Opaque structured snapshot of a render specification, carried on the job
/// record from intake through completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub script_text: Option<String>,
    pub audio_url: Option<String>,
    pub voice_mode: VoiceMode,
    pub avatar_id: String,
    pub voice_id: String,
    pub accent_id: Option<String>,
    pub product_image_url: String,
    pub product_name: Option<String>,
    pub aspect_ratio: AspectRatio,
    pub captions: CaptionStyle,
    pub visual_style: Option<String>,
}

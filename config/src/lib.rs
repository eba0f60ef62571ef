//! Process-environment configuration for the control plane binaries.
//!
//! Every required key is read exactly once at startup; a missing key fails
//! fast with a descriptive error rather than surfacing as a confusing panic
//! deep inside a worker run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("environment variable {name} has an invalid value {value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub provider_base_url: String,
    pub provider_api_key: String,
    pub database_url: PathBuf,

    pub submit_worker_max_calls: u32,
    pub submit_worker_window_secs: u64,
    pub poll_worker_max_calls: u32,
    pub poll_worker_window_secs: u64,

    pub submit_batch_size: u32,
    pub poll_batch_size: u32,

    pub default_avatar_id: String,
    pub default_voice_id: String,
    pub default_script_text: String,
    pub default_product_image_url: String,
    pub default_aspect_ratio: String,
    pub default_captions_enabled: bool,
    pub default_caption_style: String,

    pub product_image_upload_dir: PathBuf,
}

/// Indirection over `std::env::var` so tests can exercise the parsing logic
/// against a fake environment instead of mutating the real process
/// environment (which is shared, unordered, global state across tests).
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::load(&ProcessEnv)
    }

    pub fn load(env: &dyn EnvSource) -> Result<Self> {
        let database_url = required(env, "DATABASE_URL")
            .or_else(|_| required(env, "STATE_DB_PATH"))
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        Ok(Self {
            provider_base_url: required(env, "PROVIDER_BASE_URL")?,
            provider_api_key: required(env, "PROVIDER_API_KEY")?,
            database_url: PathBuf::from(database_url),

            submit_worker_max_calls: parse_with_default(env, "SUBMIT_WORKER_MAX_CALLS", 5)?,
            submit_worker_window_secs: parse_with_default(env, "SUBMIT_WORKER_WINDOW_SECS", 60)?,
            poll_worker_max_calls: parse_with_default(env, "POLL_WORKER_MAX_CALLS", 10)?,
            poll_worker_window_secs: parse_with_default(env, "POLL_WORKER_WINDOW_SECS", 60)?,

            submit_batch_size: parse_with_default(env, "SUBMIT_BATCH_SIZE", 5)?,
            poll_batch_size: parse_with_default(env, "POLL_BATCH_SIZE", 10)?,

            default_avatar_id: default_or(env, "DEFAULT_AVATAR_ID", "default-avatar"),
            default_voice_id: default_or(env, "DEFAULT_VOICE_ID", "default-voice"),
            default_script_text: default_or(env, "DEFAULT_SCRIPT_TEXT", ""),
            default_product_image_url: default_or(env, "DEFAULT_PRODUCT_IMAGE_URL", ""),
            default_aspect_ratio: default_or(env, "DEFAULT_ASPECT_RATIO", "9:16"),
            default_captions_enabled: parse_with_default(env, "DEFAULT_CAPTIONS_ENABLED", true)?,
            default_caption_style: default_or(env, "DEFAULT_CAPTION_STYLE", "default"),

            product_image_upload_dir: PathBuf::from(default_or(
                env,
                "PRODUCT_IMAGE_UPLOAD_DIR",
                "./uploads",
            )),
        })
    }
}

fn required(env: &dyn EnvSource, name: &'static str) -> Result<String> {
    env.get(name).ok_or(ConfigError::MissingVar(name))
}

fn default_or(env: &dyn EnvSource, name: &str, default: &str) -> String {
    env.get(name).unwrap_or_else(|| default.to_string())
}

fn parse_with_default<T>(env: &dyn EnvSource, name: &'static str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env.get(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::InvalidVar {
            name,
            value,
            reason: err.to_string(),
        }),
    }
}

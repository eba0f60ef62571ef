use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("scriptText is required when voiceMode is tts")]
    MissingScriptText,

    #[error("audioUrl is required when voiceMode is user_audio")]
    MissingAudioUrl,

    #[error("failed to persist job")]
    Store(#[from] videogen_store::StoreError),
}

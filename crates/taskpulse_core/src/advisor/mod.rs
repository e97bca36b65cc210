//! Language-model backed helpers. Nothing in the task core depends on these
//! calls succeeding.

mod flows;
mod openai;
mod prompts;

pub use flows::{
    BurndownSuggestion, MeetingPrep, Notification, NotificationKind, ProjectSummary,
    RedactedNotes, Sentiment, SpeakerLines, SuggestedDescription, Transcript, meeting_prep,
    notification, pick_directive, project_summary, redact_notes, suggest_burndown,
    suggest_description, transcribe_audio,
};
pub use openai::OpenAiModel;

use crate::config::ModelConfig;
use crate::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// The seam between the flows and whatever model answers them.
pub trait LanguageModel {
    /// Sends one prompt and returns the raw text answer. Callers ask for a
    /// JSON object in the prompt and parse it themselves.
    fn generate(&self, prompt: &str) -> Result<String, AppError>;

    /// Speech to text.
    fn transcribe(&self, audio: &AudioClip) -> Result<String, AppError>;
}

pub type SharedModel = std::sync::Arc<dyn LanguageModel + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    /// Decodes `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Result<Self, AppError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| AppError::invalid_input("audio must be a data URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::invalid_input("data URI has no payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::invalid_input("data URI must be base64 encoded"))?;
        if mime_type.is_empty() {
            return Err(AppError::invalid_input("data URI has no media type"));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|err| AppError::invalid_input(format!("invalid base64 audio: {err}")))?;
        if bytes.is_empty() {
            return Err(AppError::invalid_input("audio is empty"));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// File name with an extension the transcription endpoint recognises.
    pub fn file_name(&self) -> String {
        let subtype = self
            .mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or("bin");
        let extension = match subtype.split(';').next().unwrap_or(subtype) {
            "mpeg" => "mp3",
            "x-wav" | "wave" => "wav",
            "x-m4a" | "mp4" => "m4a",
            other => other,
        };
        format!("audio.{extension}")
    }
}

/// Stands in when no API key is configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledModel {
    reason: String,
}

impl DisabledModel {
    pub fn new<R: Into<String>>(reason: R) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LanguageModel for DisabledModel {
    fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::advisor(format!("language model disabled: {}", self.reason)))
    }

    fn transcribe(&self, _audio: &AudioClip) -> Result<String, AppError> {
        Err(AppError::advisor(format!("language model disabled: {}", self.reason)))
    }
}

/// An OpenAI compatible client when the key variable is set, otherwise a
/// disabled model.
pub fn model_from_config(config: &ModelConfig) -> Result<SharedModel, AppError> {
    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => {
            let model = OpenAiModel::new(config, key.trim())?;
            tracing::info!(base_url = %config.base_url, model = %config.model, "language model configured");
            Ok(std::sync::Arc::new(model))
        }
        _ => {
            tracing::warn!(env = %config.api_key_env, "no API key set, AI features disabled");
            Ok(std::sync::Arc::new(DisabledModel::new(format!(
                "{} is not set",
                config.api_key_env
            ))))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{AudioClip, DisabledModel, LanguageModel};

    #[test]
    fn decodes_data_uri() {
        let clip = AudioClip::from_data_uri("data:audio/webm;base64,aGVsbG8=").unwrap();
        assert_eq!(clip.mime_type, "audio/webm");
        assert_eq!(clip.bytes, b"hello");
        assert_eq!(clip.file_name(), "audio.webm");

        let mp3 = AudioClip::from_data_uri("data:audio/mpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(mp3.file_name(), "audio.mp3");
    }

    #[test]
    fn rejects_malformed_data_uris() {
        for uri in [
            "audio/webm;base64,aGVsbG8=",
            "data:audio/webm,aGVsbG8=",
            "data:audio/webm;base64",
            "data:audio/webm;base64,***",
            "data:;base64,aGVsbG8=",
        ] {
            let err = AudioClip::from_data_uri(uri).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "{uri}");
        }
    }

    #[test]
    fn disabled_model_reports_advisor_error() {
        let model = DisabledModel::new("OPENAI_API_KEY is not set");
        let err = model.generate("hi").unwrap_err();
        assert_eq!(err.code(), "advisor_error");
        assert!(err.message().contains("OPENAI_API_KEY"));
    }
}

use super::{AudioClip, LanguageModel};
use crate::config::ModelConfig;
use crate::error::AppError;
use reqwest::blocking::{Client, Response, multipart};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an OpenAI compatible API. A fresh blocking client is built per
/// call so the model can be shared with an async runtime and dropped there.
#[derive(Debug, Clone)]
pub struct OpenAiModel {
    base_url: String,
    model: String,
    transcription_model: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiModel {
    pub fn new(config: &ModelConfig, api_key: &str) -> Result<Self, AppError> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::invalid_data(format!(
                "model.base_url must be an http(s) URL, got {base_url:?}"
            )));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            model: config.model.clone(),
            transcription_model: config.transcription_model.clone(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    fn client(&self) -> Result<Client, AppError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(AppError::from)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl LanguageModel for OpenAiModel {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "chat completion request");
        let response = self
            .client()?
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;
        let body: ChatResponse = check_response(response)?.json()?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::advisor("model returned no content"))
    }

    fn transcribe(&self, audio: &AudioClip) -> Result<String, AppError> {
        let file = multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name())
            .mime_str(&audio.mime_type)?;
        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file);

        tracing::debug!(model = %self.transcription_model, bytes = audio.bytes.len(), "transcription request");
        let response = self
            .client()?
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;
        let body: TranscriptionResponse = check_response(response)?.json()?;
        Ok(body.text)
    }
}

/// Non-success statuses become advisor errors carrying the status and body.
fn check_response(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "language model request failed");
    Err(AppError::advisor(format!(
        "model API returned {}: {}",
        status.as_u16(),
        body.trim()
    )))
}

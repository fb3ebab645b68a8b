use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AudioClip, Provider, SpeechToText};
use crate::app_config::OpenAIConfig;
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// OpenAI client for chat completions and audio transcriptions
#[derive(Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, including the `/v1` prefix
    endpoint: String,
    /// Model used by `/audio/transcriptions`
    transcription_model: String,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("endpoint", &self.endpoint)
            .field("transcription_model", &self.transcription_model)
            .finish_non_exhaustive()
    }
}

/// Chat completion request
#[derive(Debug, Serialize, Default)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Output format constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// `response_format` object
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices, first one used
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// Individual choice in a chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl OpenAIRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask for a single JSON object as output
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[OpenAIMessage] {
        &self.messages
    }

    pub fn get_temperature(&self) -> Option<f32> {
        self.temperature
    }
}

impl OpenAIResponse {
    /// Response carrying a single assistant message
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        }
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_timeout(api_key, endpoint, Duration::from_secs(60))
    }

    /// Create a new OpenAI client with a custom request timeout
    pub fn with_timeout(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint.trim_end_matches('/').to_string()
            },
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }

    /// Create a client from the `openai` configuration section
    pub fn from_config(config: &OpenAIConfig) -> Self {
        Self::with_timeout(
            config.api_key.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .transcription_model(config.transcription_model.clone())
    }

    /// Set the speech-to-text model
    pub fn transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    /// API base URL in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Turn a non-success response into a provider error
    async fn check_status(response: Response, api: &str) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("OpenAI {} error ({}): {}", api, status, error_text);
        Err(ProviderError::from_status(status.as_u16(), error_text))
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        debug!("Sending chat completion request to OpenAI ({})", request.model);

        let response = self.client.post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response, "chat").await?;

        response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI chat response: {}", e)))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self.client.get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::check_status(response, "models").await?;
        Ok(())
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response.choices.first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechToText for OpenAI {
    async fn transcribe(&self, audio: AudioClip) -> Result<String, ProviderError> {
        debug!(
            "Sending {} bytes of audio ({}) to OpenAI for transcription",
            audio.data.len(),
            audio.content_type_or_default()
        );

        let new_part = || {
            Part::bytes(audio.data.to_vec()).file_name(audio.file_name_or_default().to_string())
        };
        let content_type = audio.content_type_or_default();
        let part = match new_part().mime_str(content_type) {
            Ok(part) => part,
            Err(e) => {
                warn!("Ignoring invalid audio content type '{}': {}", content_type, e);
                new_part().mime_str(AudioClip::DEFAULT_CONTENT_TYPE)?
            }
        };

        let form = Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", part);

        let response = self.client.post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response, "transcription").await?;

        let body = response.json::<TranscriptionResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI transcription response: {}", e)))?;

        Ok(body.text)
    }
}

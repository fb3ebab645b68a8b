/*!
 * Mock provider implementations for testing.
 *
 * These stand in for the OpenAI client without any network access:
 * - `MockProvider::working(content)` - Always answers with the given content
 * - `MockProvider::garbled()` - Answers with text that is not JSON
 * - `MockProvider::failing()` - Always fails with an API error
 * - `MockTranscriber` - Fixed transcript or failure for speech-to-text
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::openai::{OpenAIRequest, OpenAIResponse};
use crate::providers::{AudioClip, Provider, SpeechToText};

/// Behavior mode for the mock chat provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with this message content
    Working(String),
    /// Succeeds with content that is not a JSON object
    Garbled,
    /// Succeeds with no choices at all
    Empty,
    /// Always fails with a 500 from the API
    Failing,
    /// Always fails as if the network were down
    Unreachable,
}

/// Mock chat provider
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `complete` calls
    request_count: Arc<AtomicUsize>,
    /// User prompts received, in call order
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider answering with `content`
    pub fn working(content: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working(content.into()))
    }

    /// Create a mock that answers with non-JSON text
    pub fn garbled() -> Self {
        Self::new(MockBehavior::Garbled)
    }

    /// Create a mock that answers with no choices
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose requests never reach the API
    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Last user prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(user) = request.messages().iter().rev().find(|m| m.role == "user") {
            self.prompts.lock().push(user.content.clone());
        }

        match &self.behavior {
            MockBehavior::Working(content) => Ok(OpenAIResponse::from_content(content.clone())),
            MockBehavior::Garbled => Ok(OpenAIResponse::from_content(
                "Great job! Here are some tips: read slowly.",
            )),
            MockBehavior::Empty => Ok(OpenAIResponse {
                choices: Vec::new(),
                usage: None,
            }),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated API failure".to_string(),
            }),
            MockBehavior::Unreachable => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing | MockBehavior::Unreachable => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}

/// Mock speech-to-text service
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    /// Transcript to return, or `None` to fail
    transcript: Option<String>,
    /// Sizes of the clips received
    received: Arc<Mutex<Vec<usize>>>,
}

impl MockTranscriber {
    /// Always returns `transcript`
    pub fn working(transcript: impl Into<String>) -> Self {
        Self {
            transcript: Some(transcript.into()),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fails with an upstream error
    pub fn failing() -> Self {
        Self {
            transcript: None,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Byte sizes of the clips received so far
    pub fn received_sizes(&self) -> Vec<usize> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl SpeechToText for MockTranscriber {
    async fn transcribe(&self, audio: AudioClip) -> Result<String, ProviderError> {
        self.received.lock().push(audio.data.len());

        match &self.transcript {
            Some(text) => Ok(text.clone()),
            None => Err(ProviderError::ApiError {
                status_code: 400,
                message: "Invalid file format.".to_string(),
            }),
        }
    }
}

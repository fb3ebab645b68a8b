/*!
 * AI reading coach.
 *
 * Turns a reading attempt (passage, transcript, misread words) into
 * child-friendly encouragement, per-word tips and comprehension questions.
 * Coaching never fails a request: any upstream or parsing problem is replaced
 * by fixed fallback feedback.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::app_config::OpenAIConfig;
use crate::errors::ProviderError;
use crate::providers::openai::{OpenAIRequest, OpenAIResponse};
use crate::providers::Provider;

pub mod feedback;
pub mod prompts;

pub use feedback::{CoachFeedback, Tip};

/// One reading attempt to comment on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingRequest {
    /// Passage the child was asked to read
    #[serde(default)]
    pub target: String,
    /// What the speech-to-text service heard
    #[serde(default)]
    pub transcript: String,
    /// Target words the child missed
    #[serde(default)]
    pub misreads: Vec<String>,
}

impl CoachingRequest {
    pub fn new(target: impl Into<String>, transcript: impl Into<String>, misreads: Vec<String>) -> Self {
        Self {
            target: target.into(),
            transcript: transcript.into(),
            misreads,
        }
    }
}

/// Source of coaching feedback
#[async_trait]
pub trait Coach: Send + Sync + Debug {
    /// Ask for feedback, reporting upstream and parsing failures
    async fn coach(&self, request: &CoachingRequest) -> Result<CoachFeedback, ProviderError>;

    /// Ask for feedback, substituting the fallback on any failure
    async fn coach_or_fallback(&self, request: &CoachingRequest) -> CoachFeedback {
        match self.coach(request).await {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!("Coaching feedback unavailable, using fallback: {}", e);
                CoachFeedback::fallback()
            }
        }
    }
}

/// Coach backed by a chat-completion provider
#[derive(Debug)]
pub struct ReadingCoach<P> {
    provider: P,
    model: String,
    temperature: f32,
}

impl<P> ReadingCoach<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    pub fn new(provider: P, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Create a coach using the model settings from the `openai` section
    pub fn from_config(provider: P, config: &OpenAIConfig) -> Self {
        Self::new(provider, config.chat_model.clone(), config.temperature)
    }

    /// Chat request for a reading attempt
    pub fn build_request(&self, request: &CoachingRequest) -> OpenAIRequest {
        OpenAIRequest::new(self.model.clone())
            .add_message("system", prompts::SYSTEM_PROMPT)
            .add_message("user", prompts::render_user_prompt(request))
            .temperature(self.temperature)
            .json_object()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> Coach for ReadingCoach<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    async fn coach(&self, request: &CoachingRequest) -> Result<CoachFeedback, ProviderError> {
        let response = self.provider.complete(self.build_request(request)).await?;
        let content = P::extract_text(&response);

        let feedback = CoachFeedback::parse(&content);
        if let Err(e) = &feedback {
            debug!("Unparseable coaching response ({}): {}", e, content);
        }
        feedback
    }
}

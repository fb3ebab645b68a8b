/*!
 * Provider implementations for the external AI services.
 *
 * This module contains the seams the web layer talks to and their clients:
 * - `Provider`: chat completion, used to generate coaching feedback
 * - `SpeechToText`: audio transcription
 * - `openai`: OpenAI API client implementing both
 * - `mock`: in-process stand-ins for tests
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the coaching service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// Uploaded audio waiting to be transcribed
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Raw encoded audio
    pub data: Bytes,
    /// Client-supplied file name
    pub file_name: Option<String>,
    /// Client-supplied MIME type
    pub content_type: Option<String>,
}

impl AudioClip {
    /// Browser recordings arrive as WebM unless told otherwise
    pub const DEFAULT_FILE_NAME: &'static str = "audio.webm";
    pub const DEFAULT_CONTENT_TYPE: &'static str = "audio/webm";

    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name to send upstream
    pub fn file_name_or_default(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(Self::DEFAULT_FILE_NAME)
    }

    /// MIME type to send upstream
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(Self::DEFAULT_CONTENT_TYPE)
    }
}

/// Speech-to-text service
///
/// Failures are returned as-is; callers surface them rather than retrying.
#[async_trait]
pub trait SpeechToText: Send + Sync + Debug {
    /// Transcribe an audio clip into plain text
    async fn transcribe(&self, audio: AudioClip) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod openai;

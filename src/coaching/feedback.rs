/*!
 * Coaching feedback and the parsing of model output into it.
 */

use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Encouragement used when the model omits it
pub const DEFAULT_ENCOURAGEMENT: &str = "Nice reading!";

/// Encouragement used when no usable feedback came back at all
pub const FALLBACK_ENCOURAGEMENT: &str = "Nice reading! Keep it up.";

/// A practice tip for one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub tip: String,
}

/// Feedback shown to the child after a reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachFeedback {
    pub encouragement: String,
    pub tips: Vec<Tip>,
    pub questions: Vec<String>,
}

impl CoachFeedback {
    /// Fixed feedback substituted for failed or malformed responses
    pub fn fallback() -> Self {
        Self {
            encouragement: FALLBACK_ENCOURAGEMENT.to_string(),
            tips: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Parse model output, filling in any missing key with its default
    ///
    /// The content must be a JSON object; keys present with the wrong type
    /// make the whole response unusable.
    pub fn parse(content: &str) -> Result<Self, ProviderError> {
        let raw: RawFeedback = serde_json::from_str(content.trim())
            .map_err(|e| ProviderError::ParseError(format!("Invalid coaching feedback: {}", e)))?;

        Ok(Self {
            encouragement: raw
                .encouragement
                .unwrap_or_else(|| DEFAULT_ENCOURAGEMENT.to_string()),
            tips: raw.tips.unwrap_or_default(),
            questions: raw.questions.unwrap_or_default(),
        })
    }
}

impl Default for CoachFeedback {
    fn default() -> Self {
        Self::fallback()
    }
}

#[derive(Debug, Deserialize)]
struct RawFeedback {
    #[serde(default)]
    encouragement: Option<String>,
    #[serde(default)]
    tips: Option<Vec<Tip>>,
    #[serde(default)]
    questions: Option<Vec<String>>,
}

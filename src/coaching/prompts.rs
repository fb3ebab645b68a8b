/*!
 * Prompt templates for reading feedback.
 */

use super::CoachingRequest;

/// System message sent with every coaching request
pub const SYSTEM_PROMPT: &str = "You speak simply and kindly to children.";

/// Instructions preceding the passage, transcript and misread words
pub const TUTOR_INSTRUCTIONS: &str = "You are a kind reading tutor for a 7–9 year old child.
Always respond ONLY with a valid JSON object that has these exact keys:
encouragement (string),
tips (list of objects {word, tip}),
questions (list of 2 short comprehension questions).";

/// Render the user prompt for a coaching request
pub fn render_user_prompt(request: &CoachingRequest) -> String {
    let misreads = if request.misreads.is_empty() {
        "none".to_string()
    } else {
        request.misreads.join(", ")
    };

    format!(
        "{}\nTARGET PASSAGE: {}\nCHILD'S TRANSCRIPT: {}\nMISREAD WORDS: {}",
        TUTOR_INSTRUCTIONS, request.target, request.transcript, misreads
    )
}

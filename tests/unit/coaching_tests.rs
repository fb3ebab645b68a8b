/*!
 * Tests for coaching prompts and feedback handling
 */

use readtogether::coaching::feedback::{DEFAULT_ENCOURAGEMENT, FALLBACK_ENCOURAGEMENT};
use readtogether::coaching::{Coach, CoachFeedback, CoachingRequest, ReadingCoach};
use readtogether::providers::mock::MockProvider;

fn cat_request() -> CoachingRequest {
    CoachingRequest::new(
        "The cat sat on the mat",
        "The cat sit on mat",
        vec!["sat".to_string(), "the".to_string()],
    )
}

#[test]
fn test_coachFeedback_parse_withMissingKeys_shouldFillDefaults() {
    let feedback = CoachFeedback::parse(r#"{"tips": [{"word": "sat", "tip": "Say s-a-t."}]}"#).unwrap();

    assert_eq!(feedback.encouragement, DEFAULT_ENCOURAGEMENT);
    assert_eq!(feedback.tips.len(), 1);
    assert!(feedback.questions.is_empty());
}

#[test]
fn test_coachFeedback_parse_withProse_shouldFail() {
    assert!(CoachFeedback::parse("Well done, keep reading!").is_err());
}

#[test]
fn test_coachFeedback_fallback_shouldBeFixed() {
    let fallback = CoachFeedback::fallback();
    assert_eq!(fallback.encouragement, FALLBACK_ENCOURAGEMENT);
    assert!(fallback.tips.is_empty());
    assert!(fallback.questions.is_empty());
}

#[test]
fn test_coachingRequest_fromJson_withMissingFields_shouldDefault() {
    let request: CoachingRequest = serde_json::from_str(r#"{"target": "a b"}"#).unwrap();
    assert_eq!(request.target, "a b");
    assert_eq!(request.transcript, "");
    assert!(request.misreads.is_empty());
}

#[tokio::test]
async fn test_readingCoach_shouldSendMisreadsInPrompt() {
    let provider = MockProvider::working(r#"{"encouragement": "Great job!", "questions": ["Where did the cat sit?"]}"#);
    let coach = ReadingCoach::new(provider, "gpt-4o-mini", 0.6);

    let feedback = coach.coach_or_fallback(&cat_request()).await;

    assert_eq!(feedback.encouragement, "Great job!");
    assert_eq!(feedback.questions, vec!["Where did the cat sit?"]);

    let prompt = coach.provider().last_prompt().expect("prompt should be recorded");
    assert!(prompt.contains("TARGET PASSAGE: The cat sat on the mat"));
    assert!(prompt.contains("MISREAD WORDS: sat, the"));
}

#[tokio::test]
async fn test_readingCoach_withUnreachableProvider_shouldFallBack() {
    let coach = ReadingCoach::new(MockProvider::unreachable(), "gpt-4o-mini", 0.6);

    assert!(coach.coach(&cat_request()).await.is_err());
    assert_eq!(coach.coach_or_fallback(&cat_request()).await, CoachFeedback::fallback());
}

#[tokio::test]
async fn test_readingCoach_withWrongTypes_shouldFallBack() {
    let coach = ReadingCoach::new(MockProvider::working(r#"{"tips": "read slowly"}"#), "gpt-4o-mini", 0.6);
    assert_eq!(coach.coach_or_fallback(&cat_request()).await, CoachFeedback::fallback());
}

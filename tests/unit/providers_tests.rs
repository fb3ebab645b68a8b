/*!
 * Tests for the OpenAI client against a local stand-in API
 */

use axum::{
    extract::Multipart,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use readtogether::errors::ProviderError;
use readtogether::providers::openai::{OpenAI, OpenAIRequest};
use readtogether::providers::{AudioClip, Provider, SpeechToText};

/// Echoes the multipart fields it received as the transcript
async fn fake_transcriptions(mut multipart: Multipart) -> Json<Value> {
    let mut model = String::new();
    let mut file = String::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "model" => model = field.text().await.unwrap_or_default(),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                file = format!("{} {} {}", file_name, content_type, size);
            }
            _ => {}
        }
    }

    Json(json!({ "text": format!("{} {}", model, file) }))
}

/// Answers with the requested model and response format as JSON content
async fn fake_chat(Json(body): Json<Value>) -> Json<Value> {
    let content = json!({
        "encouragement": format!("model={}", body["model"].as_str().unwrap_or_default()),
        "questions": [body["response_format"]["type"].as_str().unwrap_or_default()],
    });

    Json(json!({
        "choices": [{
            "message": { "role": "assistant", "content": content.to_string() },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    }))
}

async fn spawn_fake_api(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/v1", addr)
}

async fn working_api() -> String {
    let app = Router::new()
        .route("/v1/audio/transcriptions", post(fake_transcriptions))
        .route("/v1/chat/completions", post(fake_chat))
        .route("/v1/models", get(|| async { Json(json!({ "data": [] })) }));
    spawn_fake_api(app).await
}

#[tokio::test]
async fn test_openai_transcribe_shouldSendModelAndDefaultFileMetadata() {
    let client = OpenAI::new("test-key", working_api().await);

    let text = client.transcribe(AudioClip::new(vec![0u8; 32])).await.unwrap();

    assert_eq!(text, "whisper-1 audio.webm audio/webm 32");
}

#[tokio::test]
async fn test_openai_transcribe_shouldKeepClientFileMetadata() {
    let client = OpenAI::new("test-key", working_api().await).transcription_model("whisper-2");
    let clip = AudioClip::new(vec![1u8; 4])
        .with_file_name("reading.wav")
        .with_content_type("audio/wav");

    let text = client.transcribe(clip).await.unwrap();

    assert_eq!(text, "whisper-2 reading.wav audio/wav 4");
}

#[tokio::test]
async fn test_openai_transcribe_withInvalidContentType_shouldUseWebmDefault() {
    let client = OpenAI::new("test-key", working_api().await);
    let clip = AudioClip::new(vec![1u8; 4]).with_content_type("garbage");

    let text = client.transcribe(clip).await.unwrap();

    assert_eq!(text, "whisper-1 audio.webm audio/webm 4");
}

#[tokio::test]
async fn test_openai_complete_shouldRoundTripChatRequest() {
    let client = OpenAI::new("test-key", working_api().await);
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("user", "hello")
        .json_object();

    let response = client.complete(request).await.unwrap();
    let text = OpenAI::extract_text(&response);
    let content: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(content["encouragement"], "model=gpt-4o-mini");
    assert_eq!(content["questions"][0], "json_object");
    assert_eq!(response.usage.map(|u| u.prompt_tokens), Some(10));
}

#[tokio::test]
async fn test_openai_testConnection_withWorkingApi_shouldSucceed() {
    let client = OpenAI::new("test-key", working_api().await);
    assert!(client.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_openai_withRejectedKey_shouldBeAuthenticationError() {
    let app = Router::new().fallback(|| async { (StatusCode::UNAUTHORIZED, "Incorrect API key provided") });
    let client = OpenAI::new("bad-key", spawn_fake_api(app).await);

    let result = client.transcribe(AudioClip::new(vec![0u8; 8])).await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(ref m)) if m.contains("Incorrect API key")));
}

#[tokio::test]
async fn test_openai_whenRateLimited_shouldBeRateLimitError() {
    let app = Router::new().fallback(|| async { (StatusCode::TOO_MANY_REQUESTS, "Rate limit reached") });
    let client = OpenAI::new("test-key", spawn_fake_api(app).await);

    let result = client.complete(OpenAIRequest::new("gpt-4o-mini")).await;

    assert!(matches!(result, Err(ProviderError::RateLimitExceeded(_))));
}

#[tokio::test]
async fn test_openai_withMalformedBody_shouldBeParseError() {
    let app = Router::new().fallback(|| async { "not json" });
    let client = OpenAI::new("test-key", spawn_fake_api(app).await);

    let result = client.transcribe(AudioClip::new(vec![0u8; 8])).await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_openai_withNothingListening_shouldBeConnectionError() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OpenAI::new("test-key", format!("http://{}/v1", addr));
    let result = client.test_connection().await;

    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

/*!
 * End-to-end tests of the HTTP API over a local socket
 */

use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use readtogether::providers::mock::{MockProvider, MockTranscriber};

use crate::common::{self, TEST_UPLOAD_LIMIT};

async fn spawn_default_server() -> String {
    let state = common::create_test_state(
        MockTranscriber::working("the cat sit on mat"),
        MockProvider::working(r#"{"encouragement": "You did it!", "tips": [], "questions": ["Who sat?"]}"#),
    )
    .unwrap();
    common::spawn_test_server(state).await.unwrap()
}

fn audio_form(size: usize) -> Form {
    let part = Part::bytes(vec![7u8; size]).file_name("recording.webm");
    Form::new().part("audio", part)
}

#[tokio::test]
async fn test_health_shouldReportOk() {
    let base = spawn_default_server().await;

    let response = reqwest::get(format!("{}/api/health", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_evaluate_shouldReturnWordReport() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/evaluate", base))
        .json(&json!({ "target": "The cat sat on the mat", "transcript": "The cat sit on mat" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["accuracy"], 66.7);
    assert_eq!(body["words"].as_array().map(|w| w.len()), Some(6));
    assert_eq!(body["words"][2], json!({ "word": "sat", "status": "misread" }));
    assert_eq!(body["words"][5], json!({ "word": "mat", "status": "ok" }));
}

#[tokio::test]
async fn test_evaluate_withEmptyBody_shouldScoreNothing() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/evaluate", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "words": [], "accuracy": 0.0 }));
}

#[tokio::test]
async fn test_evaluate_withoutContentType_shouldStillParseBody() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/evaluate", base))
        .body(r#"{"target": "a b c", "transcript": "a b c"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["accuracy"], 100.0);
}

#[tokio::test]
async fn test_coach_withTextPlainBody_shouldStillParseBody() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/coach", base))
        .header("Content-Type", "text/plain")
        .body(r#"{"target": "The cat sat", "misreads": ["sat"]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["encouragement"], "You did it!");
}

#[tokio::test]
async fn test_evaluate_withMalformedBody_shouldReturnErrorEnvelope() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/evaluate", base))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| e.starts_with("Invalid JSON body")));
}

#[tokio::test]
async fn test_createAssignment_withMalformedBody_shouldReturnErrorEnvelope() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/assignments", base))
        .body("title=Cats")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_transcribe_withAudio_shouldReturnText() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/transcribe", base))
        .multipart(audio_form(128))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "text": "the cat sit on mat" }));
}

#[tokio::test]
async fn test_transcribe_withoutAudioField_shouldBeBadRequest() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/transcribe", base))
        .multipart(Form::new().text("note", "no recording"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No audio file received" }));
}

#[tokio::test]
async fn test_transcribe_withUpstreamFailure_shouldBeServerError() {
    let state = common::create_test_state(MockTranscriber::failing(), MockProvider::garbled()).unwrap();
    let base = common::spawn_test_server(state).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/transcribe", base))
        .multipart(audio_form(16))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| e.contains("Invalid file format.")));
}

#[tokio::test]
async fn test_transcribe_withOversizedUpload_shouldBeRejected() {
    let transcriber = MockTranscriber::working("never");
    let state = common::create_test_state(transcriber.clone(), MockProvider::garbled()).unwrap();
    let base = common::spawn_test_server(state).await.unwrap();
    let client = reqwest::Client::new();

    let result = client
        .post(format!("{}/api/transcribe", base))
        .multipart(audio_form(TEST_UPLOAD_LIMIT * 2))
        .send()
        .await;

    // The server may close the connection before the whole body is sent
    if let Ok(response) = result {
        assert!(response.status().is_client_error());
    }
    assert!(transcriber.received_sizes().is_empty());
}

#[tokio::test]
async fn test_coach_shouldReturnModelFeedback() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/coach", base))
        .json(&json!({ "target": "The cat sat", "transcript": "The cat sit", "misreads": ["sat"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["encouragement"], "You did it!");
    assert_eq!(body["questions"], json!(["Who sat?"]));
}

#[tokio::test]
async fn test_coach_withFailingModel_shouldReturnFallback() {
    let state = common::create_test_state(MockTranscriber::working(""), MockProvider::failing()).unwrap();
    let base = common::spawn_test_server(state).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/coach", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "encouragement": "Nice reading! Keep it up.", "tips": [], "questions": [] })
    );
}

#[tokio::test]
async fn test_cors_shouldAllowAnyOrigin() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", base))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    let allowed = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(allowed.as_deref(), Some("*"));
}

#[tokio::test]
async fn test_assignmentLifecycle_overHttp() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(format!("{}/api/assignments", base))
        .json(&json!({ "teacher_id": "ms-lee", "title": "Cats", "passage": "The cat sat on the mat." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let assignment: Value = response.json().await.unwrap();
    let id = assignment["id"].as_str().unwrap().to_string();

    // Submit a reading
    let response = client
        .post(format!("{}/api/assignments/{}/submissions", base, id))
        .json(&json!({ "student_id": "sam", "transcript": "the cat sit on mat" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let submitted: Value = response.json().await.unwrap();
    assert_eq!(submitted["submission"]["accuracy"], 66.7);
    assert_eq!(submitted["submission"]["words_missed"], json!(["sat", "the"]));
    assert_eq!(submitted["report"]["words"].as_array().map(|w| w.len()), Some(6));

    // Summary and listings
    let summary: Value = client
        .get(format!("{}/api/assignments/{}/summary", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["submission_count"], 1);
    assert_eq!(summary["best_accuracy"], 66.7);

    let mine: Value = client
        .get(format!("{}/api/assignments?teacher_id=ms-lee", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().map(|a| a.len()), Some(1));

    let students: Value = client
        .get(format!("{}/api/students/sam/submissions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(students.as_array().map(|a| a.len()), Some(1));

    // Delete
    let response = client
        .delete(format!("{}/api/assignments/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(format!("{}/api/assignments/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| e.contains(&id)));
}

#[tokio::test]
async fn test_createAssignment_withoutTitle_shouldBeBadRequest() {
    let base = spawn_default_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/assignments", base))
        .json(&json!({ "teacher_id": "ms-lee", "passage": "Some words." }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Assignment title is required" }));
}

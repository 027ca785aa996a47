//! End-to-end tests of the HTTP routes with scripted tools.

use crate::helpers::{FAKE_MP3, mock_tts, start_server, test_config, url, write_script};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use orflax::answer::FALLBACK_RESPONSE;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANSWER: &str = r#"{"response": "Paris is the capital of France.", "sources": ["data/france.md", null]}"#;

#[tokio::test]
async fn health_route_says_hello() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let server = start_server(&test_config(dir.path(), &tts.uri(), ANSWER)).await;

    let resp = reqwest::get(url(&server, "/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.text().await.unwrap(), "Hello World!");
}

#[tokio::test]
async fn chat_returns_one_message_with_media() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let config = test_config(dir.path(), &tts.uri(), ANSWER);
    let server = start_server(&config).await;

    let resp = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "What is the capital of France?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["userPrompt"], "What is the capital of France?");
    assert!(body.get("sources").is_none());
    let messages = body["aiMessages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let msg = &messages[0];
    assert_eq!(msg["text"], "Paris is the capital of France.");
    assert_eq!(msg["facialExpression"], "smile");
    assert_eq!(msg["animation"], "Talking_1");
    assert_eq!(msg["audio"], STANDARD.encode(FAKE_MP3));
    assert_eq!(msg["lipsync"]["mouthCues"][0]["value"], "B");

    // Request artifacts are cleaned up.
    let leftovers = std::fs::read_dir(&config.pipeline.artifact_dir).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn synthesis_request_carries_key_text_and_voice() {
    let dir = tempfile::tempdir().unwrap();
    let tts = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/9BWtsMINqrJLrRacOk9x"))
        .and(header("xi-api-key", "test-key"))
        .and(body_partial_json(json!({
            "text": "Paris is the capital of France.",
            "model_id": "eleven_multilingual_v2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
        .expect(1)
        .mount(&tts)
        .await;

    let server = start_server(&test_config(dir.path(), &tts.uri(), ANSWER)).await;
    let resp = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "capital?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn empty_message_gets_the_scripted_intro() {
    let dir = tempfile::tempdir().unwrap();
    let tts = MockServer::start().await;
    // Nothing may reach the speech provider.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&tts)
        .await;

    let config = test_config(dir.path(), &tts.uri(), ANSWER);
    std::fs::create_dir_all(&config.scripts.dir).unwrap();
    std::fs::write(config.scripts.dir.join("intro_0.wav"), b"RIFF-intro-0").unwrap();
    std::fs::write(config.scripts.dir.join("intro_0.json"), r#"{"mouthCues":[]}"#).unwrap();
    let server = start_server(&config).await;

    let first: Value = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "  "}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first["userPrompt"], "");
    let messages = first["aiMessages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "Hey dear... How was your day?");
    assert_eq!(messages[0]["audio"], STANDARD.encode(b"RIFF-intro-0"));
    assert_eq!(messages[1]["facialExpression"], "angry");
    assert_eq!(messages[1]["animation"], "Angry");
    // intro_1 assets are absent.
    assert!(messages[1].get("audio").is_none());
}

#[tokio::test]
async fn missing_speech_key_fails_at_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let tts = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": {"status": "invalid_api_key", "message": "Invalid API key"}
        })))
        .expect(1)
        .mount(&tts)
        .await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.tts.api_key.clear();
    let server = start_server(&config).await;

    let resp = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid API key"));
}

#[tokio::test]
async fn missing_speech_key_returns_reminder_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.tts.api_key.clear();
    config.chat.key_reminder = true;
    let server = start_server(&config).await;

    let body: Value = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["userPrompt"], "hello");
    assert_eq!(
        body["aiMessages"][0]["text"],
        "Please my dear, don't forget to add your API keys!"
    );
    assert_eq!(body["aiMessages"][1]["animation"], "Laughing");
}

#[tokio::test]
async fn broken_answer_backend_is_spoken_as_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.answer.program = write_script(dir.path(), "broken", "echo boom >&2\nexit 3");
    let server = start_server(&config).await;

    let resp = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["aiMessages"][0]["text"], FALLBACK_RESPONSE);
}

#[tokio::test]
async fn tool_failure_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.tools.rhubarb = write_script(dir.path(), "bad-rhubarb", "echo 'no model' >&2\nexit 1");
    let server = start_server(&config).await;

    let resp = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("rhubarb failed"), "{error}");
}

#[tokio::test]
async fn sources_appear_when_exposed() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.chat.expose_sources = true;
    let server = start_server(&config).await;

    let body: Value = reqwest::Client::new()
        .post(url(&server, "/chat"))
        .json(&json!({"message": "capital?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["sources"], json!(["data/france.md"]));
}

#[tokio::test]
async fn concurrent_requests_do_not_share_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let mut config = test_config(dir.path(), &tts.uri(), ANSWER);
    config.pipeline.keep_artifacts = true;
    let server = start_server(&config).await;

    let client = reqwest::Client::new();
    let send = |text: &'static str| {
        let client = client.clone();
        let endpoint = url(&server, "/chat");
        async move {
            client
                .post(endpoint)
                .json(&json!({"message": text}))
                .send()
                .await
                .unwrap()
                .status()
        }
    };
    let (a, b) = tokio::join!(send("first"), send("second"));
    assert_eq!(a, 200);
    assert_eq!(b, 200);

    let request_dirs = std::fs::read_dir(&config.pipeline.artifact_dir).unwrap().count();
    assert_eq!(request_dirs, 2);
}

#[tokio::test]
async fn voices_pass_through_and_upstream_errors_are_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let tts = mock_tts().await;
    let server = start_server(&test_config(dir.path(), &tts.uri(), ANSWER)).await;

    let body: Value = reqwest::get(url(&server, "/voices"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["voices"][0]["name"], "Aria");

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": {"message": "Invalid API key"}
        })))
        .mount(&failing)
        .await;
    let other_dir = tempfile::tempdir().unwrap();
    let server = start_server(&test_config(other_dir.path(), &failing.uri(), ANSWER)).await;
    let resp = reqwest::get(url(&server, "/voices")).await.unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid API key"));
}

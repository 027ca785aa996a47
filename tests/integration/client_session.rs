//! Chat session behaviour against a mocked chat endpoint.

use orflax::client::{ChatSession, ClientError, FETCH_FAILURE_TEXT, PlaybackState, Speaker};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(texts: &[&str]) -> serde_json::Value {
    let messages: Vec<_> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            json!({
                "index": i,
                "text": t,
                "facialExpression": "smile",
                "animation": "Talking_1",
                "audio": "AAAA",
                "lipsync": {"mouthCues": []}
            })
        })
        .collect();
    json!({"userPrompt": "hi", "aiMessages": messages})
}

#[tokio::test]
async fn reply_is_logged_and_queued() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"message": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(&["one", "two"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(format!("{}/", server.uri()));
    assert_eq!(session.send("hi").await.unwrap(), 2);

    assert_eq!(session.queue().state(), PlaybackState::Playing);
    assert_eq!(session.current().unwrap().text, "one");

    let entries = session.log().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].from, Speaker::User);
    assert_eq!(entries[0].text, "hi");
    assert_eq!(entries[2].from, Speaker::Ai);
    assert_eq!(entries[2].text, "two");
}

#[tokio::test]
async fn sending_while_a_message_plays_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(&["one"])))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(server.uri());
    session.send("hi").await.unwrap();

    let err = session.send("again").await.unwrap_err();
    assert!(matches!(err, ClientError::Busy));
    // The refused turn is not logged.
    assert_eq!(session.log().entries().len(), 2);

    assert_eq!(session.message_played().unwrap().text, "one");
    assert_eq!(session.queue().state(), PlaybackState::Idle);
    assert!(session.message_played().is_none());
    session.send("again").await.unwrap();
}

#[tokio::test]
async fn server_error_logs_apology_and_leaves_queue_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(server.uri());
    let err = session.send("hi").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    assert!(!session.is_busy());
    assert_eq!(session.queue().state(), PlaybackState::Idle);

    let log = session.log().export_text().unwrap();
    assert_eq!(log, format!("You: hi\n\nAI: {FETCH_FAILURE_TEXT}"));
}

#[tokio::test]
async fn unreachable_server_logs_apology() {
    // Port 9 (discard) is not expected to host an HTTP server.
    let mut session = ChatSession::new("http://127.0.0.1:9");
    assert!(session.send("hi").await.is_err());
    assert_eq!(
        session.log().entries().last().unwrap().text,
        FETCH_FAILURE_TEXT
    );
}

#[tokio::test]
async fn malformed_reply_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(server.uri());
    let err = session.send("hi").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(session.log().entries().len(), 2);
}

#[tokio::test]
async fn stop_clears_the_queue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(&["a", "b"])))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(server.uri());
    session.send("hi").await.unwrap();
    session.stop();
    assert!(session.current().is_none());
    assert!(!session.is_busy());
}

//! Integration tests for the chat session against a mocked Gemini server.
//!
//! These tests drive the real streaming client through wiremock SSE bodies
//! to verify chunk assembly, the send guards and the fallback contract.

use lumina::chat::{ChatSession, Role, SendOutcome, TurnState, CHAT_FALLBACK_MESSAGE};
use lumina::provider::{ClientConfig, GeminiClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-3-flash-preview";

async fn session_against(server: &MockServer) -> ChatSession<GeminiClient> {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_max_retries(0)
        .with_timeout_ms(5_000);
    let client = GeminiClient::new("test-key", config).expect("client");
    ChatSession::new(client, MODEL)
}

fn sse_chunks(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!(
            "data: {{\"candidates\": [{{\"content\": {{\"role\": \"model\", \"parts\": [{{\"text\": \"{chunk}\"}}]}}}}]}}\n\n"
        ));
    }
    body.push_str("data: {\"candidates\": [{\"finishReason\": \"STOP\"}]}\n\n");
    body
}

#[tokio::test]
async fn test_three_chunk_stream_assembles_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:streamGenerateContent")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_chunks(&["Hi", " there", "!"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let mut session = session_against(&server).await;
    let outcome = session.send("hello Luminar").await;

    assert_eq!(outcome, SendOutcome::Replied);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript()[1].role, Role::Assistant);
    assert_eq!(session.transcript()[1].text, "Hi there!");
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_empty_send_is_noop_with_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_against(&server).await;
    assert_eq!(session.send("   ").await, SendOutcome::IgnoredEmpty);
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_server_error_shows_fallback_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = session_against(&server).await;
    let outcome = session.send("anyone there?").await;

    assert_eq!(outcome, SendOutcome::FellBack);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript()[1].text, CHAT_FALLBACK_MESSAGE);
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_system_instruction_sent_with_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:streamGenerateContent")))
        .and(body_partial_json(serde_json::json!({
            "systemInstruction": {
                "parts": [{"text": lumina::chat::CHAT_SYSTEM_INSTRUCTION}]
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_chunks(&["ok"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_against(&server).await;
    assert_eq!(session.send("hi").await, SendOutcome::Replied);
}

#[tokio::test]
async fn test_second_turn_carries_conversation_history() {
    let server = MockServer::start().await;

    // Both turns share one mock; the history check runs on the second call.
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:streamGenerateContent")))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_chunks(&["reply"]), "text/event-stream"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session_against(&server).await;
    session.send("first message").await;
    session.send("second message").await;

    assert_eq!(session.transcript().len(), 4);
    let requests = server.received_requests().await.expect("requests recorded");
    let second_body: serde_json::Value =
        serde_json::from_slice(&requests[1].body).expect("json body");
    let contents = second_body["contents"].as_array().expect("contents");

    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[1]["parts"][0]["text"], "reply");
    assert_eq!(contents[2]["parts"][0]["text"], "second message");
}

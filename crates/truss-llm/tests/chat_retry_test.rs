//! Integration tests for the chat backend with retry and deadlines

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use truss_llm::{LLMError, ModelClient, OpenAIChatProvider, RetryPolicy};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn chat_client(server: &MockServer, attempts: u32, timeout: Duration) -> ModelClient {
    let provider = OpenAIChatProvider::new("test-model")
        .with_api_key("sk-test")
        .with_base_url(server.uri());
    ModelClient::new(
        Arc::new(provider),
        RetryPolicy::new(attempts, Duration::from_millis(1)),
        timeout,
    )
}

/// Server errors are retried until one attempt succeeds
#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;
    let request_count = Arc::new(AtomicUsize::new(0));
    let counter = request_count.clone();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(503).set_body_string(r#"{"error": "Service Unavailable"}"#)
            } else {
                ResponseTemplate::new(200).set_body_json(chat_reply("{\"span\": 24}"))
            }
        })
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = chat_client(&mock_server, 5, Duration::from_secs(5));
    let raw = client.query("describe").await.expect("reply");

    assert_eq!(raw, "{\"span\": 24}");
    assert_eq!(request_count.load(Ordering::SeqCst), 3);
}

/// Any non-2xx status counts as a transport failure, client errors included
#[tokio::test]
async fn test_client_errors_are_retried_too() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error": "Unauthorized"}"#))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = chat_client(&mock_server, 3, Duration::from_secs(5));
    let err = client.query("describe").await.unwrap_err();

    match err {
        LLMError::ServiceUnavailable {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("401"));
        }
        other => panic!("Expected ServiceUnavailable, got {:?}", other),
    }
}

/// Slow responses hit the per-call deadline on every attempt
#[tokio::test]
async fn test_every_attempt_timing_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("{}"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = chat_client(&mock_server, 2, Duration::from_millis(50));
    let err = client.query("describe").await.unwrap_err();

    assert!(matches!(err, LLMError::UpstreamTimeout { attempts: 2 }));
    assert_eq!(err.status_code(), 504);
}

/// Unreachable services end in the no-response sentinel, surfaced as ServiceUnavailable
#[tokio::test]
async fn test_connection_refused() {
    let provider = OpenAIChatProvider::new("test-model").with_base_url("http://127.0.0.1:1");
    let client = ModelClient::new(
        Arc::new(provider),
        RetryPolicy::new(2, Duration::from_millis(1)),
        Duration::from_secs(5),
    );

    let err = client.query("describe").await.unwrap_err();
    assert!(matches!(err, LLMError::ServiceUnavailable { attempts: 2, .. }));
    assert_eq!(err.status_code(), 503);
}

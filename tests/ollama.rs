//! Ollama client and in-memory conversation against a wiremock server.

use softgen::config::OllamaConfig;
use softgen::llm::{CodeRequest, CodeTask, Conversation, LlmError, OllamaClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OllamaClient {
    OllamaClient::new(&OllamaConfig::default())
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

#[tokio::test]
async fn lists_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {"name": "deepseek-coder:6.7b", "size": 3825819519_u64},
                {"name": "deepseek-r1:7b"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    client.verify_connection().await.unwrap();
    let models = client.list_models().await.unwrap();

    assert_eq!(models, vec!["deepseek-coder:6.7b", "deepseek-r1:7b"]);
}

#[tokio::test]
async fn unhealthy_service_fails_verification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading"))
        .mount(&server)
        .await;

    let err = client(&server).verify_connection().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn generate_code_extracts_fenced_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-coder:6.7b",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "deepseek-coder:6.7b",
            "response": "Sure!\n```go\nfunc TestAdd(t *testing.T) {}\n```\n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CodeRequest::new(
        CodeTask::Test {
            function: "Add".to_string(),
            description: "adds two ints".to_string(),
        },
        "go",
    );
    let code = client(&server).generate_code(&request).await.unwrap();

    assert_eq!(code, "func TestAdd(t *testing.T) {}");
}

#[tokio::test]
async fn blank_generation_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "   ",
            "done": true
        })))
        .mount(&server)
        .await;

    let request = CodeRequest::new(
        CodeTask::Middleware {
            name: "Auth".to_string(),
            description: "jwt".to_string(),
        },
        "go",
    );
    let err = client(&server).generate_code(&request).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResult));
}

#[tokio::test]
async fn conversation_sends_history_and_remembers_reply() {
    let server = MockServer::start().await;

    // Second turn: the full history must be sent
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "user", "content": "I am Ming."},
                {"role": "assistant", "content": "Hello Ming."},
                {"role": "user", "content": "What is my name?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"role": "assistant", "content": "Your name is Ming."},
            "done": true
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-r1:7b",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"role": "assistant", "content": "Hello Ming."},
            "done": true
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut conversation = Conversation::new();

    assert_eq!(conversation.ask(&client, "I am Ming.").await.unwrap(), "Hello Ming.");
    assert_eq!(
        conversation.ask(&client, "What is my name?").await.unwrap(),
        "Your name is Ming."
    );
    assert_eq!(conversation.turns(), 2);
    assert_eq!(conversation.messages().len(), 4);
}

#[tokio::test]
async fn failed_turn_is_rolled_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let mut conversation = Conversation::with_system("be brief");
    let err = conversation.ask(&client(&server), "hi").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(conversation.messages().len(), 1);
}

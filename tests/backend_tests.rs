//! Backend `generate` tests against an in-process HTTP stub served by axum.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use ctf_ad_shared::providers::registry::{
    build_anthropic_service, build_ollama_service, build_openai_service,
};
use ctf_ad_shared::providers::Message;
use ctf_ad_shared::{ChatCompletion, CtfError, LlmRequest, ProviderDescriptor};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the stub saw of the last request
#[derive(Clone, Debug)]
struct Seen {
    path: String,
    headers: HeaderMap,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Option<Seen>>>,
}

async fn capture(
    State(stub): State<Stub>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    *stub.seen.lock().unwrap() = Some(Seen { path: uri.path().to_string(), headers, body });
    (stub.status, Json(stub.reply.clone()))
}

/// Starts a server answering every request with `status` and `reply`
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Option<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(None));

    let stub = Stub { status, reply, seen: seen.clone() };
    let app = Router::new().fallback(capture).with_state(stub);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, seen)
}

fn last_seen(seen: &Arc<Mutex<Option<Seen>>>) -> Seen {
    seen.lock().unwrap().clone().expect("stub saw no request")
}

fn header<'a>(seen: &'a Seen, name: &str) -> Option<&'a str> {
    seen.headers.get(name).and_then(|v| v.to_str().ok())
}

fn system_and_user() -> LlmRequest {
    LlmRequest {
        messages: vec![Message::system("be terse"), Message::user("ping")],
        model: None,
        max_tokens: None,
        temperature: None,
    }
}

// ============================================================================
// Anthropic Tests
// ============================================================================

fn anthropic_reply(input_tokens: u32, output_tokens: u32) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-5-20250929",
        "content": [
            { "type": "text", "text": "po" },
            { "type": "tool_use", "id": "t1", "name": "scan", "input": {} },
            { "type": "text", "text": "ng" }
        ],
        "usage": { "input_tokens": input_tokens, "output_tokens": output_tokens }
    })
}

fn anthropic_at(base: &str) -> ProviderDescriptor {
    ProviderDescriptor::new("anthropic", "claude-sonnet-4-5-20250929")
        .with_api_key("sk-ant-test")
        .with_base_url(format!("{}/v1/messages", base))
}

#[tokio::test]
async fn test_anthropic_generate_request_and_reply() {
    let (base, seen) = spawn_stub(StatusCode::OK, anthropic_reply(12, 3)).await;
    let service = build_anthropic_service(&anthropic_at(&base)).unwrap();

    let response = service.generate(&system_and_user()).await.unwrap();
    assert_eq!(response.content, "pong");
    assert_eq!(response.model, "claude-sonnet-4-5-20250929");
    let usage = response.usage.unwrap();
    assert_eq!((usage.prompt_tokens, usage.completion_tokens, usage.total_tokens), (12, 3, 15));

    let seen = last_seen(&seen);
    assert_eq!(seen.path, "/v1/messages");
    assert_eq!(header(&seen, "x-api-key"), Some("sk-ant-test"));
    assert_eq!(header(&seen, "anthropic-version"), Some("2023-06-01"));
    assert!(header(&seen, "authorization").is_none());

    assert_eq!(seen.body["model"], "claude-sonnet-4-5-20250929");
    assert_eq!(seen.body["system"], "be terse");
    assert_eq!(seen.body["max_tokens"], 1024);
    let messages = seen.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "ping");
}

#[tokio::test]
async fn test_anthropic_usage_total_saturates() {
    let (base, _) = spawn_stub(StatusCode::OK, anthropic_reply(u32::MAX, 1)).await;
    let service = build_anthropic_service(&anthropic_at(&base)).unwrap();

    let usage = service.generate(&LlmRequest::user("ping")).await.unwrap().usage.unwrap();
    assert_eq!(usage.total_tokens, u32::MAX);
}

#[tokio::test]
async fn test_anthropic_non_success_is_api_error() {
    let reply = json!({ "type": "error", "error": { "type": "rate_limit_error", "message": "slow down" } });
    let (base, _) = spawn_stub(StatusCode::TOO_MANY_REQUESTS, reply).await;
    let service = build_anthropic_service(&anthropic_at(&base)).unwrap();

    match service.generate(&LlmRequest::user("ping")).await.unwrap_err() {
        CtfError::ApiError(msg) => {
            assert!(msg.contains("Anthropic"));
            assert!(msg.contains("429"));
            assert!(msg.contains("slow down"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// OpenAI Tests
// ============================================================================

fn openai_at(base: &str) -> ProviderDescriptor {
    ProviderDescriptor::new("openai", "gpt-4o")
        .with_api_key("sk-openai-test")
        .with_base_url(format!("{}/v1/chat/completions", base))
}

#[tokio::test]
async fn test_openai_generate_request_and_reply() {
    let reply = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-2024-08-06",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "pong" }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10 }
    });
    let (base, seen) = spawn_stub(StatusCode::OK, reply).await;
    let service = build_openai_service(&openai_at(&base)).unwrap();

    let mut request = system_and_user();
    request.max_tokens = Some(64);
    let response = service.generate(&request).await.unwrap();
    assert_eq!(response.content, "pong");
    assert_eq!(response.model, "gpt-4o-2024-08-06");
    assert_eq!(response.usage.unwrap().total_tokens, 10);

    let seen = last_seen(&seen);
    assert_eq!(seen.path, "/v1/chat/completions");
    assert_eq!(header(&seen, "authorization"), Some("Bearer sk-openai-test"));

    assert_eq!(seen.body["model"], "gpt-4o");
    assert_eq!(seen.body["max_tokens"], 64);
    assert!(seen.body.get("temperature").is_none());
    let messages = seen.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["content"], "ping");
}

#[tokio::test]
async fn test_openai_null_content_is_api_error() {
    let reply = json!({
        "model": "gpt-4o",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": null, "tool_calls": [] },
                "finish_reason": "tool_calls"
            }
        ]
    });
    let (base, _) = spawn_stub(StatusCode::OK, reply).await;
    let service = build_openai_service(&openai_at(&base)).unwrap();

    match service.generate(&LlmRequest::user("ping")).await.unwrap_err() {
        CtfError::ApiError(msg) => assert_eq!(msg, "No response from OpenAI"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_openai_empty_choices_is_api_error() {
    let (base, _) = spawn_stub(StatusCode::OK, json!({ "model": "gpt-4o", "choices": [] })).await;
    let service = build_openai_service(&openai_at(&base)).unwrap();

    let err = service.generate(&LlmRequest::user("ping")).await.unwrap_err();
    assert!(matches!(err, CtfError::ApiError(_)));
}

#[tokio::test]
async fn test_openai_non_success_is_api_error() {
    let reply = json!({ "error": { "message": "upstream exploded", "type": "server_error" } });
    let (base, _) = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, reply).await;
    let service = build_openai_service(&openai_at(&base)).unwrap();

    match service.generate(&LlmRequest::user("ping")).await.unwrap_err() {
        CtfError::ApiError(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Ollama Tests
// ============================================================================

fn ollama_reply(prompt_eval_count: u32, eval_count: u32) -> Value {
    json!({
        "model": "llama3.2:3b",
        "created_at": "2025-01-01T00:00:00Z",
        "message": { "role": "assistant", "content": "pong" },
        "done": true,
        "prompt_eval_count": prompt_eval_count,
        "eval_count": eval_count
    })
}

#[tokio::test]
async fn test_ollama_generate_request_and_reply() {
    let (base, seen) = spawn_stub(StatusCode::OK, ollama_reply(20, 5)).await;
    let ollama = ProviderDescriptor::new("ollama", "llama3.2:3b").with_base_url(base.clone());
    let service = build_ollama_service(&ollama).unwrap();

    let mut request = system_and_user();
    request.max_tokens = Some(256);
    request.temperature = Some(0.5);
    let response = service.generate(&request).await.unwrap();
    assert_eq!(response.content, "pong");
    assert_eq!(response.model, "llama3.2:3b");
    assert_eq!(response.usage.unwrap().total_tokens, 25);

    let seen = last_seen(&seen);
    assert_eq!(seen.path, "/api/chat");
    assert!(header(&seen, "authorization").is_none());

    assert_eq!(seen.body["model"], "llama3.2:3b");
    assert_eq!(seen.body["stream"], false);
    assert_eq!(seen.body["options"]["num_predict"], 256);
    assert_eq!(seen.body["options"]["temperature"], 0.5);
    assert_eq!(seen.body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_ollama_without_options_omits_them() {
    let (base, seen) = spawn_stub(StatusCode::OK, ollama_reply(1, 1)).await;
    let ollama = ProviderDescriptor::new("ollama", "llama3.2:3b").with_base_url(base.clone());
    let service = build_ollama_service(&ollama).unwrap();

    service.generate(&LlmRequest::user("ping")).await.unwrap();
    let seen = last_seen(&seen);
    assert!(seen.body.get("options").is_none());
    assert_eq!(seen.body["stream"], false);
}

#[tokio::test]
async fn test_ollama_sends_bearer_when_keyed() {
    let (base, seen) = spawn_stub(StatusCode::OK, ollama_reply(1, 1)).await;
    let ollama = ProviderDescriptor::new("ollama", "llama3.2:3b")
        .with_api_key("proxy-token")
        .with_base_url(base.clone());
    let service = build_ollama_service(&ollama).unwrap();

    service.generate(&LlmRequest::user("ping")).await.unwrap();
    assert_eq!(header(&last_seen(&seen), "authorization"), Some("Bearer proxy-token"));
}

#[tokio::test]
async fn test_ollama_usage_total_saturates() {
    let (base, _) = spawn_stub(StatusCode::OK, ollama_reply(u32::MAX, 7)).await;
    let ollama = ProviderDescriptor::new("ollama", "llama3.2:3b").with_base_url(base.clone());
    let service = build_ollama_service(&ollama).unwrap();

    let usage = service.generate(&LlmRequest::user("ping")).await.unwrap().usage.unwrap();
    assert_eq!(usage.prompt_tokens, u32::MAX);
    assert_eq!(usage.completion_tokens, 7);
    assert_eq!(usage.total_tokens, u32::MAX);
}

#[tokio::test]
async fn test_ollama_non_success_is_api_error() {
    let reply = json!({ "error": "model 'llama3.2:3b' not found" });
    let (base, _) = spawn_stub(StatusCode::NOT_FOUND, reply).await;
    let ollama = ProviderDescriptor::new("ollama", "llama3.2:3b").with_base_url(base.clone());
    let service = build_ollama_service(&ollama).unwrap();

    match service.generate(&LlmRequest::user("ping")).await.unwrap_err() {
        CtfError::ApiError(msg) => {
            assert!(msg.contains("Ollama"));
            assert!(msg.contains("404"));
            assert!(msg.contains("not found"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

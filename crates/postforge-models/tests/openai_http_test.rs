//! HTTP-level tests for the OpenAI client against a mock server.

use postforge_abstraction::{ChatMessage, Model, ModelError, ModelParameters};
use postforge_models::OpenAIModel;

fn model_for(server: &mockito::Server) -> OpenAIModel {
    OpenAIModel::with_api_key("gpt-4o-mini".to_string(), "test-key".to_string())
        .with_base_url(server.url())
}

#[tokio::test]
async fn test_successful_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "  A strong draft.  "}}],
                "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
            }"#,
        )
        .create_async()
        .await;

    let model = model_for(&server);
    let messages =
        vec![ChatMessage::system("You write LinkedIn posts."), ChatMessage::user("Write one.")];
    let response = model
        .generate_chat_completion(&messages, Some(ModelParameters::default()))
        .await
        .unwrap();

    assert_eq!(response.content, "  A strong draft.  ");
    assert_eq!(response.model_id.as_deref(), Some("gpt-4o-mini"));
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 42);
    assert_eq!(usage.completion_tokens, 7);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_maps_to_transient_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limit exceeded")
        .create_async()
        .await;

    let model = model_for(&server);
    let err = model.generate_text("hello", None).await.unwrap_err();

    assert!(matches!(err, ModelError::RateLimited { ref provider, .. } if provider == "openai"));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_server_error_maps_to_transient_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let model = model_for(&server);
    let err = model.generate_text("hello", None).await.unwrap_err();

    assert!(matches!(err, ModelError::ServerError { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_client_error_is_permanent() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_body("model not found")
        .create_async()
        .await;

    let model = model_for(&server);
    let err = model.generate_text("hello", None).await.unwrap_err();

    assert!(matches!(err, ModelError::ModelResponseError(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let model = model_for(&server);
    let err = model.generate_text("hello", None).await.unwrap_err();

    assert!(matches!(err, ModelError::SerializationError(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_empty_choices_is_response_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let model = model_for(&server);
    let err = model.generate_text("hello", None).await.unwrap_err();

    assert!(matches!(err, ModelError::ModelResponseError(_)));
}

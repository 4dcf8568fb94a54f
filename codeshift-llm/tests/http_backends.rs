use codeshift_llm::{
    GeminiClient, GenerationOptions, LlmError, OllamaClient, OllamaConfig, TextGenerator,
};
use serde_json::json;
use std::time::Duration;
use tokio_stream::StreamExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_for(server: &MockServer) -> OllamaClient {
    OllamaClient::new(OllamaConfig {
        server_url: server.uri(),
        model: "mistral".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_ollama_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "mistral",
            "prompt": "Say hi",
            "stream": false,
            "options": { "num_predict": 512, "top_k": 50 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral",
            "response": "hi",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ollama_for(&server);
    let reply = client
        .generate("Say hi", &GenerationOptions::default())
        .await
        .unwrap();
    assert_eq!(reply, "hi");
}

#[tokio::test]
async fn test_ollama_stream_concatenates_fragments() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"response\":\"def \",\"done\":false}\n",
        "{\"response\":\"f():\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = ollama_for(&server);
    let stream = client
        .generate_stream("p", &GenerationOptions::default())
        .await
        .unwrap();
    let chunks: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(chunks.concat(), "def f():");
}

#[tokio::test]
async fn test_ollama_http_error_is_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = ollama_for(&server)
        .generate("p", &GenerationOptions::default())
        .await;
    match result {
        Err(LlmError::Inference(message)) => assert!(message.contains("boom")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_ollama_availability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .mount(&server)
        .await;
    assert!(ollama_for(&server).is_available().await);
}

#[tokio::test]
async fn test_invalid_options_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let options = GenerationOptions::default().with_temperature(5.0);
    let result = ollama_for(&server).generate("p", &options).await;
    assert!(matches!(result, Err(LlmError::InvalidOptions(_))));
}

#[tokio::test]
async fn test_gemini_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini-test:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Explain" }] }],
            "generationConfig": { "maxOutputTokens": 512 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "It " }, { "text": "works." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        "secret".to_string(),
        Some("gemini-test".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_base_url(server.uri());

    let reply = client
        .generate("Explain", &GenerationOptions::default())
        .await
        .unwrap();
    assert_eq!(reply, "It works.");
}

#[tokio::test]
async fn test_gemini_empty_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k".to_string(), None, Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri());
    let result = client.generate("p", &GenerationOptions::default()).await;
    assert!(matches!(result, Err(LlmError::Inference(_))));
}

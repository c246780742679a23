mod common;

use axum::http::StatusCode;
use serde_json::json;

use comic_image_proxy::{AppError, PromptEnhancer};
use common::{chat_reply, fake_openrouter, OPENROUTER_KEY};

fn enhancer(endpoint: &str) -> PromptEnhancer {
    PromptEnhancer::new(
        endpoint.to_string(),
        Some(OPENROUTER_KEY.to_string()),
        "https://comics.example".to_string(),
    )
}

#[tokio::test]
async fn returns_first_choice_content_verbatim() {
    let content = "  A caped hero soars above a neon skyline, bold ink lines.\n";
    let (url, fake) = fake_openrouter(StatusCode::OK, chat_reply(content)).await;

    let enhanced = enhancer(&url).enhance("hero over city").await.unwrap();

    assert_eq!(enhanced, content);
    assert_eq!(fake.hits(), 1);
}

#[tokio::test]
async fn sends_fixed_request_shape() {
    let (url, fake) = fake_openrouter(StatusCode::OK, chat_reply("ok")).await;
    enhancer(&url).enhance("a robot cat").await.unwrap();

    let (headers, body) = fake.last_request().expect("request recorded");
    assert_eq!(headers["authorization"], format!("Bearer {}", OPENROUTER_KEY).as_str());
    assert_eq!(headers["http-referer"], "https://comics.example");
    assert_eq!(headers["x-title"], "Comic Image Generator");

    assert_eq!(body["model"], "google/gemini-2.5-flash-image-preview");
    assert_eq!(body["max_tokens"], 200);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("You are an expert at creating detailed, vivid prompts"));
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("\"a robot cat\""));
}

#[tokio::test]
async fn blank_description_makes_no_request() {
    let (url, fake) = fake_openrouter(StatusCode::OK, chat_reply("unused")).await;
    let enhancer = enhancer(&url);

    for blank in ["", " ", "\t\n  "] {
        let err = enhancer.enhance(blank).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{:?}", err);
    }
    assert_eq!(fake.hits(), 0);
}

#[tokio::test]
async fn missing_credential_makes_no_request() {
    let (url, fake) = fake_openrouter(StatusCode::OK, chat_reply("unused")).await;
    let enhancer = PromptEnhancer::new(url, None, "http://localhost:3000".to_string());

    let err = enhancer.enhance("a dragon").await.unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    assert_eq!(err.to_string(), "OpenRouter API key not configured");
    assert_eq!(fake.hits(), 0);
}

#[tokio::test]
async fn empty_choices_is_upstream_error() {
    let (url, _fake) = fake_openrouter(StatusCode::OK, json!({"choices": []})).await;
    let err = enhancer(&url).enhance("a dragon").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: None, .. }));
    assert_eq!(err.to_string(), "no content produced");
}

#[tokio::test]
async fn empty_content_is_upstream_error() {
    let (url, _fake) = fake_openrouter(StatusCode::OK, chat_reply("")).await;
    let err = enhancer(&url).enhance("a dragon").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { .. }));
}

#[tokio::test]
async fn http_failure_carries_status_without_leaking_key() {
    let reply = json!({"error": {"message": format!("invalid key {}", OPENROUTER_KEY)}});
    let (url, fake) = fake_openrouter(StatusCode::UNAUTHORIZED, reply).await;

    let err = enhancer(&url).enhance("a dragon").await.unwrap_err();

    assert!(matches!(err, AppError::Upstream { status: Some(401), .. }));
    let message = err.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(!message.contains(OPENROUTER_KEY), "{}", message);
    assert_eq!(fake.hits(), 1);
}

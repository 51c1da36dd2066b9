//! Integration tests for the assistant backend routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{DownModel, FixedModel, assistant_app, body_json, get, post_json, post_raw_json};

#[tokio::test]
async fn offline_chat_uses_canned_replies() {
    let app = assistant_app(None);
    let response = app
        .oneshot(post_json("/api/chat", &json!({ "message": "my cat video" })))
        .await
        .expect("chat request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["usingAI"], false);
    assert_eq!(body["context"], "caption_generation");
    assert!(body["reply"].as_str().unwrap().contains("\"my cat video\""));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn chat_embeds_the_message_as_sent() {
    let app = assistant_app(None);
    let response = app
        .oneshot(post_json("/api/chat", &json!({ "message": "  my cat video " })))
        .await
        .expect("chat request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["reply"].as_str().unwrap().contains("\"  my cat video \""));
}

#[tokio::test]
async fn chat_requires_a_message() {
    let app = assistant_app(None);

    let response = app
        .clone()
        .oneshot(post_json("/api/chat", &json!({ "message": "   " })))
        .await
        .expect("chat request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "error": "Message is required" }));

    let response = app
        .oneshot(post_raw_json("/api/chat", "message=hi"))
        .await
        .expect("chat request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_relays_the_model_reply() {
    let app = assistant_app(Some(Arc::new(FixedModel("Open with a question."))));
    let response = app
        .oneshot(post_json(
            "/api/chat",
            &json!({
                "message": "hooks?",
                "context": "brainstorm",
                "previousMessages": [
                    { "text": "hi", "from": "user" },
                    { "text": "Hello! How can I help you today?", "from": "bot" }
                ]
            }),
        ))
        .await
        .expect("chat request");

    let body = body_json(response).await;
    assert_eq!(body["reply"], "Open with a question.");
    assert_eq!(body["context"], "brainstorm");
    assert_eq!(body["usingAI"], true);
}

#[tokio::test]
async fn chat_falls_back_when_upstream_fails() {
    let app = assistant_app(Some(Arc::new(DownModel)));
    let response = app
        .oneshot(post_json("/api/chat", &json!({ "message": "dance clip" })))
        .await
        .expect("chat request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("I'm having trouble with the AI service right now."));
    assert!(reply.contains("\"dance clip\""));
}

#[tokio::test]
async fn offline_caption_follows_requested_style() {
    let app = assistant_app(None);
    let response = app
        .oneshot(post_json(
            "/api/captions/generate",
            &json!({ "description": "sunset timelapse", "style": "viral" }),
        ))
        .await
        .expect("caption request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["style"], "viral");
    assert_eq!(body["includeHashtags"], true);
    assert_eq!(body["usingAI"], false);
    let draft = &body["captions"][0];
    assert!(
        draft["caption"]
            .as_str()
            .unwrap()
            .contains("This sunset timelapse is about to blow up")
    );
    assert_eq!(draft["alternatives"].as_array().map(Vec::len), Some(2));
    assert_eq!(draft["hashtags"], json!(["#ai", "#generated", "#content"]));
}

#[tokio::test]
async fn model_caption_failure_uses_generic_fallback() {
    let app = assistant_app(Some(Arc::new(DownModel)));
    let response = app
        .oneshot(post_json(
            "/api/captions/generate",
            &json!({ "description": "latte art", "includeHashtags": true }),
        ))
        .await
        .expect("caption request");

    let body = body_json(response).await;
    assert_eq!(body["style"], "engaging");
    let draft = &body["captions"][0];
    assert_eq!(
        draft["caption"],
        "Check out this amazing latte art! What do you think? #viral #fyp #amazing"
    );
    assert_eq!(draft["hashtags"], json!(["#viral", "#fyp", "#amazing"]));
    assert_eq!(draft["alternatives"], json!([]));
}

#[tokio::test]
async fn caption_requires_a_description() {
    let app = assistant_app(None);
    let response = app
        .oneshot(post_json("/api/captions/generate", &json!({ "style": "funny" })))
        .await
        .expect("caption request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Content description is required");
}

#[tokio::test]
async fn trends_default_to_general_category() {
    let app = assistant_app(None);
    let response = app.oneshot(get("/api/trends")).await.expect("trends request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["category"], "general");
    assert_eq!(body["trends"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["hashtags"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["suggestions"].as_array().map(Vec::len), Some(3));
    assert!(body["lastUpdated"].is_string());
}

#[tokio::test]
async fn trends_pick_up_model_hashtags() {
    let app = assistant_app(Some(Arc::new(FixedModel("Hot now: #cozy #booktok #recipes"))));
    let response = app
        .oneshot(get("/api/trends?category=books"))
        .await
        .expect("trends request");

    let body = body_json(response).await;
    assert_eq!(body["category"], "books");
    assert_eq!(body["hashtags"], json!(["#cozy", "#booktok", "#recipes"]));
    assert_eq!(body["usingAI"], true);
}

#[tokio::test]
async fn ideas_parse_model_list() {
    let app = assistant_app(Some(Arc::new(FixedModel(
        "1. Morning routine speedrun #GRWM\n2) Pantry makeover #Organize\n- Morning routine speedrun #GRWM",
    ))));
    let response = app
        .oneshot(post_json("/api/creative/ideas", &json!({ "topic": "home" })))
        .await
        .expect("ideas request");

    let body = body_json(response).await;
    assert_eq!(
        body["ideas"],
        json!(["Morning routine speedrun #GRWM", "Pantry makeover #Organize"])
    );
}

#[tokio::test]
async fn ideas_require_a_topic() {
    let app = assistant_app(None);
    let response = app
        .oneshot(post_json("/api/creative/ideas", &json!({ "platform": "youtube" })))
        .await
        .expect("ideas request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_model_connection() {
    let offline = body_json(
        assistant_app(None)
            .oneshot(get("/health"))
            .await
            .expect("health request"),
    )
    .await;
    assert_eq!(offline["status"], "OK");
    assert_eq!(offline["aiConnected"], false);

    let online = body_json(
        assistant_app(Some(Arc::new(FixedModel("ok"))))
            .oneshot(get("/health"))
            .await
            .expect("health request"),
    )
    .await;
    assert_eq!(online["aiConnected"], true);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let response = assistant_app(None)
        .oneshot(get("/api/unknown"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Route not found" }));
}

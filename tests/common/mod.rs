#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use parsons_backend::{
    config::{Prompts, Settings},
    error::UpstreamError,
    openai::{ChatMessage, CompletionClient},
    build_router, AppState,
};

/// Upstream stand-in: returns a canned reply and records every call's messages.
pub struct MockClient {
    reply: Result<String, (u16, String)>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockClient {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(reply.to_string()), calls: Mutex::new(Vec::new()) })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self { reply: Err((status, message.to_string())), calls: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete_json(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(UpstreamError::Http { status: *status, message: message.clone() }),
        }
    }
}

pub fn test_settings(validate_problem_sets: bool) -> Settings {
    let validate = if validate_problem_sets { "true" } else { "false" };
    settings_with(&[("VALIDATE_PROBLEM_SETS", validate)])
}

/// Test settings with the API key set plus any extra variables.
pub fn settings_with(vars: &[(&str, &str)]) -> Settings {
    let vars: Vec<(String, String)> =
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(move |key| {
        if key == "OPENAI_API_KEY" {
            return Some("sk-test".to_string());
        }
        vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .expect("test settings")
}

pub fn create_test_app(client: Arc<MockClient>) -> Router {
    create_test_app_with(client, false)
}

pub fn create_test_app_with(client: Arc<MockClient>, validate_problem_sets: bool) -> Router {
    create_test_app_from(client, test_settings(validate_problem_sets))
}

pub fn create_test_app_from(client: Arc<MockClient>, settings: Settings) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let state = AppState::new(client, Prompts::default(), settings);
    build_router(Arc::new(state))
}

/// GET `uri` and return status plus raw body bytes.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri).await;
    let json = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!("non-JSON body ({e}): {}", String::from_utf8_lossy(&body))
    });
    (status, json)
}

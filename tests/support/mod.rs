//! テスト用のスクリプト化クライアント

#![allow(dead_code)]

use inked::generator::{AttemptError, Endpoint, GenerationClient};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 事前に登録した応答を順に返すクライアント
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<Value, AttemptError>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<Value, AttemptError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenerationClient for ScriptedClient {
    async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<Value, AttemptError> {
        self.calls.lock().unwrap().push((endpoint, body.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AttemptError::Transport("no scripted response".to_string())))
    }
}

pub fn text_response(text: &str) -> Result<Value, AttemptError> {
    Ok(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
}

pub fn image_response(base64: &str) -> Result<Value, AttemptError> {
    Ok(json!({"predictions": [{"bytesBase64Encoded": base64, "mimeType": "image/png"}]}))
}

pub fn server_error() -> Result<Value, AttemptError> {
    Err(AttemptError::Status {
        status: 503,
        body: "The model is overloaded".to_string(),
    })
}

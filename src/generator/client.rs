//! 生成APIクライアント
//!
//! `GenerationClient` は1回分のPOSTだけを担当する。リトライ・レスポンスの
//! 解釈は `Generator` 側で行うので、テストではスクリプト化したクライアントに
//! 差し替えられる。

use crate::config::Config;
use crate::error::Result;
use inked_common::TemplateKind;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 送信先エンドポイント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Text,
    Image,
}

impl Endpoint {
    pub fn for_kind(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Text => Endpoint::Text,
            TemplateKind::Image => Endpoint::Image,
        }
    }
}

/// 1回の試行の失敗（いずれもリトライ対象）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("API error: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[allow(async_fn_in_trait)]
pub trait GenerationClient {
    async fn post(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, AttemptError>;
}

/// reqwestによる本番クライアント
pub struct HttpClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl HttpClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let mut builder = reqwest::Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        Ok(Self {
            http: builder.build()?,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// APIキーを含まないURL（ログ用）
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        match endpoint {
            Endpoint::Text => format!("{}/models/{}:generateContent", self.base_url, self.text_model),
            Endpoint::Image => format!("{}/models/{}:predict", self.base_url, self.image_model),
        }
    }
}

impl HttpClient {
    /// APIキーはクエリパラメータとしてエンコードして付ける
    fn build_request(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> reqwest::Result<reqwest::Request> {
        self.http
            .post(self.endpoint_url(endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .build()
    }
}

impl GenerationClient for HttpClient {
    async fn post(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, AttemptError> {
        let url = self.endpoint_url(endpoint);
        debug!(url = %url, "POST");

        let request = self
            .build_request(endpoint, body)
            .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AttemptError::Malformed(e.without_url().to_string()))
    }
}

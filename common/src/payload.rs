//! 生成APIのリクエスト/レスポンス
//!
//! - テキスト: `generateContent` 形式（contents + systemInstruction）
//! - 画像: `predict` 形式（instances + parameters.sampleCount）
//!
//! レスポンスの解釈:
//! - JSONとして形が不正 → `Error::Parse`（呼び出し側でリトライ）
//! - 形は正しいが中身がない → `Error::EmptyResponse`（リトライしない）

use crate::error::{Error, Result};
use crate::form::FormState;
use crate::templates::{build_prompt, Template, TemplateKind};
use crate::types::GenerationOutput;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// テキスト生成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    fn text(text: String) -> Self {
        Self {
            parts: vec![Part { text }],
        }
    }
}

/// 画像生成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub instances: Vec<Instance>,
    pub parameters: ImageParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
}

/// テキスト生成レスポンス
#[derive(Debug, Deserialize)]
struct TextResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// 画像生成レスポンス
#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded", default)]
    bytes_base64_encoded: Option<String>,
}

/// 送信ペイロード
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(TextRequest),
    Image(ImageRequest),
}

impl Payload {
    pub fn kind(&self) -> TemplateKind {
        match self {
            Payload::Text(_) => TemplateKind::Text,
            Payload::Image(_) => TemplateKind::Image,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            Payload::Text(request) => serde_json::to_value(request)?,
            Payload::Image(request) => serde_json::to_value(request)?,
        };
        Ok(value)
    }
}

/// テンプレートとフォームからペイロードを作成
pub fn build_payload(template: &Template, form: &FormState) -> Payload {
    let prompt = build_prompt(template, form);
    match template.kind {
        TemplateKind::Text => Payload::Text(TextRequest {
            contents: vec![Content::text(prompt.request)],
            system_instruction: Content::text(prompt.instruction),
        }),
        TemplateKind::Image => Payload::Image(ImageRequest {
            instances: vec![Instance {
                prompt: prompt.request,
            }],
            parameters: ImageParameters { sample_count: 1 },
        }),
    }
}

/// `candidates[0].content.parts[0].text` を取り出す
pub fn extract_text(value: serde_json::Value) -> Result<String> {
    let response: TextResponse = serde_json::from_value(value)
        .map_err(|e| Error::Parse(format!("text response: {}", e)))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(Error::EmptyResponse)
}

/// `predictions[0].bytesBase64Encoded` を取り出す（Base64として検証）
pub fn extract_image(value: serde_json::Value) -> Result<String> {
    let response: ImageResponse = serde_json::from_value(value)
        .map_err(|e| Error::Parse(format!("image response: {}", e)))?;

    let encoded = response
        .predictions
        .into_iter()
        .next()
        .and_then(|p| p.bytes_base64_encoded)
        .filter(|b| !b.is_empty())
        .ok_or(Error::EmptyResponse)?;

    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| Error::Parse(format!("image bytes are not base64: {}", e)))?;

    Ok(encoded)
}

/// 種類に応じてレスポンスを解釈
pub fn extract_output(kind: TemplateKind, value: serde_json::Value) -> Result<GenerationOutput> {
    match kind {
        TemplateKind::Text => extract_text(value).map(|text| GenerationOutput::Text { text }),
        TemplateKind::Image => {
            extract_image(value).map(|base64| GenerationOutput::Image { base64 })
        }
    }
}

//! 生成結果・永続化レコードの型定義
//!
//! - Tier: 契約プラン（生成可否の判定に使用）
//! - GenerationOutput / GenerationResult: 直近の生成結果（セッション内のみ）
//! - Project: 保存された生成結果のスナップショット
//! - UserProfile: ユーザーごとのプラン・事業者名

use crate::error::{Error, Result};
use crate::form::FormState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 画像結果をData URIに変換する際のMIMEタイプ
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// 契約プラン
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Executive,
}

impl Tier {
    /// 生成を許可されたプランか
    pub fn can_generate(self) -> bool {
        matches!(self, Tier::Pro | Tier::Executive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Executive => "executive",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "executive" => Ok(Tier::Executive),
            other => Err(Error::UnknownTier(other.to_string())),
        }
    }
}

/// 生成結果の本体（テキストまたはBase64画像）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GenerationOutput {
    Text { text: String },
    Image { base64: String },
}

impl GenerationOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationOutput::Text { text } => Some(text),
            GenerationOutput::Image { .. } => None,
        }
    }

    /// `data:image/png;base64,...` 形式に変換（画像のみ）
    pub fn data_uri(&self) -> Option<String> {
        match self {
            GenerationOutput::Image { base64 } => {
                Some(format!("data:{};base64,{}", IMAGE_MIME_TYPE, base64))
            }
            GenerationOutput::Text { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, GenerationOutput::Image { .. })
    }
}

/// 直近の生成状態
///
/// 失敗しても前回の `output` は残し、`error` にだけ最新の失敗を記録する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub output: Option<GenerationOutput>,
    pub error: Option<String>,
    pub pending: bool,
}

impl GenerationResult {
    /// 保存可能な結果があるか（空文字のテキストは結果とみなさない）
    pub fn has_content(&self) -> bool {
        match &self.output {
            Some(GenerationOutput::Text { text }) => !text.trim().is_empty(),
            Some(GenerationOutput::Image { base64 }) => !base64.is_empty(),
            None => false,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// 保存済みプロジェクト（作成後は変更しない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub template_id: String,
    pub inputs: FormState,
    pub result: GenerationOutput,
}

/// ユーザープロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub business_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// 初回サインイン時のプロフィール（Freeプラン）
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            tier: Tier::default(),
            business_name: None,
            created_at: Utc::now(),
        }
    }
}

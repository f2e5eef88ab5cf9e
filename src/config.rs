use crate::error::{InkedError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const USER_ID_ENV: &str = "INKED_USER_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// 認証は外部に委ねるため、ユーザーIDは設定値として受け取る
    pub user_id: Option<String>,
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
    pub timeout_seconds: u64,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            user_id: None,
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            text_model: "gemini-2.0-flash".into(),
            image_model: "imagen-3.0-generate-002".into(),
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 1000,
            timeout_seconds: 120,
            store_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（ファイルがなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InkedError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("inked").join("config.json"))
    }

    /// プロジェクト・プロフィールの保存先
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| InkedError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("inked").join("store.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(InkedError::MissingApiKey)
    }

    pub fn get_user_id(&self) -> Option<String> {
        if let Ok(user) = std::env::var(USER_ID_ENV) {
            if !user.trim().is_empty() {
                return Some(user);
            }
        }
        self.user_id.clone().filter(|u| !u.trim().is_empty())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_user_id(&mut self, user_id: String) -> Result<()> {
        self.user_id = Some(user_id);
        self.save()
    }
}

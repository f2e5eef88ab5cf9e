//! 生成結果の保存・プロフィール管理
//!
//! - save_project: 生成結果とフォームのスナップショットを追記（更新・重複排除なし）
//! - list_projects: 新しい順のプロジェクト一覧を購読
//! - get_user_profile: 初回参照時にFreeプランで作成
//! - update_business_name: 失敗してもログのみ

pub mod feed;
pub mod store;

pub use feed::{newest_first, ProjectFeed};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, ProjectLoader, StoreEvent};

use crate::error::{InkedError, Result};
use chrono::{DateTime, Utc};
use inked_common::{get_template, FormState, GenerationResult, Project, Tier, UserProfile};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// 入力欄のフォーカスが外れたとき、保存すべき事業者名を返す
///
/// 空欄、または保存済みの値と同じなら None
pub fn business_name_change(previous: Option<&str>, current: &str) -> Option<String> {
    let current = current.trim();
    if current.is_empty() || previous.map(str::trim) == Some(current) {
        return None;
    }
    Some(current.to_string())
}

/// プロジェクトID（ユーザー・作成時刻・テンプレート・乱数のハッシュ先頭16桁）
pub fn project_id(user_id: &str, created_at: &DateTime<Utc>, template_id: &str) -> String {
    let nonce: u64 = rand::random();
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    hasher.update(template_id.as_bytes());
    hasher.update(nonce.to_le_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}

pub struct Gateway<S> {
    store: S,
}

impl<S: DocumentStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 生成結果を保存してIDを返す
    ///
    /// 結果がなければ NoContent、ユーザーがいなければ NotAuthenticated（どちらも書き込まない）
    pub fn save_project(
        &self,
        user_id: Option<&str>,
        template_id: &str,
        form: &FormState,
        result: &GenerationResult,
        title: Option<&str>,
    ) -> Result<String> {
        let output = match &result.output {
            Some(output) if result.has_content() => output.clone(),
            _ => return Err(InkedError::NoContent),
        };
        let user_id = user_id
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(InkedError::NotAuthenticated)?;
        let template = get_template(template_id)?;

        let created_at = Utc::now();
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("{} — {}", template.name, created_at.format("%Y-%m-%d %H:%M"))
            });

        let project = Project {
            id: project_id(user_id, &created_at, template.id),
            user_id: user_id.to_string(),
            created_at,
            title,
            template_id: template.id.to_string(),
            inputs: form.clone(),
            result: output,
        };

        self.store.append_project(&project)?;
        info!(user = user_id, project = %project.id, template = template.id, "project saved");
        Ok(project.id)
    }

    /// プロジェクト一覧の購読を開始
    pub fn list_projects(&self, user_id: &str) -> Result<ProjectFeed> {
        let events = self.store.watch();
        let initial = self.store.projects_for(user_id)?;
        Ok(ProjectFeed::new(user_id, initial, events, self.store.loader()))
    }

    pub fn get_project(&self, user_id: &str, id: &str) -> Result<Project> {
        self.store
            .projects_for(user_id)?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| InkedError::ProjectNotFound(id.to_string()))
    }

    /// プロフィール取得（なければFreeプランで作成）
    pub fn get_user_profile(&self, user_id: &str) -> Result<UserProfile> {
        if let Some(profile) = self.store.load_profile(user_id)? {
            return Ok(profile);
        }
        let profile = UserProfile::new(user_id);
        self.store.store_profile(&profile)?;
        info!(user = user_id, "profile created");
        Ok(profile)
    }

    /// 事業者名を更新（失敗はログのみ）
    pub fn update_business_name(&self, user_id: &str, name: &str) {
        let result = self.get_user_profile(user_id).and_then(|mut profile| {
            profile.business_name = Some(name.to_string());
            self.store.store_profile(&profile)
        });
        if let Err(e) = result {
            warn!(user = user_id, error = %e, "failed to update business name");
        }
    }

    /// プラン変更（決済は行わない）
    pub fn subscribe(&self, user_id: &str, tier: Tier) -> Result<UserProfile> {
        let mut profile = self.get_user_profile(user_id)?;
        profile.tier = tier;
        self.store.store_profile(&profile)?;
        info!(user = user_id, tier = %tier, "subscription changed");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_name_change() {
        assert_eq!(business_name_change(None, ""), None);
        assert_eq!(business_name_change(None, "   "), None);
        assert_eq!(business_name_change(Some("Pulse Ink"), "Pulse Ink "), None);
        assert_eq!(
            business_name_change(Some("Pulse Ink"), "Pulse Ink Studio"),
            Some("Pulse Ink Studio".to_string())
        );
        assert_eq!(
            business_name_change(None, " Night Owl "),
            Some("Night Owl".to_string())
        );
    }

    #[test]
    fn test_project_id_shape() {
        let now = Utc::now();
        let a = project_id("u1", &now, "letter");
        let b = project_id("u1", &now, "letter");
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}

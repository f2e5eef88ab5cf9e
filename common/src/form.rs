//! フォーム状態
//!
//! - FormState: 1テンプレート分の入力値（項目名 → 文字列）
//! - FormStore: テンプレートIDごとのFormState。テンプレートを切り替えても
//!   離れた側の入力値は保持される（戻ってくれば途中から再開できる）

use crate::error::{Error, Result};
use crate::templates::{get_template, Prefill, Template};
use crate::types::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 1テンプレート分の入力値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState(BTreeMap<String, String>);

impl FormState {
    /// テンプレート宣言の初期値で作成
    pub fn defaults_for(template: &Template) -> Self {
        Self(
            template
                .fields
                .iter()
                .map(|f| (f.name.to_string(), f.default_value().to_string()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    /// 未入力（空または空白のみ）か
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).map_or(true, |v| v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// テンプレートごとのフォーム状態
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    states: HashMap<&'static str, FormState>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// フォーム状態を取得（未作成なら初期値で作成）
    pub fn get_state(&mut self, template_id: &str) -> Result<&FormState> {
        let template = get_template(template_id)?;
        Ok(self.entry(template))
    }

    /// 項目を上書き（検証は送信時に行う）
    pub fn set_field(&mut self, template_id: &str, field: &str, value: &str) -> Result<()> {
        let template = get_template(template_id)?;
        if template.field(field).is_none() {
            return Err(Error::UnknownField {
                template: template_id.to_string(),
                field: field.to_string(),
            });
        }
        self.entry(template).set(field, value);
        Ok(())
    }

    /// 初期値に戻す（リロード相当）
    pub fn reset(&mut self, template_id: &str) -> Result<()> {
        let template = get_template(template_id)?;
        self.states
            .insert(template.id, FormState::defaults_for(template));
        Ok(())
    }

    /// プロフィールの値で空欄を埋める（入力済みの値は上書きしない）
    pub fn apply_prefill(&mut self, template_id: &str, profile: &UserProfile) -> Result<()> {
        let template = get_template(template_id)?;
        let state = self.entry(template);
        for spec in template.fields {
            let value = match spec.prefill {
                Some(Prefill::BusinessName) => profile.business_name.as_deref(),
                None => None,
            };
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                if state.is_blank(spec.name) {
                    state.set(spec.name, value);
                }
            }
        }
        Ok(())
    }

    fn entry(&mut self, template: &'static Template) -> &mut FormState {
        self.states
            .entry(template.id)
            .or_insert_with(|| FormState::defaults_for(template))
    }
}

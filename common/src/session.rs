//! 編集セッション
//!
//! 画面全体の状態を1つのコンテナにまとめ、`apply(Action)` で更新する。
//! - アクティブなテンプレートは常に1つ
//! - テンプレート切り替えでは直近の生成結果だけを消し、フォームは残す
//! - 生成リクエストは同時に1件まで（送信中の再送信は Busy）

use crate::error::{Error, Result};
use crate::form::{FormState, FormStore};
use crate::templates::{get_template, Template, TEMPLATES};
use crate::types::{GenerationOutput, GenerationResult, UserProfile};

/// セッションへの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTemplate(String),
    SetField { field: String, value: String },
    ResetForm,
}

/// 送信中リクエストの識別子
///
/// 結果を反映する時点でテンプレートが切り替わっていれば、その結果は捨てる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    seq: u64,
    template_id: &'static str,
    epoch: u64,
}

impl GenerationTicket {
    pub fn template_id(&self) -> &'static str {
        self.template_id
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    active: &'static Template,
    forms: FormStore,
    result: GenerationResult,
    /// テンプレート切り替えのたびに進める
    epoch: u64,
    next_seq: u64,
    in_flight: Option<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// カタログ先頭のテンプレートで開始
    pub fn new() -> Self {
        Self {
            active: &TEMPLATES[0],
            forms: FormStore::new(),
            result: GenerationResult::default(),
            epoch: 0,
            next_seq: 0,
            in_flight: None,
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::SelectTemplate(id) => {
                let template = get_template(&id)?;
                if template.id != self.active.id {
                    self.active = template;
                    self.reset_on_template_switch();
                }
                Ok(())
            }
            Action::SetField { field, value } => {
                self.forms.set_field(self.active.id, &field, &value)
            }
            Action::ResetForm => self.forms.reset(self.active.id),
        }
    }

    pub fn active_template(&self) -> &'static Template {
        self.active
    }

    pub fn active_form(&mut self) -> Result<&FormState> {
        self.forms.get_state(self.active.id)
    }

    pub fn form_for(&mut self, template_id: &str) -> Result<&FormState> {
        self.forms.get_state(template_id)
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// アクティブなテンプレートにプロフィールの事前入力を適用
    pub fn apply_prefill(&mut self, profile: &UserProfile) -> Result<()> {
        self.forms.apply_prefill(self.active.id, profile)
    }

    /// 直近の生成結果だけを消す（フォーム・保存済みデータには触れない）
    pub fn reset_on_template_switch(&mut self) {
        self.epoch += 1;
        self.result.output = None;
        self.result.error = None;
    }

    /// 送信開始。送信中のリクエストがあれば Busy
    pub fn begin_generation(&mut self) -> Result<GenerationTicket> {
        if self.in_flight.is_some() {
            return Err(Error::Busy);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.result.pending = true;
        Ok(GenerationTicket {
            seq,
            template_id: self.active.id,
            epoch: self.epoch,
        })
    }

    /// 送信完了。結果を反映した場合は true
    ///
    /// 失敗時は前回の出力を残したまま `error` だけを更新する。
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: std::result::Result<GenerationOutput, String>,
    ) -> bool {
        if self.in_flight != Some(ticket.seq) {
            return false;
        }
        self.in_flight = None;
        self.result.pending = false;

        if ticket.epoch != self.epoch || ticket.template_id != self.active.id {
            return false;
        }

        match outcome {
            Ok(output) => {
                self.result.output = Some(output);
                self.result.error = None;
            }
            Err(message) => {
                self.result.error = Some(message);
            }
        }
        true
    }
}

//! 生成オーケストレーター
//!
//! 1. プラン確認（Pro/Executive以外は通信せずに NotEntitled）
//! 2. 必須項目チェック（通信せずに Validation）
//! 3. ペイロード作成 → エンドポイントへ送信
//! 4. HTTPエラー・形式不正はバックオフしながら最大 max_attempts 回まで試行
//! 5. 成功時はテキスト/画像を取り出す（中身がなければ EmptyResponse、リトライしない）

pub mod client;
pub mod retry;

pub use client::{AttemptError, Endpoint, GenerationClient, HttpClient};
pub use retry::RetryPolicy;

use crate::error::{InkedError, Result};
use inked_common::{
    build_payload, extract_output, validate_required, FormState, GenerationOutput, Session,
    Template, Tier,
};
use tracing::{debug, info, warn};

/// 通信前のチェック（プラン → 必須項目の順）
pub fn preflight(template: &Template, form: &FormState, tier: Tier) -> Result<()> {
    if !tier.can_generate() {
        return Err(inked_common::Error::NotEntitled.into());
    }
    validate_required(template, form)?;
    Ok(())
}

pub struct Generator<C> {
    client: C,
    retry: RetryPolicy,
}

impl<C: GenerationClient> Generator<C> {
    pub fn new(client: C, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// テンプレートとフォームから生成
    pub async fn generate(
        &self,
        template: &Template,
        form: &FormState,
        tier: Tier,
    ) -> Result<GenerationOutput> {
        preflight(template, form, tier)?;

        let payload = build_payload(template, form);
        let body = payload.to_json()?;
        let endpoint = Endpoint::for_kind(template.kind);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            debug!(template = template.id, attempt = attempt + 1, "generation attempt");

            match self.client.post(endpoint, &body).await {
                Ok(value) => match extract_output(template.kind, value) {
                    Ok(output) => {
                        info!(template = template.id, attempts = attempt + 1, "generation succeeded");
                        return Ok(output);
                    }
                    Err(inked_common::Error::EmptyResponse) => {
                        warn!(template = template.id, "response contained no output");
                        return Err(inked_common::Error::EmptyResponse.into());
                    }
                    Err(e) => last_error = e.to_string(),
                },
                Err(e) => last_error = e.to_string(),
            }

            if attempt + 1 < max_attempts {
                let delay = self.retry.delay_for(attempt, &mut rand::rng());
                warn!(
                    template = template.id,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "generation attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        warn!(template = template.id, attempts = max_attempts, error = %last_error, "generation failed");
        Err(InkedError::GenerationFailed {
            attempts: max_attempts,
            message: last_error,
        })
    }

    /// セッションのアクティブなテンプレートで生成し、結果スロットへ反映
    ///
    /// 通信前のチェックで失敗した場合、結果スロットには触れない。
    pub async fn generate_in(&self, session: &mut Session, tier: Tier) -> Result<GenerationOutput> {
        let template = session.active_template();
        let form = session.active_form()?.clone();
        preflight(template, &form, tier)?;

        let ticket = session.begin_generation()?;
        let outcome = self.generate(template, &form, tier).await;
        let applied = session.finish_generation(
            ticket,
            outcome.as_ref().map(Clone::clone).map_err(ToString::to_string),
        );
        if !applied {
            debug!(template = ticket.template_id(), "discarded result for inactive template");
        }
        outcome
    }
}

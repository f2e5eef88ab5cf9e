//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 入力・権限の問題（NotEntitled, Validation）はリトライせずユーザーに通知する。
/// Parse はレスポンス形式の異常でリトライ対象、EmptyResponse はリトライしない。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template '{template}' has no field '{field}'")]
    UnknownField { template: String, field: String },

    #[error("Please fill in the required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Generation is available on the Pro and Executive plans. Upgrade to continue.")]
    NotEntitled,

    #[error("A generation is already in progress")]
    Busy,

    #[error("The response contained no usable output")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation_lists_fields() {
        let error = Error::Validation(vec!["Recipient".to_string(), "Core message".to_string()]);
        let display = format!("{}", error);
        assert_eq!(
            display,
            "Please fill in the required fields: Recipient, Core message"
        );
    }

    #[test]
    fn test_error_display_not_entitled_mentions_upgrade() {
        let display = format!("{}", Error::NotEntitled);
        assert!(display.contains("Upgrade"));
        assert!(display.contains("Pro"));
    }

    #[test]
    fn test_error_display_unknown_field() {
        let error = Error::UnknownField {
            template: "letter".to_string(),
            field: "signature".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Template 'letter' has no field 'signature'"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::NotFound("sonnet".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("NotFound"));
        assert!(debug.contains("sonnet"));
    }
}

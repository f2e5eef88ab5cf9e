use thiserror::Error;

#[derive(Error, Debug)]
pub enum InkedError {
    #[error(transparent)]
    Common(#[from] inked_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`inked config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ユーザーが設定されていません。`inked config --set-user USER_ID` で設定してください")]
    NotAuthenticated,

    #[error("保存できる生成結果がありません。先に生成を実行してください")]
    NoContent,

    #[error("プロジェクトが見つかりません: {0}")]
    ProjectNotFound(String),

    #[error("生成に失敗しました（{attempts}回試行）: {message}")]
    GenerationFailed { attempts: u32, message: String },

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ストアエラー: {0}")]
    Store(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl InkedError {
    /// ユーザー操作が必要なエラーか（リトライしても解決しない）
    pub fn needs_user_action(&self) -> bool {
        matches!(
            self,
            InkedError::Common(inked_common::Error::NotEntitled)
                | InkedError::Common(inked_common::Error::Validation(_))
                | InkedError::Common(inked_common::Error::Busy)
                | InkedError::MissingApiKey
                | InkedError::NotAuthenticated
                | InkedError::NoContent
        )
    }
}

pub type Result<T> = std::result::Result<T, InkedError>;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("通信に失敗しました: {0}")]
    Transport(String),
    #[error("HTTP ステータス {status} が返されました")]
    Status { status: u16 },
    #[error("API がエラーを返しました ({status}): {message}")]
    Api { status: String, message: String },
    #[error("レスポンスの形式が想定と異なります: {0}")]
    Decode(String),
    #[error("ラベル '{label}' の系列がレスポンスに含まれていません")]
    MissingSeries { label: String },
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("環境変数 {0} が設定されていません")]
    MissingVariable(&'static str),
    #[error("環境変数 {0} が空です")]
    EmptyVariable(&'static str),
}

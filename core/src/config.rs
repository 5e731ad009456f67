use crate::api::DEFAULT_ENDPOINT;
use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "RESAS_API_KEY";
pub const ENDPOINT_VAR: &str = "RESAS_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: normalize_endpoint(&endpoint.into()),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 変数名から値を引く関数で設定を組み立てる。
    /// API キーは必須、エンドポイントは省略時に既定値を使う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingVariable(API_KEY_VAR))?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::EmptyVariable(API_KEY_VAR));
        }
        let endpoint = lookup(ENDPOINT_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Ok(Self::new(endpoint, api_key))
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    format!("{}/", endpoint.trim_end_matches('/'))
}

use anyhow::{Context, Result};
use prefpop_core::api::{self, API_KEY_HEADER};
use prefpop_core::{ApiConfig, FetchError, PopulationPoint, PrefCode, Prefecture};
use reqwest::blocking::Client;
use tracing::debug;

pub trait PopulationApi {
    fn prefectures(&self) -> Result<Vec<Prefecture>, FetchError>;
    fn total_population(&self, code: PrefCode) -> Result<Vec<PopulationPoint>, FetchError>;
}

pub struct ResasClient {
    http: Client,
    config: ApiConfig,
}

impl ResasClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("HTTP クライアントの初期化に失敗しました")?;
        Ok(Self { http, config })
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        response
            .text()
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

impl PopulationApi for ResasClient {
    fn prefectures(&self) -> Result<Vec<Prefecture>, FetchError> {
        let body = self.get(&api::prefectures_url(&self.config.endpoint))?;
        api::decode_prefectures(&body)
    }

    fn total_population(&self, code: PrefCode) -> Result<Vec<PopulationPoint>, FetchError> {
        let body = self.get(&api::population_url(&self.config.endpoint, code))?;
        api::decode_total_population(&body)
    }
}

use gloo_net::http::Request;
use prefpop_core::api::{self, API_KEY_HEADER};
use prefpop_core::{ApiConfig, FetchError, PopulationPoint, PrefCode, Prefecture};
use tracing::debug;

async fn get(config: &ApiConfig, url: &str) -> Result<String, FetchError> {
    debug!(url, "GET");
    let response = Request::get(url)
        .header(API_KEY_HEADER, &config.api_key)
        .send()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status {
            status: response.status(),
        });
    }
    response
        .text()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))
}

pub async fn fetch_prefectures(config: &ApiConfig) -> Result<Vec<Prefecture>, FetchError> {
    let body = get(config, &api::prefectures_url(&config.endpoint)).await?;
    api::decode_prefectures(&body)
}

pub async fn fetch_total_population(
    config: &ApiConfig,
    code: PrefCode,
) -> Result<Vec<PopulationPoint>, FetchError> {
    let body = get(config, &api::population_url(&config.endpoint, code)).await?;
    api::decode_total_population(&body)
}

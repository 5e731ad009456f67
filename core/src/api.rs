//! RESAS API のエンドポイントとレスポンス形式。
//!
//! HTTP 通信そのものは各フロントエンドが行い、ここでは URL の組み立てと
//! レスポンス本文の解釈だけを扱う。

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;
use crate::model::{PopulationPoint, PrefCode, Prefecture};

pub const DEFAULT_ENDPOINT: &str = "https://opendata.resas-portal.go.jp/";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const TOTAL_POPULATION_LABEL: &str = "総人口";

pub fn prefectures_url(endpoint: &str) -> String {
    format!("{}api/v1/prefectures", endpoint)
}

pub fn population_url(endpoint: &str, code: PrefCode) -> String {
    format!(
        "{}api/v1/population/composition/perYear?cityCode=-&prefCode={}",
        endpoint, code
    )
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct PrefectureRecord {
    #[serde(rename = "prefCode")]
    pref_code: u32,
    #[serde(rename = "prefName")]
    pref_name: String,
}

#[derive(Debug, Deserialize)]
struct CompositionResult {
    #[serde(rename = "boundaryYear", default)]
    _boundary_year: Option<i32>,
    data: Vec<LabelledSeries>,
}

#[derive(Debug, Deserialize)]
struct LabelledSeries {
    label: String,
    data: Vec<PopulationPoint>,
}

/// RESAS はエラー時も 200 を返し、本文に `statusCode` を載せてくることがある。
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    match &value {
        Value::Null => {
            return Err(FetchError::Decode("レスポンスが null です".to_string()));
        }
        Value::String(text) => {
            return Err(FetchError::Api {
                status: text.clone(),
                message: text.clone(),
            });
        }
        Value::Object(map) if !map.contains_key("result") => {
            if let Some(status) = map.get("statusCode") {
                let status = match status {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(FetchError::Api { status, message });
            }
        }
        _ => {}
    }
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    Ok(envelope.result)
}

pub fn decode_prefectures(body: &str) -> Result<Vec<Prefecture>, FetchError> {
    let records: Vec<PrefectureRecord> = decode_envelope(body)?;
    Ok(records
        .into_iter()
        .map(|record| Prefecture::new(record.pref_code, record.pref_name))
        .collect())
}

pub fn decode_total_population(body: &str) -> Result<Vec<PopulationPoint>, FetchError> {
    decode_population_series(body, TOTAL_POPULATION_LABEL)
}

pub fn decode_population_series(
    body: &str,
    label: &str,
) -> Result<Vec<PopulationPoint>, FetchError> {
    let result: CompositionResult = decode_envelope(body)?;
    result
        .data
        .into_iter()
        .find(|series| series.label == label)
        .map(|series| series.data)
        .ok_or_else(|| FetchError::MissingSeries {
            label: label.to_string(),
        })
}

#![cfg(target_arch = "wasm32")]

use prefpop_core::FetchError;
use prefpop_web::{config_from_build_env, failure_message};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn default_endpoint_when_only_key_is_baked_in() {
    let config = config_from_build_env(Some("secret"), None).unwrap();
    assert_eq!(config.endpoint, "https://opendata.resas-portal.go.jp/");
}

#[wasm_bindgen_test]
fn status_failures_are_reported_with_the_prefecture_name() {
    let message = failure_message("京都府", &FetchError::Status { status: 429 });
    assert_eq!(
        message,
        "京都府 の人口データを取得できませんでした: HTTP ステータス 429 が返されました"
    );
}

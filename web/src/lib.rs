#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

#[cfg(target_arch = "wasm32")]
mod chart;
#[cfg(target_arch = "wasm32")]
mod fetch;

use prefpop_core::{API_KEY_VAR, ApiConfig, ConfigError, ENDPOINT_VAR, FetchError, PrefCode};

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use prefpop_core::{ChartTable, Completion, Prefecture, SelectionTracker};

#[cfg(target_arch = "wasm32")]
use tracing::{error, warn};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use web_sys::HtmlInputElement;

#[cfg(target_arch = "wasm32")]
use crate::chart::PopulationChart;

/// ブラウザには実行時の環境変数が無いため、ビルド時に埋め込まれた値を使う。
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    config_from_build_env(option_env!("RESAS_API_KEY"), option_env!("RESAS_ENDPOINT"))
}

pub fn config_from_build_env(
    api_key: Option<&str>,
    endpoint: Option<&str>,
) -> Result<ApiConfig, ConfigError> {
    ApiConfig::from_lookup(|name| match name {
        API_KEY_VAR => api_key.map(str::to_string),
        ENDPOINT_VAR => endpoint.map(str::to_string),
        _ => None,
    })
}

pub fn failure_message(name: &str, err: &FetchError) -> String {
    match err {
        FetchError::MissingSeries { .. } => {
            format!("{name} の総人口データが見つかりませんでした。")
        }
        other => format!("{name} の人口データを取得できませんでした: {other}"),
    }
}

/// 画面上部に出すエラー表示。都道府県ごとの失敗はその都道府県コードを覚えておく。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    source: Option<PrefCode>,
    text: String,
}

impl Banner {
    pub fn general(text: impl Into<String>) -> Self {
        Self {
            source: None,
            text: text.into(),
        }
    }

    pub fn fetch_failed(code: PrefCode, name: &str, err: &FetchError) -> Self {
        Self {
            source: Some(code),
            text: failure_message(name, err),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `code` の取得が成功したとき、その都道府県の失敗表示だけを消す。
pub fn clear_resolved(banner: &mut Option<Banner>, code: PrefCode) {
    if banner.as_ref().is_some_and(|b| b.source == Some(code)) {
        *banner = None;
    }
}

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| load_config());
    let catalog = use_state(Vec::<Prefecture>::new);
    let tracker = use_mut_ref(SelectionTracker::new);
    // 非同期の完了時に最新の表示を参照するため、state ではなく RefCell に置く。
    let banner = use_mut_ref(|| Option::<Banner>::None);
    let refresh = use_force_update();

    {
        let config = config.clone();
        let catalog = catalog.clone();
        let banner = banner.clone();
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            match &*config {
                Ok(config) => {
                    let config = config.clone();
                    spawn_local(async move {
                        match fetch::fetch_prefectures(&config).await {
                            Ok(list) => catalog.set(list),
                            Err(err) => {
                                error!(error = %err, "都道府県一覧の取得に失敗");
                                *banner.borrow_mut() = Some(Banner::general(format!(
                                    "都道府県一覧を取得できませんでした: {err}"
                                )));
                                refresh.force_update();
                            }
                        }
                    });
                }
                Err(err) => {
                    *banner.borrow_mut() = Some(Banner::general(err.to_string()));
                    refresh.force_update();
                }
            }
            || ()
        });
    }

    let on_toggle = {
        let config = config.clone();
        let tracker = tracker.clone();
        let banner = banner.clone();
        let refresh = refresh.clone();
        Callback::from(move |(prefecture, checked): (Prefecture, bool)| {
            let ticket = tracker.borrow_mut().toggle(&prefecture, checked);
            refresh.force_update();
            let Some(ticket) = ticket else {
                return;
            };
            let Ok(config) = &*config else {
                tracker.borrow_mut().deselect(ticket.code());
                return;
            };
            let config = config.clone();
            let tracker = tracker.clone();
            let banner = banner.clone();
            let refresh = refresh.clone();
            spawn_local(async move {
                let code = ticket.code();
                let outcome = fetch::fetch_total_population(&config, code).await;
                let name = ticket.name().to_string();
                let completion = tracker.borrow_mut().complete(ticket, outcome);
                match completion {
                    Completion::Applied => clear_resolved(&mut banner.borrow_mut(), code),
                    Completion::Stale => {}
                    Completion::Failed(err) => {
                        warn!(name = %name, error = %err, "人口データの取得に失敗");
                        *banner.borrow_mut() = Some(Banner::fetch_failed(code, &name, &err));
                    }
                }
                refresh.force_update();
            });
        })
    };

    let revision = tracker.borrow().revision();
    let table = {
        let tracker = tracker.clone();
        use_memo(revision, move |_| {
            ChartTable::from_series(tracker.borrow().series())
        })
    };

    let message_view = if let Some(current) = &*banner.borrow() {
        html! { <div class="message error">{ current.text() }</div> }
    } else {
        Html::default()
    };

    let tracker_snapshot = tracker.borrow();
    let checkboxes = catalog.iter().map(|prefecture| {
        let selected = tracker_snapshot.is_selected(prefecture.code);
        let pending = tracker_snapshot.is_pending(prefecture.code);
        let onchange = {
            let on_toggle = on_toggle.clone();
            let prefecture = prefecture.clone();
            Callback::from(move |event: Event| {
                if let Some(input) = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                {
                    on_toggle.emit((prefecture.clone(), input.checked()));
                }
            })
        };
        html! {
            <label key={prefecture.code.value()} class={classes!(pending.then_some("pending"))}>
                <input type="checkbox"
                       name={prefecture.code.to_string()}
                       value={prefecture.name.clone()}
                       checked={selected}
                       {onchange} />
                { &prefecture.name }
            </label>
        }
    });

    html! {
        <div class="App">
            { message_view }
            <div class="check_wrap">
                { for checkboxes }
            </div>
            <div>
                <PopulationChart table={Rc::clone(&table)} />
            </div>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    yew::Renderer::<App>::new().render();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn start() {
    panic!("prefpop-web は wasm32-unknown-unknown ターゲットでのみ利用できます。");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_env_requires_key() {
        let err = config_from_build_env(None, None).unwrap_err();
        assert_eq!(err, ConfigError::MissingVariable(API_KEY_VAR));

        let config = config_from_build_env(Some("secret"), Some("http://localhost:3000")).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, "http://localhost:3000/");
    }

    #[test]
    fn failure_message_names_the_prefecture() {
        let missing = FetchError::MissingSeries {
            label: "総人口".to_string(),
        };
        assert_eq!(
            failure_message("東京都", &missing),
            "東京都 の総人口データが見つかりませんでした。"
        );
        let transport = FetchError::Transport("offline".to_string());
        assert!(failure_message("大阪府", &transport).starts_with("大阪府 の人口データを取得できませんでした"));
    }

    #[test]
    fn success_only_clears_its_own_failure() {
        let tokyo = PrefCode(13);
        let osaka = PrefCode(27);
        let err = FetchError::Status { status: 500 };

        let mut banner = Some(Banner::fetch_failed(tokyo, "東京都", &err));
        clear_resolved(&mut banner, osaka);
        assert_eq!(banner.as_ref().map(Banner::text), Some(failure_message("東京都", &err).as_str()));

        clear_resolved(&mut banner, tokyo);
        assert_eq!(banner, None);
    }

    #[test]
    fn general_messages_survive_successes() {
        let mut banner = Some(Banner::general("都道府県一覧を取得できませんでした"));
        clear_resolved(&mut banner, PrefCode(13));
        assert!(banner.is_some());
    }
}

mod commands;

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};
use prefpop_core::{ChartTable, Prefecture, SelectionTracker, find_prefecture};

use crate::client::PopulationApi;
pub use commands::{CommandRegistry, Context};

/// 都道府県一覧と選択状態。
pub struct Session {
    catalog: Vec<Prefecture>,
    tracker: SelectionTracker,
}

impl Session {
    pub fn new(catalog: Vec<Prefecture>) -> Self {
        Self {
            catalog,
            tracker: SelectionTracker::new(),
        }
    }

    pub fn catalog(&self) -> &[Prefecture] {
        &self.catalog
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SelectionTracker {
        &mut self.tracker
    }

    pub fn table(&self) -> ChartTable {
        ChartTable::from_series(self.tracker.series())
    }
}

pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    api: &dyn PopulationApi,
    input: R,
    out: &mut W,
) -> Result<()> {
    let registry = CommandRegistry::default();
    print_intro(out, session)?;

    let mut lines = input.lines();
    loop {
        write!(out, "[{}件選択中]> ", session.tracker().len())
            .and_then(|_| out.flush())
            .context("プロンプトの出力に失敗しました")?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            writeln!(out, "入力が終了したため終了します。")?;
            return Ok(());
        };
        let line = line.context("入力の読み込みに失敗しました")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut ctx = Context::new(session, api, out);
        if let Err(error) = registry.execute_input(&mut ctx, trimmed) {
            writeln!(ctx.out(), "エラー: {error}")?;
        }
        if ctx.exit_requested() {
            return Ok(());
        }
    }
}

fn print_intro(out: &mut dyn Write, session: &Session) -> Result<()> {
    writeln!(out, "都道府県別 総人口推移ビューア")?;
    writeln!(out, "{} 件の都道府県を取得しました。", session.catalog().len())?;
    writeln!(out, "コマンド例: list / add 13 / add 大阪府 / table / remove 13")?;
    writeln!(out, "help で利用可能なコマンド一覧を表示します。")?;
    Ok(())
}

pub(crate) fn print_help(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "利用可能なコマンド:")?;
    writeln!(out, "  list                  都道府県一覧と選択状態を表示")?;
    writeln!(out, "  add <都道府県>        総人口推移を取得してグラフに追加")?;
    writeln!(out, "  remove <都道府県>     グラフから除外")?;
    writeln!(out, "  table                 年ごとの表を表示")?;
    writeln!(out, "  json                  年ごとの表を JSON で表示")?;
    writeln!(out, "  quit                  終了")?;
    writeln!(out, "  <都道府県> は番号か正式名称 (例: 13, 東京都)")?;
    Ok(())
}

pub(crate) fn print_catalog(out: &mut dyn Write, session: &Session) -> Result<()> {
    for pref in session.catalog() {
        let mark = if session.tracker().is_selected(pref.code) {
            "x"
        } else {
            " "
        };
        writeln!(out, "[{mark}] {:>2}: {}", pref.code.value(), pref.name)?;
    }
    Ok(())
}

pub(crate) fn print_table(out: &mut dyn Write, table: &ChartTable) -> Result<()> {
    if table.is_empty() {
        writeln!(out, "表示できるデータがありません。add で都道府県を追加してください。")?;
        return Ok(());
    }
    let mut header = format!("{:>6}", "年");
    for name in table.series_names() {
        header.push_str(&format!(" | {:>12}", name));
    }
    writeln!(out, "{header}")?;
    for row in table.rows() {
        let mut line = format!("{:>6}", row.year);
        for name in table.series_names() {
            let cell = row
                .value(name)
                .map(|value| format!("{value:.0}"))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" | {:>12}", cell));
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub(crate) fn resolve_prefecture<'a>(session: &'a Session, token: &str) -> Result<&'a Prefecture> {
    find_prefecture(session.catalog(), token).ok_or_else(|| {
        anyhow::anyhow!(
            "都道府県を特定できませんでした: {} (番号か正式名称を入力してください)",
            token
        )
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;

    use prefpop_core::{FetchError, PopulationPoint, PrefCode};

    use super::*;

    struct FakeApi {
        responses: HashMap<u32, Result<Vec<PopulationPoint>, FetchError>>,
        calls: RefCell<Vec<u32>>,
    }

    impl FakeApi {
        fn new() -> Self {
            let mut responses = HashMap::new();
            responses.insert(
                13,
                Ok(vec![
                    PopulationPoint::new(1980, 100.0),
                    PopulationPoint::new(1990, 110.0),
                ]),
            );
            responses.insert(27, Ok(vec![PopulationPoint::new(1990, 50.0)]));
            responses.insert(
                1,
                Err(FetchError::MissingSeries {
                    label: "総人口".to_string(),
                }),
            );
            Self {
                responses,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PopulationApi for FakeApi {
        fn prefectures(&self) -> Result<Vec<Prefecture>, FetchError> {
            Ok(catalog())
        }

        fn total_population(&self, code: PrefCode) -> Result<Vec<PopulationPoint>, FetchError> {
            self.calls.borrow_mut().push(code.value());
            self.responses
                .get(&code.value())
                .cloned()
                .unwrap_or(Err(FetchError::Status { status: 404 }))
        }
    }

    fn catalog() -> Vec<Prefecture> {
        vec![
            Prefecture::new(1, "北海道"),
            Prefecture::new(13, "東京都"),
            Prefecture::new(27, "大阪府"),
        ]
    }

    fn run_script(script: &str) -> (Session, String, Vec<u32>) {
        let api = FakeApi::new();
        let mut session = Session::new(api.prefectures().unwrap());
        let mut out = Vec::new();
        run(&mut session, &api, Cursor::new(script.to_string()), &mut out).unwrap();
        let calls = api.calls.borrow().clone();
        (session, String::from_utf8(out).unwrap(), calls)
    }

    #[test]
    fn add_and_table_print_pivoted_rows() {
        let (session, output, calls) = run_script("add 13\nadd 大阪府\ntable\nquit\n");
        assert_eq!(calls, vec![13, 27]);
        assert_eq!(session.tracker().len(), 2);
        assert!(output.contains("東京都 を追加しました"));
        assert!(output.contains("  1980 |          100 |            -"));
        assert!(output.contains("  1990 |          110 |           50"));
    }

    #[test]
    fn remove_drops_series() {
        let (session, output, _) = run_script("add 13\nadd 27\nremove 東京都\njson\n");
        let names: Vec<_> = session.tracker().series().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["大阪府"]);
        assert!(output.contains(r#""大阪府": 50.0"#));
        assert!(!output.contains(r#""東京都""#));
        assert!(output.contains("入力が終了したため終了します。"));
    }

    #[test]
    fn failed_fetch_is_reported_and_isolated() {
        let (session, output, _) = run_script("add 13\nadd 1\nlist\n");
        assert!(output.contains("エラー: 北海道 の人口データを取得できませんでした"));
        assert_eq!(session.tracker().len(), 1);
        assert!(output.contains("[ ]  1: 北海道"));
        assert!(output.contains("[x] 13: 東京都"));
    }

    #[test]
    fn unknown_input_keeps_loop_running() {
        let (session, output, calls) = run_script("frobnicate\nadd 99\nremove 13\nadd 13\n");
        assert!(output.contains("エラー: 未対応のコマンドです: frobnicate"));
        assert!(output.contains("エラー: 都道府県を特定できませんでした: 99"));
        assert!(output.contains("東京都 は選択されていません。"));
        assert_eq!(calls, vec![13]);
        assert_eq!(session.tracker().len(), 1);
    }

    #[test]
    fn adding_twice_does_not_duplicate() {
        let (session, output, calls) = run_script("add 13\nadd 13\n");
        assert_eq!(calls, vec![13]);
        assert!(output.contains("東京都 は既に選択されています。"));
        assert_eq!(session.tracker().len(), 1);
    }

    #[test]
    fn empty_table_hints_at_add() {
        let (_, output, _) = run_script("table\n");
        assert!(output.contains("表示できるデータがありません"));
    }
}

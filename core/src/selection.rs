use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::{PopulationPoint, PrefCode, Prefecture, PrefectureSeries};

/// 取得中のリクエスト 1 件。`complete` に返すまで保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    prefecture: Prefecture,
    generation: u64,
}

impl FetchTicket {
    pub fn code(&self) -> PrefCode {
        self.prefecture.code
    }

    pub fn name(&self) -> &str {
        &self.prefecture.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied,
    /// 選択解除または再選択により不要になった応答。
    Stale,
    Failed(FetchError),
}

/// チェックボックスの切り替えを、選択中系列の追加・削除に変換する。
///
/// 系列と取得中リクエストはどちらも都道府県コードで管理する。
/// 同じ都道府県を再度選択すると世代番号が進み、古い応答は `Stale` として捨てられる。
#[derive(Debug, Default)]
pub struct SelectionTracker {
    active: IndexMap<PrefCode, PrefectureSeries>,
    pending: HashMap<PrefCode, u64>,
    next_generation: u64,
    revision: u64,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, prefecture: &Prefecture, checked: bool) -> Option<FetchTicket> {
        if checked {
            self.next_generation += 1;
            let generation = self.next_generation;
            self.pending.insert(prefecture.code, generation);
            debug!(code = %prefecture.code, name = %prefecture.name, generation, "選択: 取得を開始");
            Some(FetchTicket {
                prefecture: prefecture.clone(),
                generation,
            })
        } else {
            self.deselect(prefecture.code);
            None
        }
    }

    pub fn deselect(&mut self, code: PrefCode) {
        let was_pending = self.pending.remove(&code).is_some();
        let removed = self.active.shift_remove(&code).is_some();
        if removed {
            self.revision += 1;
        }
        debug!(code = %code, was_pending, removed, "選択解除");
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<PopulationPoint>, FetchError>,
    ) -> Completion {
        let code = ticket.code();
        match self.pending.get(&code) {
            Some(generation) if *generation == ticket.generation => {}
            _ => {
                debug!(code = %code, generation = ticket.generation, "古い応答を破棄");
                return Completion::Stale;
            }
        }
        self.pending.remove(&code);

        match outcome {
            Ok(points) => {
                debug!(code = %code, points = points.len(), "系列を追加");
                // 既存キーへの insert は位置を保ったまま置き換える
                self.active
                    .insert(code, PrefectureSeries::new(ticket.prefecture, points));
                self.revision += 1;
                Completion::Applied
            }
            Err(err) => {
                warn!(code = %code, name = %ticket.prefecture.name, error = %err, "系列の取得に失敗");
                Completion::Failed(err)
            }
        }
    }

    pub fn series(&self) -> impl Iterator<Item = &PrefectureSeries> {
        self.active.values()
    }

    pub fn is_selected(&self, code: PrefCode) -> bool {
        self.active.contains_key(&code) || self.pending.contains_key(&code)
    }

    pub fn is_pending(&self, code: PrefCode) -> bool {
        self.pending.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// 選択中系列が変わるたびに増える。再集計の判定に使う。
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo() -> Prefecture {
        Prefecture::new(13, "東京都")
    }

    fn osaka() -> Prefecture {
        Prefecture::new(27, "大阪府")
    }

    fn points(pairs: &[(i32, f64)]) -> Vec<PopulationPoint> {
        pairs
            .iter()
            .map(|(year, value)| PopulationPoint::new(*year, *value))
            .collect()
    }

    fn names(tracker: &SelectionTracker) -> Vec<String> {
        tracker.series().map(|series| series.name.clone()).collect()
    }

    #[test]
    fn check_then_complete_appends_series() {
        let mut tracker = SelectionTracker::new();
        let ticket = tracker.toggle(&tokyo(), true).expect("ticket");
        assert!(tracker.is_pending(PrefCode(13)));
        assert!(tracker.is_empty());

        let outcome = tracker.complete(ticket, Ok(points(&[(1980, 100.0)])));
        assert_eq!(outcome, Completion::Applied);
        assert!(!tracker.is_pending(PrefCode(13)));
        assert!(tracker.is_selected(PrefCode(13)));
        assert_eq!(names(&tracker), vec!["東京都"]);
        assert_eq!(tracker.revision(), 1);
    }

    #[test]
    fn uncheck_removes_entry_and_is_noop_when_absent() {
        let mut tracker = SelectionTracker::new();
        assert!(tracker.toggle(&osaka(), false).is_none());
        assert_eq!(tracker.revision(), 0);

        let ticket = tracker.toggle(&tokyo(), true).unwrap();
        tracker.complete(ticket, Ok(points(&[(1980, 100.0)])));
        let ticket = tracker.toggle(&osaka(), true).unwrap();
        tracker.complete(ticket, Ok(points(&[(1990, 50.0)])));

        tracker.toggle(&tokyo(), false);
        assert_eq!(names(&tracker), vec!["大阪府"]);
        assert!(!tracker.is_selected(PrefCode(13)));
    }

    #[test]
    fn toggle_on_then_off_before_response_leaves_list_unchanged() {
        let mut tracker = SelectionTracker::new();
        let ticket = tracker.toggle(&tokyo(), true).unwrap();
        tracker.toggle(&tokyo(), false);

        let outcome = tracker.complete(ticket, Ok(points(&[(1980, 100.0)])));
        assert_eq!(outcome, Completion::Stale);
        assert!(tracker.is_empty());
        assert!(!tracker.is_selected(PrefCode(13)));
        assert_eq!(tracker.revision(), 0);
    }

    #[test]
    fn rapid_retoggle_keeps_a_single_entry() {
        let mut tracker = SelectionTracker::new();
        let first = tracker.toggle(&tokyo(), true).unwrap();
        tracker.toggle(&tokyo(), false);
        let second = tracker.toggle(&tokyo(), true).unwrap();

        assert_eq!(
            tracker.complete(second, Ok(points(&[(1980, 200.0)]))),
            Completion::Applied
        );
        assert_eq!(
            tracker.complete(first, Ok(points(&[(1980, 100.0)]))),
            Completion::Stale
        );
        assert_eq!(tracker.len(), 1);
        let series = tracker.series().next().unwrap();
        assert_eq!(series.points, points(&[(1980, 200.0)]));
    }

    #[test]
    fn refetch_replaces_in_place() {
        let mut tracker = SelectionTracker::new();
        for pref in [tokyo(), osaka()] {
            let ticket = tracker.toggle(&pref, true).unwrap();
            tracker.complete(ticket, Ok(points(&[(1980, 1.0)])));
        }
        let ticket = tracker.toggle(&tokyo(), true).unwrap();
        tracker.complete(ticket, Ok(points(&[(1980, 2.0)])));
        assert_eq!(names(&tracker), vec!["東京都", "大阪府"]);
        assert_eq!(tracker.series().next().unwrap().points, points(&[(1980, 2.0)]));
    }

    #[test]
    fn failure_is_isolated() {
        let mut tracker = SelectionTracker::new();
        let ticket = tracker.toggle(&tokyo(), true).unwrap();
        tracker.complete(ticket, Ok(points(&[(1980, 100.0)])));
        let revision = tracker.revision();

        let ticket = tracker.toggle(&osaka(), true).unwrap();
        let err = FetchError::MissingSeries {
            label: "総人口".to_string(),
        };
        let outcome = tracker.complete(ticket, Err(err.clone()));
        assert_eq!(outcome, Completion::Failed(err));
        assert_eq!(names(&tracker), vec!["東京都"]);
        assert!(!tracker.is_selected(PrefCode(27)));
        assert_eq!(tracker.revision(), revision);
    }

    #[test]
    fn responses_apply_in_arrival_order() {
        let mut tracker = SelectionTracker::new();
        let tokyo_ticket = tracker.toggle(&tokyo(), true).unwrap();
        let osaka_ticket = tracker.toggle(&osaka(), true).unwrap();
        tracker.complete(osaka_ticket, Ok(points(&[(1990, 50.0)])));
        tracker.complete(tokyo_ticket, Ok(points(&[(1980, 100.0)])));
        assert_eq!(names(&tracker), vec!["大阪府", "東京都"]);
    }
}

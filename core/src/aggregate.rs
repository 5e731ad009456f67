use indexmap::IndexMap;
use serde::Serialize;

use crate::model::PrefectureSeries;

/// 年ごとの 1 行。列はその年の値を持つ都道府県のみ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub year: i32,
    #[serde(flatten)]
    values: IndexMap<String, f64>,
}

impl ChartRow {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: IndexMap::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// 系列の並びを年をキーとする行の並びに組み替える。
///
/// 行の順序は走査中に各年が最初に現れた順 (系列は選択順、点は元の順)。
pub fn pivot<'a, I>(series: I) -> Vec<ChartRow>
where
    I: IntoIterator<Item = &'a PrefectureSeries>,
{
    let mut rows: IndexMap<i32, ChartRow> = IndexMap::new();
    for item in series {
        for point in &item.points {
            rows.entry(point.year)
                .or_insert_with(|| ChartRow::new(point.year))
                .set(&item.name, point.value);
        }
    }
    rows.into_values().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartTable {
    series_names: Vec<String>,
    rows: Vec<ChartRow>,
}

impl ChartTable {
    pub fn from_series<'a, I>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a PrefectureSeries>,
    {
        let mut series_names = Vec::new();
        let rows = pivot(
            series
                .into_iter()
                .inspect(|item| series_names.push(item.name.clone())),
        );
        Self { series_names, rows }
    }

    pub fn series_names(&self) -> &[String] {
        &self.series_names
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|row| row.year).min()?;
        let max = self.rows.iter().map(|row| row.year).max()?;
        Some((min, max))
    }

    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|row| row.values())
            .map(|(_, value)| value)
            .fold(None, |acc, value| match acc {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }
}

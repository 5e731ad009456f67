use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefCode(pub u32);

impl PrefCode {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PrefCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefecture {
    pub code: PrefCode,
    pub name: String,
}

impl Prefecture {
    pub fn new(code: u32, name: impl Into<String>) -> Self {
        Self {
            code: PrefCode(code),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    pub year: i32,
    pub value: f64,
}

impl PopulationPoint {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// 選択中の都道府県 1 件分の総人口推移。
#[derive(Debug, Clone, PartialEq)]
pub struct PrefectureSeries {
    pub code: PrefCode,
    pub name: String,
    pub points: Vec<PopulationPoint>,
}

impl PrefectureSeries {
    pub fn new(prefecture: Prefecture, points: Vec<PopulationPoint>) -> Self {
        Self {
            code: prefecture.code,
            name: prefecture.name,
            points,
        }
    }
}

/// 番号 (1 始まり) か完全な名前で都道府県を引く。
pub fn find_prefecture<'a>(catalog: &'a [Prefecture], token: &str) -> Option<&'a Prefecture> {
    let token = token.trim();
    if let Ok(code) = token.parse::<u32>() {
        return catalog.iter().find(|pref| pref.code.value() == code);
    }
    catalog.iter().find(|pref| pref.name == token)
}

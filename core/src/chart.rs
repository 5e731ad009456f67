//! 集計済みの表から折れ線グラフの座標を計算する。
//!
//! x 軸は最小年から最大年までの線形軸で、行の並びに関係なく年の昇順に置く。
//! y 軸は 0 始まりの線形軸。値が欠けている年で線は途切れ、前後は別の線分になる。

use crate::aggregate::ChartTable;

pub const PALETTE: [&str; 8] = [
    "#8884d8", "#82ca9d", "#ff7300", "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4",
];

const Y_AXIS_WIDTH: f64 = 60.0;
const X_AXIS_HEIGHT: f64 = 30.0;
const Y_TICK_INTERVALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            margin: Margin {
                top: 5.0,
                right: 20.0,
                bottom: 5.0,
                left: 30.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    fn from_layout(layout: &ChartLayout) -> Self {
        Self {
            left: layout.margin.left + Y_AXIS_WIDTH,
            top: layout.margin.top,
            right: layout.width - layout.margin.right,
            bottom: layout.height - layout.margin.bottom - X_AXIS_HEIGHT,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePath {
    pub name: String,
    pub color: &'static str,
    pub segments: Vec<Vec<(f64, f64)>>,
}

impl LinePath {
    /// SVG の `d` 属性。線分ごとに `M` から始める。
    pub fn svg_path(&self) -> String {
        let mut parts = Vec::new();
        for segment in &self.segments {
            for (idx, (x, y)) in segment.iter().enumerate() {
                let command = if idx == 0 { 'M' } else { 'L' };
                parts.push(format!("{command}{x:.2},{y:.2}"));
            }
        }
        parts.join(" ")
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.segments.iter().flatten().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub layout: ChartLayout,
    pub plot: PlotArea,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub lines: Vec<LinePath>,
}

impl ChartGeometry {
    pub fn build(table: &ChartTable, layout: &ChartLayout) -> Self {
        let plot = PlotArea::from_layout(layout);
        let rows = table.rows();

        // 行は集計時の出現順なので、座標は年順に並べ直してから計算する。
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&idx| rows[idx].year);
        let years = table.year_range();
        let x_positions: Vec<f64> = order
            .iter()
            .map(|&idx| year_position(rows[idx].year, years, &plot))
            .collect();
        let x_ticks = order
            .iter()
            .zip(&x_positions)
            .map(|(&idx, x)| AxisTick {
                position: *x,
                label: rows[idx].year.to_string(),
            })
            .collect();

        let max_value = table.value_range().map(|(_, max)| max).unwrap_or(0.0);
        let step = nice_step(max_value / Y_TICK_INTERVALS as f64);
        let y_max = step * Y_TICK_INTERVALS as f64;
        let y_of = |value: f64| plot.bottom - value / y_max * plot.height();
        let y_ticks = (0..=Y_TICK_INTERVALS)
            .map(|idx| {
                let value = step * idx as f64;
                AxisTick {
                    position: y_of(value),
                    label: format_tick(value),
                }
            })
            .collect();

        let lines = table
            .series_names()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let mut segments = Vec::new();
                let mut current = Vec::new();
                for (&row_idx, x) in order.iter().zip(&x_positions) {
                    match rows[row_idx].value(name) {
                        Some(value) => current.push((*x, y_of(value))),
                        None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                        None => {}
                    }
                }
                if !current.is_empty() {
                    segments.push(current);
                }
                LinePath {
                    name: name.clone(),
                    color: PALETTE[idx % PALETTE.len()],
                    segments,
                }
            })
            .collect();

        Self {
            layout: *layout,
            plot,
            x_ticks,
            y_ticks,
            lines,
        }
    }
}

fn year_position(year: i32, range: Option<(i32, i32)>, plot: &PlotArea) -> f64 {
    match range {
        Some((min, max)) if max > min => {
            plot.left + plot.width() * f64::from(year - min) / f64::from(max - min)
        }
        _ => plot.left + plot.width() / 2.0,
    }
}

/// 1, 2, 2.5, 5 に 10 の冪を掛けた値のうち `raw` 以上で最小のもの。
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let normalized = raw / magnitude;
    let factor = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|candidate| normalized <= *candidate)
        .unwrap_or(10.0);
    factor * magnitude
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

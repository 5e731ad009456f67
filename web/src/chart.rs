use std::rc::Rc;

use prefpop_core::{ChartGeometry, ChartLayout, ChartTable};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PopulationChartProps {
    pub table: Rc<ChartTable>,
}

#[function_component(PopulationChart)]
pub fn population_chart(props: &PopulationChartProps) -> Html {
    let layout = ChartLayout::default();
    let geometry = ChartGeometry::build(&props.table, &layout);
    let plot = geometry.plot;

    let vertical_grid = geometry.x_ticks.iter().map(|tick| {
        html! {
            <line x1={tick.position.to_string()} y1={plot.top.to_string()}
                  x2={tick.position.to_string()} y2={plot.bottom.to_string()}
                  stroke="#ccc" stroke-dasharray="5 5" />
        }
    });
    let horizontal_grid = geometry.y_ticks.iter().map(|tick| {
        html! {
            <line x1={plot.left.to_string()} y1={tick.position.to_string()}
                  x2={plot.right.to_string()} y2={tick.position.to_string()}
                  stroke="#ccc" stroke-dasharray="5 5" />
        }
    });
    let x_labels = geometry.x_ticks.iter().map(|tick| {
        html! {
            <text x={tick.position.to_string()} y={(plot.bottom + 16.0).to_string()}
                  text-anchor="middle" font-size="11">{ &tick.label }</text>
        }
    });
    let y_labels = geometry.y_ticks.iter().map(|tick| {
        html! {
            <text x={(plot.left - 6.0).to_string()} y={(tick.position + 4.0).to_string()}
                  text-anchor="end" font-size="11">{ &tick.label }</text>
        }
    });
    let lines = geometry.lines.iter().map(|line| {
        let dots = line.points().map(|(x, y)| {
            html! {
                <circle cx={x.to_string()} cy={y.to_string()} r="3"
                        fill="#fff" stroke={line.color} />
            }
        });
        html! {
            <g key={line.name.clone()}>
                <path d={line.svg_path()} fill="none" stroke={line.color} stroke-width="1.5" />
                { for dots }
            </g>
        }
    });
    let legend = geometry.lines.iter().map(|line| {
        html! {
            <li key={line.name.clone()}>
                <span class="swatch" style={format!("background:{}", line.color)}></span>
                { &line.name }
            </li>
        }
    });

    html! {
        <div class="chart">
            <svg width={layout.width.to_string()} height={layout.height.to_string()}
                 viewBox={format!("0 0 {} {}", layout.width, layout.height)}>
                { for vertical_grid }
                { for horizontal_grid }
                <line x1={plot.left.to_string()} y1={plot.bottom.to_string()}
                      x2={plot.right.to_string()} y2={plot.bottom.to_string()} stroke="#666" />
                <line x1={plot.left.to_string()} y1={plot.top.to_string()}
                      x2={plot.left.to_string()} y2={plot.bottom.to_string()} stroke="#666" />
                { for x_labels }
                { for y_labels }
                { for lines }
            </svg>
            <ul class="legend">{ for legend }</ul>
        </div>
    }
}

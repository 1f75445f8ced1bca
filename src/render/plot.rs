use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::env::{Environment, GridAction, GridWorld, Position};
use crate::error::{Error, Result};
use crate::policy::QTable;

use super::cell_label;

const LINE_HEIGHT: i32 = 14;

fn plot_error(e: impl Display) -> Error {
    Error::Plot(e.to_string())
}

/// Draws every non-hole cell with its label: the greedy arrow where the agent
/// learned something, the cell value elsewhere.
pub fn save_policy_image(
    env: &GridWorld,
    q_table: &QTable<Position, GridAction>,
    path: &Path,
    cell_size: u32,
) -> Result<()> {
    let size: (u32, u32) = (env.cols() as u32 * cell_size, env.rows() as u32 * cell_size);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let cell: i32 = cell_size as i32;
    for pos in env.positions() {
        let value: Option<f64> = env.value(pos);
        if value.is_none() {
            continue;
        }
        let (x, y) = (pos.col * cell, pos.row * cell);
        let fill: RGBColor = if (pos.row + pos.col) % 2 == 0 {
            RGBColor(220, 220, 220)
        } else {
            RGBColor(225, 225, 225)
        };
        root.draw(&Rectangle::new([(x, y), (x + cell, y + cell)], fill.filled()))
            .map_err(plot_error)?;

        let label: String = cell_label(q_table.get(pos), value, false);
        let lines: Vec<&str> = label.lines().collect();
        let top: i32 = y + cell / 2 - (lines.len() as i32 * LINE_HEIGHT) / 2;
        let style = ("sans-serif", LINE_HEIGHT)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (i, line) in lines.iter().enumerate() {
            root.draw(&Text::new(
                line.to_string(),
                (x + cell / 2, top + i as i32 * LINE_HEIGHT),
                style.clone(),
            ))
            .map_err(plot_error)?;
        }
    }
    root.present().map_err(plot_error)?;
    Ok(())
}

pub fn plot_moving_average(
    series: &[Vec<f64>],
    legends: &[&str],
    title: &str,
    path: &Path,
) -> Result<()> {
    let colors: [&RGBColor; 6] = [&BLUE, &GREEN, &RED, &CYAN, &MAGENTA, &YELLOW];

    let len: usize = series.iter().map(Vec::len).max().unwrap_or(0).max(2);
    let (mut min, mut max) = series
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if !min.is_finite() || !max.is_finite() {
        min = -1.0;
        max = 1.0;
    } else if max <= min {
        min -= 1.0;
        max += 1.0;
    }

    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..len - 1, min..max)
        .map_err(plot_error)?;
    chart.configure_mesh().draw().map_err(plot_error)?;

    for (i, (values, legend)) in series.iter().zip(legends.iter()).enumerate() {
        let color: &RGBColor = colors[i % colors.len()];
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(x, y)| (x, *y)),
                color,
            ))
            .map_err(plot_error)?
            .label(*legend)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

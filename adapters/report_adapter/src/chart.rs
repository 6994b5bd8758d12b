use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use stats_core::domain::{CellValue, CrossTabResult};
use stats_core::error::RenderError;

use crate::markdown::{COMPARISON_TITLE, MISSING_LABEL};

/// Configuration options for the comparison chart
#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: COMPARISON_TITLE.to_string(),
            x_label: "Courtier".to_string(),
            y_label: "Nombre d'envois".to_string(),
            width: 1000,
            height: 600,
        }
    }
}

/// Bars of one category: (group position, count)
struct Series<'a> {
    category: &'a CellValue,
    bars: Vec<(usize, usize)>,
}

/// Axis and legend text; missing is parenthesized
fn chart_label(value: &CellValue) -> String {
    match value {
        CellValue::Present(text) => text.clone(),
        CellValue::Missing => format!("({})", MISSING_LABEL),
    }
}

/// Splits a cross-tabulation into x-axis groups and one series per category,
/// both keyed on the cell value and in first-seen order
fn layout(comparison: &CrossTabResult) -> (Vec<&CellValue>, Vec<Series<'_>>) {
    let mut groups: Vec<&CellValue> = Vec::new();
    let mut series: Vec<Series<'_>> = Vec::new();

    for entry in comparison {
        let group_pos = match groups.iter().position(|g| **g == entry.group) {
            Some(pos) => pos,
            None => {
                groups.push(&entry.group);
                groups.len() - 1
            }
        };

        match series.iter_mut().find(|s| *s.category == entry.category) {
            Some(s) => s.bars.push((group_pos, entry.count)),
            None => series.push(Series {
                category: &entry.category,
                bars: vec![(group_pos, entry.count)],
            }),
        }
    }

    (groups, series)
}

/// Draws a grouped bar chart (group on x, count on y, one colour per category)
/// into an SVG file
pub fn render_grouped_bar_chart(
    comparison: &CrossTabResult,
    options: &ChartOptions,
    path: &Path,
) -> Result<(), RenderError> {
    draw(comparison, options, path).map_err(|e| RenderError::Chart(e.to_string()))?;
    tracing::info!(path = %path.display(), bars = comparison.len(), "chart written");
    Ok(())
}

fn draw(
    comparison: &CrossTabResult,
    options: &ChartOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let (groups, series) = layout(comparison);
    let max_count = comparison.iter().map(|e| e.count).max().unwrap_or(0);

    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5..(groups.len().max(1) as f64 - 0.5);
    let y_range = 0.0..((max_count as f64) * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    let label_for = |x: &f64| {
        let rounded = x.round();
        if (x - rounded).abs() < 1e-6 && rounded >= 0.0 {
            groups.get(rounded as usize).map(|g| chart_label(g)).unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() + 1)
        .x_label_formatter(&label_for)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    // bars of one group share 80% of its slot
    let bar_width = 0.8 / series.len().max(1) as f64;
    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let offset = -0.4 + idx as f64 * bar_width;

        chart
            .draw_series(s.bars.iter().map(|&(group_pos, count)| {
                let x0 = group_pos as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, count as f64)], color.filled())
            }))?
            .label(chart_label(s.category))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

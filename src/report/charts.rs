//! SVG chart rendering.
//!
//! Yearly views are drawn as line charts, operator rankings as
//! horizontal bar charts with the top-ranked operator at the top.

use crate::analysis::Analysis;
use crate::error::{PipelineError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chart rendering options.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Directory the SVG files go to; created if missing.
    pub output_dir: PathBuf,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Show a progress bar while rendering.
    pub show_progress: bool,
}

/// One line series over years.
struct LineChart<'a> {
    file: &'a str,
    title: &'a str,
    y_label: &'a str,
    color: RGBColor,
    points: Vec<(i32, f64)>,
}

/// One ranked horizontal bar chart.
struct BarChart<'a> {
    file: &'a str,
    title: &'a str,
    x_label: &'a str,
    color: RGBColor,
    bars: Vec<(String, f64)>,
}

enum Chart<'a> {
    Line(LineChart<'a>),
    Bar(BarChart<'a>),
}

impl Chart<'_> {
    fn file(&self) -> &str {
        match self {
            Chart::Line(c) => c.file,
            Chart::Bar(c) => c.file,
        }
    }
}

fn year_points<V: Copy + Into<f64>>(series: &BTreeMap<i32, V>) -> Vec<(i32, f64)> {
    series.iter().map(|(y, v)| (*y, (*v).into())).collect()
}

/// Build the five charts in display order.
fn charts(analysis: &Analysis) -> Vec<Chart<'static>> {
    vec![
        Chart::Line(LineChart {
            file: "01_yearly_crashes.svg",
            title: "Yearly Plane Crashes",
            y_label: "Number of Crashes",
            color: BLUE,
            points: analysis
                .yearly_crashes
                .iter()
                .map(|(y, c)| (*y, *c as f64))
                .collect(),
        }),
        Chart::Line(LineChart {
            file: "02_yearly_fatalities.svg",
            title: "Yearly Fatalities",
            y_label: "Fatalities",
            color: RED,
            points: year_points(&analysis.yearly_fatalities),
        }),
        Chart::Bar(BarChart {
            file: "03_top_operators_by_crashes.svg",
            title: "Top 10 Airlines with Most Crashes",
            x_label: "Number of Crashes",
            color: RGBColor(49, 130, 189),
            bars: analysis
                .top_by_crashes
                .iter()
                .map(|r| (r.operator.clone(), r.value as f64))
                .collect(),
        }),
        Chart::Bar(BarChart {
            file: "04_top_operators_by_fatalities.svg",
            title: "Top 10 Airlines with Most Fatalities",
            x_label: "Fatalities",
            color: RGBColor(222, 45, 38),
            bars: analysis
                .top_by_fatalities
                .iter()
                .map(|r| (r.operator.clone(), r.value))
                .collect(),
        }),
        Chart::Bar(BarChart {
            file: "05_top_operators_by_survival_rate.svg",
            title: "Top Airlines by Survival Rate (among top 10 by Aboard)",
            x_label: "Survival Rate (%)",
            color: RGBColor(49, 163, 84),
            bars: analysis
                .top_by_aboard
                .iter()
                .map(|s| (s.operator.clone(), s.survival_rate().unwrap_or(0.0)))
                .collect(),
        }),
    ]
}

/// Render every chart and return the written paths in display order.
pub fn render_all(analysis: &Analysis, options: &ChartOptions) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&options.output_dir).map_err(|source| PipelineError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    let charts = charts(analysis);
    let pb = if options.show_progress {
        let pb = ProgressBar::new(charts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Rendering charts");
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut written = Vec::with_capacity(charts.len());
    for chart in &charts {
        let path = options.output_dir.join(chart.file());
        match chart {
            Chart::Line(c) => render_line_chart(c, &path, options.size)?,
            Chart::Bar(c) => render_bar_chart(c, &path, options.size)?,
        }
        debug!("Wrote {}", path.display());
        written.push(path);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "Rendered {} charts to {}",
        written.len(),
        options.output_dir.display()
    );
    Ok(written)
}

fn open_area<'a>(
    path: &'a Path,
    size: (u32, u32),
    name: &str,
) -> Result<DrawingArea<SVGBackend<'a>, Shift>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PipelineError::chart(name, e))?;
    Ok(root)
}

fn render_line_chart(chart: &LineChart<'_>, path: &Path, size: (u32, u32)) -> Result<()> {
    let err = |e| PipelineError::chart(chart.file, e);
    let root = open_area(path, size, chart.file)?;

    let (x_min, x_max) = match (chart.points.first(), chart.points.last()) {
        (Some((first, _)), Some((last, _))) => (*first, *last + 1),
        _ => (0, 1),
    };
    let y_max = axis_max(chart.points.iter().map(|(_, v)| *v));

    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(err)?;

    ctx.configure_mesh()
        .x_desc("Year")
        .y_desc(chart.y_label)
        .draw()
        .map_err(err)?;

    ctx.draw_series(LineSeries::new(chart.points.iter().copied(), &chart.color))
        .map_err(err)?;
    ctx.draw_series(
        chart
            .points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, chart.color.filled())),
    )
    .map_err(err)?;

    root.present().map_err(err)?;
    Ok(())
}

fn render_bar_chart(chart: &BarChart<'_>, path: &Path, size: (u32, u32)) -> Result<()> {
    let err = |e| PipelineError::chart(chart.file, e);
    let root = open_area(path, size, chart.file)?;

    let n = chart.bars.len() as i32;
    let x_max = axis_max(chart.bars.iter().map(|(_, v)| *v));
    // Rank 0 sits in the top segment.
    let label_at = |segment: i32| -> String {
        usize::try_from(n - 1 - segment)
            .ok()
            .and_then(|rank| chart.bars.get(rank))
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    };

    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(260)
        .build_cartesian_2d(0f64..x_max, (0..n.max(1)).into_segmented())
        .map_err(err)?;

    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(chart.bars.len().max(1))
        .y_label_formatter(&|v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(seg) => label_at(*seg),
            _ => String::new(),
        })
        .x_desc(chart.x_label)
        .draw()
        .map_err(err)?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(rank, (_, value))| {
        let seg = n - 1 - rank as i32;
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(seg)),
                (*value, SegmentValue::Exact(seg + 1)),
            ],
            chart.color.filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))
    .map_err(err)?;

    root.present().map_err(err)?;
    Ok(())
}

/// Upper bound for a value axis: 10% headroom, never empty.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

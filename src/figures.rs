/* standard use */
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/* external crate */
use anyhow::Context;
use plotters::prelude::*;

/* private use */
use crate::detail::enrich_max_flow;
use crate::stats::{aggregate_runtime, memory_scatter, AggregatedSeries};
use crate::table::BenchmarkRow;
use crate::util::{ChartType, GroupKey};

const FIGURE_SIZE: (u32, u32) = (960, 640);

/// Render the requested chart set into `figures_dir` and return the paths
/// actually written. The max-flow chart is skipped, not failed, when no row
/// can be enriched with a final flow value.
pub fn render_figures(
    rows: &[BenchmarkRow],
    results_dir: &Path,
    figures_dir: &Path,
    charts: &[ChartType],
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(figures_dir)
        .with_context(|| format!("could not create figures directory {}", figures_dir.display()))?;
    let mut written = Vec::new();
    for chart in charts {
        let path = figures_dir.join(format!("{}.png", chart.file_stem()));
        let wrote = match chart {
            ChartType::RuntimeVsNodes => {
                let series = aggregate_runtime(rows, GroupKey::Nodes);
                draw_median_lines(
                    &series,
                    &path,
                    "Runtime vs. Number of Nodes",
                    "Nodes (V)",
                    "Runtime (ms), median with IQR",
                    true,
                )?;
                true
            }
            ChartType::RuntimeVsDensity => {
                let series = aggregate_runtime(rows, GroupKey::Density);
                draw_median_lines(
                    &series,
                    &path,
                    "Runtime vs. Density",
                    "Density (E / possible edges)",
                    "Runtime (ms), median",
                    false,
                )?;
                true
            }
            ChartType::MemoryVsRuntime => {
                draw_memory_scatter(rows, &path)?;
                true
            }
            ChartType::MaxflowFlowVsRuntime => draw_maxflow_scatter(rows, results_dir, &path)?,
        };
        if wrote {
            log::info!("wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

fn line_ranges(series: &[AggregatedSeries], whiskers: bool) -> (Range<f64>, Range<f64>) {
    let mut x_max = 0.0f64;
    let mut y_max = 0.0f64;
    for s in series {
        for p in &s.points {
            x_max = x_max.max(p.x);
            y_max = y_max.max(if whiskers { p.median.max(p.q3) } else { p.median });
        }
    }
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if y_max <= 0.0 {
        y_max = 1.0;
    }
    (0.0..x_max * 1.05, 0.0..y_max * 1.08)
}

fn draw_median_lines(
    series: &[AggregatedSeries],
    path: &Path,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    whiskers: bool,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (x_range, y_range) = line_ranges(series, whiskers);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28).into_font())
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_range, y_range)?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx);
        let points: Vec<(f64, f64)> = s.points.iter().map(|p| (p.x, p.median)).collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(s.algorithm.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], Palette99::pick(idx).stroke_width(2))
            });
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
        if whiskers {
            chart.draw_series(s.points.iter().map(|p| {
                PathElement::new(vec![(p.x, p.q1), (p.x, p.q3)], color.mix(0.35).stroke_width(1))
            }))?;
        }
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }
    root.present()?;
    Ok(())
}

fn draw_memory_scatter(rows: &[BenchmarkRow], path: &Path) -> anyhow::Result<()> {
    let groups = memory_scatter(rows);
    let mut x_max = 0.0f64;
    let mut y_min = 0.0f64;
    let mut y_max = 0.0f64;
    for (_, points) in &groups {
        for &(x, y) in points {
            x_max = x_max.max(x);
            // memory delta can go negative when the collector runs mid-measurement
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Memory vs. Runtime", ("sans-serif", 28).into_font())
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(0.0..x_max * 1.05, y_min * 1.08..y_max * 1.08)?;
    chart
        .configure_mesh()
        .x_desc("Runtime (ms)")
        .y_desc("Memory Delta (KB)")
        .draw()?;

    for (idx, (algorithm, points)) in groups.iter().enumerate() {
        let color = Palette99::pick(idx);
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 3, color.mix(0.5).filled())),
            )?
            .label(algorithm.as_str())
            .legend(move |(x, y)| Circle::new((x + 9, y), 4, Palette99::pick(idx).filled()));
    }

    if !groups.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }
    root.present()?;
    Ok(())
}

/// Returns false (and writes nothing) when no max-flow row could be
/// enriched with a final flow value.
fn draw_maxflow_scatter(
    rows: &[BenchmarkRow],
    results_dir: &Path,
    path: &Path,
) -> anyhow::Result<bool> {
    let samples = enrich_max_flow(rows, results_dir);
    let points: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| rows[s.row_index].runtime_ms.map(|runtime| (s.flow, runtime)))
        .collect();
    if points.is_empty() {
        log::info!(
            "no max-flow rows with resolvable detail files, skipping {}",
            path.display()
        );
        return Ok(false);
    }

    let mut x_max = 0.0f64;
    let mut y_max = 0.0f64;
    for &(x, y) in &points {
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if y_max <= 0.0 {
        y_max = 1.0;
    }

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("MaxFlow: Flow Value vs Runtime", ("sans-serif", 28).into_font())
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(0.0..x_max * 1.05, 0.0..y_max * 1.08)?;
    chart
        .configure_mesh()
        .x_desc("Final Max Flow Value")
        .y_desc("Runtime (ms)")
        .draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 4, BLUE.mix(0.6).filled())),
    )?;
    root.present()?;
    Ok(true)
}

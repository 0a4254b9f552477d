//! Drawing charts with plotters.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::colormap::viridis;
use crate::error::{render_err, Result, VizError};
use crate::panel::{HistogramChart, Panel};

/// Draw every panel of `chart` onto `root`, in a grid.
pub fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &HistogramChart,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let (rows, cols) = chart.options.grid(chart.panels.len());
    if rows == 0 {
        tracing::warn!("No panels to draw");
        return Ok(());
    }

    let areas = root.split_evenly((rows, cols));
    for (panel, area) in chart.panels.iter().zip(areas.iter()) {
        draw_panel(area, panel, chart)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    chart: &HistogramChart,
) -> Result<()> {
    let n_batches = panel.n_batches().max(1) as f32;
    let n_bins = panel.n_bins().max(1) as f32;
    let area = if chart.options.aspect_auto {
        area.clone()
    } else {
        square_cells(area, n_batches, n_bins)
    };

    let mut cc = ChartBuilder::on(&area)
        .caption(panel.title(chart.options.show_layer_info), ("sans-serif", 14))
        .margin(6)
        .x_label_area_size(24)
        .y_label_area_size(24)
        .build_cartesian_2d(0f32..n_batches, 0f32..n_bins)
        .map_err(render_err)?;

    cc.configure_mesh()
        .disable_mesh()
        .x_desc("batch")
        .y_desc(format!("{} : {}", chart.lower, chart.upper))
        .y_label_formatter(&|_| String::new())
        .draw()
        .map_err(render_err)?;

    let range = panel.log_range();
    cc.draw_series(panel.image.indexed_iter().map(|((bin, batch), &value)| {
        let t = match range {
            Some((lo, hi)) if value.is_finite() && hi > lo => (value - lo) / (hi - lo),
            Some(_) if value.is_finite() => 1.0,
            _ => 0.0,
        };
        let (x, y) = (batch as f32, bin as f32);
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], viridis(f64::from(t)).filled())
    }))
    .map_err(render_err)?;

    cc.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, panel.zero_position), (n_batches, panel.zero_position)],
        RED.stroke_width(1),
    )))
    .map_err(render_err)?;

    for &x in &panel.epoch_markers {
        cc.draw_series(std::iter::once(PathElement::new(
            vec![(x, 0.0), (x, n_bins)],
            BLUE.stroke_width(1),
        )))
        .map_err(render_err)?;
    }

    for overlay in &panel.overlays {
        let series = cc
            .draw_series(LineSeries::new(
                overlay.points.iter().copied(),
                overlay.color.stroke_width(overlay.width),
            ))
            .map_err(render_err)?;
        if let Some(label) = &overlay.label {
            let color = overlay.color;
            series
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
        }
    }

    if panel.overlays.iter().any(|o| o.label.is_some()) {
        cc.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

/// Shrink `area` so that batch and bin cells come out square.
fn square_cells<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    n_batches: f32,
    n_bins: f32,
) -> DrawingArea<DB, Shift> {
    let (width, height) = area.dim_in_pixel();
    let scale = (width as f32 / n_batches).min(height as f32 / n_bins);
    let (w, h) = ((n_batches * scale) as i32, (n_bins * scale) as i32);
    let left = (width as i32 - w) / 2;
    let top = (height as i32 - h) / 2;
    area.clone().shrink((left, top), (w, h))
}

/// Render the chart as an SVG document.
pub fn render_svg(chart: &HistogramChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, chart.options.size).into_drawing_area();
        draw_on(&root, chart)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Render the chart as a PNG file.
pub fn render_png(chart: &HistogramChart, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, chart.options.size).into_drawing_area();
    draw_on(&root, chart)?;
    root.present().map_err(render_err)?;
    Ok(())
}

/// Write the chart to `path`, choosing SVG or PNG from the extension.
pub fn save(chart: &HistogramChart, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "svg" => std::fs::write(path, render_svg(chart)?)?,
        "png" => render_png(chart, path)?,
        other => return Err(VizError::UnsupportedFormat(other.to_string())),
    }
    tracing::info!("Chart written to {}", path.display());
    Ok(())
}

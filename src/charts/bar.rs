use plotters::prelude::*;
use std::path::Path;

use crate::charts::{
    category_at, category_axis, data::BarSeries, ChartError, ChartLabels, Result,
};

/// Draw `series` as vertical bars in the given order, one labeled slot per bar.
pub fn draw_bar_chart(
    series: &BarSeries,
    labels: &ChartLabels,
    color: RGBColor,
    output_path: &Path,
) -> Result<()> {
    if series.is_empty() {
        return Err(ChartError::InvalidData("bar series cannot be empty".into()));
    }
    if series.labels.len() != series.values.len() {
        return Err(ChartError::InvalidData(format!(
            "{} labels for {} bars",
            series.labels.len(),
            series.values.len()
        )));
    }

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let (x_axis, first) = category_axis(series.len());
    let slots = x_axis.end as usize + 1;
    let max = series.max_value();
    let y_top = max + max / 10 + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_axis.into_segmented(), 0u64..y_top)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    let bar_label = |v: &SegmentValue<u32>| {
        category_at(v, first, series.len())
            .map(|i| series.labels[i].clone())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&bar_label)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(8)
                .data(
                    series
                        .values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (first + i as u32, *v)),
                ),
        )
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

use plotters::prelude::*;
use std::path::Path;

use crate::charts::{
    category_at, category_axis, data::YearlyDistribution, palette_color, ChartError,
    ChartLabels, Result,
};

/// Draw one vertical box per year over that year's daily counts.
pub fn draw_box_plot(
    dist: &YearlyDistribution,
    labels: &ChartLabels,
    output_path: &Path,
) -> Result<()> {
    if dist.groups.is_empty() {
        return Err(ChartError::InvalidData("box plot needs at least one year".into()));
    }
    if let Some((year, _)) = dist.groups.iter().find(|(_, counts)| counts.is_empty()) {
        return Err(ChartError::InvalidData(format!(
            "year {} has no daily counts",
            year
        )));
    }

    let quartiles: Vec<Quartiles> = dist
        .groups
        .iter()
        .map(|(_, counts)| {
            let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
            Quartiles::new(&values)
        })
        .collect();

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let (x_axis, first) = category_axis(dist.groups.len());
    let slots = x_axis.end as usize + 1;
    let y_top = dist.max_count() as f32 * 1.1 + 1.0;

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_axis.into_segmented(), 0f32..y_top)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    let year_label = |v: &SegmentValue<u32>| {
        category_at(v, first, dist.groups.len())
            .map(|i| dist.groups[i].0.to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&year_label)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(quartiles.iter().enumerate().map(|(i, q)| {
            Boxplot::new_vertical(SegmentValue::CenterOf(first + i as u32), q)
                .width(40)
                .whisker_width(0.5)
                .style(palette_color(i))
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

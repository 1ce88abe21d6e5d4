use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use crate::charts::{
    category_at, category_axis,
    data::{HeatmapGrid, MONTH_ABBREVIATIONS},
    ChartError, ChartLabels, Result,
};

// light yellow -> teal -> dark blue
const LOW: (f64, f64, f64) = (255.0, 255.0, 217.0);
const MID: (f64, f64, f64) = (65.0, 182.0, 196.0);
const HIGH: (f64, f64, f64) = (8.0, 29.0, 88.0);

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> RGBColor {
    let mix = |x: f64, y: f64| (x + (y - x) * t).round().clamp(0.0, 255.0) as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Map `t` in `[0, 1]` onto the sequential palette.
pub fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(LOW, MID, t * 2.0)
    } else {
        lerp(MID, HIGH, (t - 0.5) * 2.0)
    }
}

fn month_name(month: u32) -> String {
    MONTH_ABBREVIATIONS
        .get(month.wrapping_sub(1) as usize)
        .map(|m| m.to_string())
        .unwrap_or_else(|| month.to_string())
}

/// Draw an annotated year × month heatmap; the earliest year is the top row.
pub fn draw_heatmap(grid: &HeatmapGrid, labels: &ChartLabels, output_path: &Path) -> Result<()> {
    if grid.years.is_empty() || grid.months.is_empty() {
        return Err(ChartError::InvalidData("heatmap grid cannot be empty".into()));
    }
    if grid.cells.len() != grid.years.len()
        || grid.cells.iter().any(|row| row.len() != grid.months.len())
    {
        return Err(ChartError::InvalidData(
            "heatmap cells do not match the year/month axes".into(),
        ));
    }

    let root = BitMapBackend::new(output_path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let cols = grid.months.len();
    let rows = grid.years.len();
    let (x_axis, first_col) = category_axis(cols);
    let (y_axis, first_row) = category_axis(rows);
    let (x_end, y_end) = (x_axis.end, y_axis.end);
    // row index 0 is drawn at the top
    let row_slot = |r: usize| first_row + (rows - 1 - r) as u32;
    let col_slot = |c: usize| first_col + c as u32;
    let next = |slot: u32, end: u32| {
        if slot < end {
            SegmentValue::Exact(slot + 1)
        } else {
            SegmentValue::Last
        }
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_axis.into_segmented(), y_axis.into_segmented())
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    let x_label = |v: &SegmentValue<u32>| {
        category_at(v, first_col, cols)
            .map(|c| month_name(grid.months[c]))
            .unwrap_or_default()
    };
    let y_label = |v: &SegmentValue<u32>| {
        category_at(v, first_row, rows)
            .map(|slot| grid.years[rows - 1 - slot].to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_end as usize + 1)
        .y_labels(y_end as usize + 1)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    let max = grid.max_count().max(1) as f64;
    let mut cells = Vec::new();
    for (r, row) in grid.cells.iter().enumerate() {
        for (c, count) in row.iter().enumerate() {
            if let Some(count) = count {
                cells.push((col_slot(c), row_slot(r), *count));
            }
        }
    }

    chart
        .draw_series(cells.iter().map(|(c, r, count)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(*c), SegmentValue::Exact(*r)),
                    (next(*c, x_end), next(*r, y_end)),
                ],
                heat_color(*count as f64 / max).filled(),
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    let annotation = |count: u64| {
        let style = TextStyle::from(("sans-serif", 18).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        // dark cells get light text
        if count as f64 / max > 0.6 {
            style.color(&WHITE)
        } else {
            style.color(&BLACK)
        }
    };
    chart
        .draw_series(cells.iter().map(|(c, r, count)| {
            Text::new(
                count.to_string(),
                (SegmentValue::CenterOf(*c), SegmentValue::CenterOf(*r)),
                annotation(*count),
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

use plotters::prelude::*;
use std::path::Path;

use crate::charts::{data::PieSlices, palette_color, ChartError, ChartLabels, Result};

/// Draw a pie chart starting at 12 o'clock; every slice is captioned with its share.
pub fn draw_pie_chart(slices: &PieSlices, labels: &ChartLabels, output_path: &Path) -> Result<()> {
    if slices.slices.is_empty() {
        return Err(ChartError::InvalidData("pie chart needs at least one slice".into()));
    }
    if slices.slices.iter().all(|s| s.count == 0) {
        return Err(ChartError::InvalidData("pie slices sum to zero".into()));
    }

    let root = BitMapBackend::new(output_path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;
    let area = root
        .titled(labels.title, ("sans-serif", 30))
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.32;

    let sizes: Vec<f64> = slices.slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(palette_color).collect();
    let captions: Vec<String> = slices.slices.iter().map(|s| s.caption()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &captions);
    // screen y grows downward, so -90 degrees is 12 o'clock
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    area.draw(&pie)
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

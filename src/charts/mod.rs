//! Chart rendering.
//!
//! Aggregated [`ChartData`] is handed to a [`ChartSink`]. The production sink,
//! [`PngRenderer`], draws each chart with [`plotters`] into a PNG file under the output
//! directory; tests substitute a recording sink.

use plotters::{coord::ranged1d::SegmentValue, style::RGBColor};
use serde::Serialize;
use std::{fs, ops::Range, path::PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod bar;
pub mod boxplot;
pub mod data;
pub mod heatmap;
pub mod pie;

pub use data::ChartData;

/// Errors that can occur during chart rendering
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("failed to save chart to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, ChartError>;

/// The six charts of a report, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    MonthYearHeatmap,
    TopDistricts,
    CompanyClassPie,
    DailyBoxPlot,
    MonthTotals,
    YearTotals,
}

/// Title and axis captions for one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels {
    pub title: &'static str,
    pub x: &'static str,
    pub y: &'static str,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::MonthYearHeatmap,
        ChartKind::TopDistricts,
        ChartKind::CompanyClassPie,
        ChartKind::DailyBoxPlot,
        ChartKind::MonthTotals,
        ChartKind::YearTotals,
    ];

    /// Shown in the "Chart N: ... generated." confirmation.
    pub fn description(self) -> &'static str {
        match self {
            ChartKind::MonthYearHeatmap => "Heatmap (Month-wise registrations)",
            ChartKind::TopDistricts => "Bar Chart (Top districts)",
            ChartKind::CompanyClassPie => "Pie Chart (Company classes)",
            ChartKind::DailyBoxPlot => "Box Plot (Daily registrations per year)",
            ChartKind::MonthTotals => "Bar Chart (Registrations by month)",
            ChartKind::YearTotals => "Bar Chart (Registrations by year)",
        }
    }

    /// Names the analysis in failure messages.
    pub fn analysis(self) -> &'static str {
        match self {
            ChartKind::MonthYearHeatmap => "month-wise analysis",
            ChartKind::TopDistricts => "district analysis",
            ChartKind::CompanyClassPie => "company class analysis",
            ChartKind::DailyBoxPlot => "daily registrations analysis",
            ChartKind::MonthTotals => "monthly totals analysis",
            ChartKind::YearTotals => "yearly totals bar chart",
        }
    }

    pub fn labels(self) -> ChartLabels {
        let (title, x, y) = match self {
            ChartKind::MonthYearHeatmap => (
                "Heatmap of Company Registrations by Month and Year",
                "Month",
                "Year",
            ),
            ChartKind::TopDistricts => (
                "Top Districts by Company Registrations",
                "District",
                "Number of Registrations",
            ),
            ChartKind::CompanyClassPie => ("Distribution of Company Classes", "", ""),
            ChartKind::DailyBoxPlot => (
                "Box Plot of Daily Company Registrations per Year",
                "Year",
                "Number of Registrations per Day",
            ),
            ChartKind::MonthTotals => (
                "Company Registrations by Month (All Years)",
                "Month",
                "Number of Registrations",
            ),
            ChartKind::YearTotals => (
                "Total Company Registrations by Year",
                "Year",
                "Number of Registrations",
            ),
        };
        ChartLabels { title, x, y }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::MonthYearHeatmap => "month_year_heatmap",
            ChartKind::TopDistricts => "top_districts",
            ChartKind::CompanyClassPie => "company_classes",
            ChartKind::DailyBoxPlot => "daily_registrations",
            ChartKind::MonthTotals => "monthly_totals",
            ChartKind::YearTotals => "yearly_totals",
        }
    }

    /// 1-based position in the attempt order.
    pub fn ordinal(self) -> usize {
        ChartKind::ALL
            .iter()
            .position(|k| *k == self)
            .map_or(0, |i| i + 1)
    }
}

/// Destination for rendered charts.
pub trait ChartSink {
    /// Render one chart and return where it ended up.
    fn render(&mut self, kind: ChartKind, data: &ChartData) -> Result<PathBuf>;
}

/// Renders PNG files into a directory, one per chart.
pub struct PngRenderer {
    output_dir: PathBuf,
}

impl PngRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, kind: ChartKind) -> PathBuf {
        self.output_dir
            .join(format!("{:02}_{}.png", kind.ordinal(), kind.file_stem()))
    }
}

impl ChartSink for PngRenderer {
    fn render(&mut self, kind: ChartKind, data: &ChartData) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(kind);
        let labels = kind.labels();
        debug!(chart = ?kind, path = %path.display(), "rendering");

        match data {
            ChartData::Heatmap(grid) => heatmap::draw_heatmap(grid, &labels, &path)?,
            ChartData::Bar(series) => bar::draw_bar_chart(series, &labels, bar_color(kind), &path)?,
            ChartData::Pie(slices) => pie::draw_pie_chart(slices, &labels, &path)?,
            ChartData::BoxPlot(dist) => boxplot::draw_box_plot(dist, &labels, &path)?,
        }
        Ok(path)
    }
}

fn bar_color(kind: ChartKind) -> RGBColor {
    match kind {
        ChartKind::TopDistricts => RGBColor(144, 238, 144),
        ChartKind::MonthTotals => RGBColor(0, 128, 128),
        _ => RGBColor(255, 127, 80),
    }
}

/// Integer range for a segmented axis of `n` categories, plus the slot of the first one.
///
/// Integer ranges in plotters include their end, so `n` categories span `0..n - 1`. A range
/// holding a single value collapses to a point, so a lone category sits in the middle of three
/// slots.
pub(crate) fn category_axis(n: usize) -> (Range<u32>, u32) {
    match n as u32 {
        0 | 1 => (0..2, 1),
        n => (0..n - 1, 0),
    }
}

/// Category index behind a segment center, if that segment holds one.
pub(crate) fn category_at(v: &SegmentValue<u32>, first: u32, n: usize) -> Option<usize> {
    match v {
        SegmentValue::CenterOf(slot) => slot
            .checked_sub(first)
            .map(|i| i as usize)
            .filter(|i| *i < n),
        _ => None,
    }
}

/// Qualitative palette for slices and boxes.
pub(crate) const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub(crate) fn palette_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

use serde::Serialize;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Registration counts pivoted to years (rows) by months (columns).
///
/// Only months that occur in the data become columns. A `None` cell means no registrations
/// for that (year, month) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapGrid {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub cells: Vec<Vec<Option<u64>>>,
}

impl HeatmapGrid {
    pub fn get(&self, year: i32, month: u32) -> Option<u64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.months.iter().position(|&m| m == month)?;
        self.cells[row][col]
    }

    pub fn max_count(&self) -> u64 {
        self.cells.iter().flatten().flatten().copied().max().unwrap_or(0)
    }
}

/// Labeled bars in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl BarSeries {
    pub fn get(&self, label: &str) -> Option<u64> {
        let i = self.labels.iter().position(|l| l == label)?;
        Some(self.values[i])
    }

    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

impl PieSlice {
    /// `"Private (66.7%)"`
    pub fn caption(&self) -> String {
        format!("{} ({:.1}%)", self.label, self.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlices {
    pub slices: Vec<PieSlice>,
}

/// Daily registration counts, one group per year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyDistribution {
    pub groups: Vec<(i32, Vec<u64>)>,
}

impl YearlyDistribution {
    pub fn max_count(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|(_, counts)| counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Aggregated data for one chart, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Heatmap(HeatmapGrid),
    Bar(BarSeries),
    Pie(PieSlices),
    BoxPlot(YearlyDistribution),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_lookup() {
        let grid = HeatmapGrid {
            years: vec![2020, 2021],
            months: vec![1, 3],
            cells: vec![vec![Some(2), None], vec![None, Some(1)]],
        };
        assert_eq!(grid.get(2020, 1), Some(2));
        assert_eq!(grid.get(2020, 3), None);
        assert_eq!(grid.get(2021, 3), Some(1));
        assert_eq!(grid.get(2022, 1), None);
        assert_eq!(grid.max_count(), 2);
    }

    #[test]
    fn test_pie_caption_rounds_to_one_decimal() {
        let slice = PieSlice {
            label: "Private".into(),
            count: 2,
            percent: 200.0 / 3.0,
        };
        assert_eq!(slice.caption(), "Private (66.7%)");
    }
}

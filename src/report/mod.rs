// src/report/mod.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::analysis::{self, AnalysisError};
use crate::charts::{ChartData, ChartKind, ChartSink};
use crate::config::ColumnNames;
use crate::diagnostics::{Diagnostics, Severity};
use crate::process::{schema::ColumnPresence, RecordSet};

/// Why a chart attempt produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    /// The attempt was never eligible, e.g. its column is absent.
    Skipped { severity: Severity, reason: String },
    /// The attempt ran and failed while aggregating or rendering.
    Failed { reason: String },
}

impl From<AnalysisError> for AttemptFailure {
    fn from(e: AnalysisError) -> Self {
        AttemptFailure::Failed {
            reason: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartOutcome {
    Generated {
        number: usize,
        path: PathBuf,
        data: ChartData,
    },
    Skipped {
        severity: Severity,
        reason: String,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub chart: ChartKind,
    #[serde(flatten)]
    pub outcome: ChartOutcome,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub rows: usize,
    pub charts_generated: usize,
    pub expected_chart_count: usize,
    pub requirement_met: bool,
    pub attempts: Vec<AttemptRecord>,
    pub diagnostics: Diagnostics,
}

impl RunReport {
    pub fn attempt(&self, chart: ChartKind) -> Option<&ChartOutcome> {
        self.attempts
            .iter()
            .find(|a| a.chart == chart)
            .map(|a| &a.outcome)
    }

    /// Aggregated data of a generated chart.
    pub fn chart_data(&self, chart: ChartKind) -> Option<&ChartData> {
        match self.attempt(chart)? {
            ChartOutcome::Generated { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Write the report as pretty JSON to `dir/summary.json`.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let path = dir.join("summary.json");
        let file =
            File::create(&path).with_context(|| format!("creating file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// Runs the six chart attempts over a validated, date-derived record set.
pub struct ChartRunner<'a> {
    records: &'a RecordSet,
    columns: &'a ColumnNames,
    presence: ColumnPresence,
    top_districts: usize,
}

impl<'a> ChartRunner<'a> {
    pub fn new(
        records: &'a RecordSet,
        columns: &'a ColumnNames,
        presence: ColumnPresence,
        top_districts: usize,
    ) -> Self {
        Self {
            records,
            columns,
            presence,
            top_districts,
        }
    }

    /// Aggregate the data behind one chart, or say why it cannot be drawn.
    pub fn aggregate(&self, kind: ChartKind) -> Result<ChartData, AttemptFailure> {
        let rs = self.records;
        let data = match kind {
            ChartKind::MonthYearHeatmap => ChartData::Heatmap(analysis::month_year_grid(rs)?),
            ChartKind::TopDistricts => {
                if !self.presence.district {
                    return Err(AttemptFailure::Skipped {
                        severity: Severity::Note,
                        reason: "District data not available in the dataset.".into(),
                    });
                }
                ChartData::Bar(analysis::top_values(
                    rs,
                    &self.columns.district,
                    self.top_districts,
                )?)
            }
            ChartKind::CompanyClassPie => {
                if !self.presence.company_class {
                    return Err(AttemptFailure::Skipped {
                        severity: Severity::Error,
                        reason: format!(
                            "Column '{}' not found. Skipping company class analysis.",
                            self.columns.company_class
                        ),
                    });
                }
                ChartData::Pie(analysis::value_shares(rs, &self.columns.company_class)?)
            }
            ChartKind::DailyBoxPlot => ChartData::BoxPlot(analysis::daily_counts_by_year(
                rs,
                &self.columns.registration_date,
            )?),
            ChartKind::MonthTotals => ChartData::Bar(analysis::month_totals(rs)?),
            ChartKind::YearTotals => ChartData::Bar(analysis::year_totals(rs)?),
        };
        Ok(data)
    }

    /// Attempt every chart in order. A failed attempt never stops the ones after it.
    ///
    /// Returns the per-chart records and the number of charts generated.
    pub fn run(
        &self,
        sink: &mut dyn ChartSink,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<AttemptRecord>, usize) {
        let mut chart_count = 0;
        let mut attempts = Vec::with_capacity(ChartKind::ALL.len());

        for kind in ChartKind::ALL {
            let rendered = self.aggregate(kind).and_then(|data| {
                sink.render(kind, &data)
                    .map(|path| (path, data))
                    .map_err(|e| AttemptFailure::Failed {
                        reason: e.to_string(),
                    })
            });

            let outcome = match rendered {
                Ok((path, data)) => {
                    chart_count += 1;
                    info!("Chart {}: {} generated.", chart_count, kind.description());
                    ChartOutcome::Generated {
                        number: chart_count,
                        path,
                        data,
                    }
                }
                Err(AttemptFailure::Skipped { severity, reason }) => {
                    if severity == Severity::Note {
                        // optional columns were already noted during validation
                        debug!(chart = ?kind, "{}", reason);
                    } else {
                        diagnostics.record(severity, reason.clone());
                    }
                    ChartOutcome::Skipped { severity, reason }
                }
                Err(AttemptFailure::Failed { reason }) => {
                    diagnostics.error(format!("Error in {}: {}", kind.analysis(), reason));
                    ChartOutcome::Failed { reason }
                }
            };
            attempts.push(AttemptRecord {
                chart: kind,
                outcome,
            });
        }

        (attempts, chart_count)
    }
}

/// Report the chart total against the expected minimum. Returns whether it was met.
pub fn summarize(chart_count: usize, expected: usize, diagnostics: &mut Diagnostics) -> bool {
    info!("Total charts generated: {}", chart_count);
    if chart_count < expected {
        diagnostics.warn(format!(
            "Fewer than {} charts generated. Check for missing columns or data issues.",
            expected
        ));
        false
    } else {
        info!("Success: Minimum {} charts requirement met.", expected);
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::charts::{self, ChartError};
    use crate::config::default_date_formats;
    use crate::process::{convert::derive_date_fields, parse_records, schema::validate_columns};
    use anyhow::anyhow;
    use tempfile::tempdir;

    /// Keeps every rendered chart in memory.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub rendered: Vec<(ChartKind, ChartData)>,
    }

    impl ChartSink for RecordingSink {
        fn render(&mut self, kind: ChartKind, data: &ChartData) -> charts::Result<PathBuf> {
            self.rendered.push((kind, data.clone()));
            Ok(PathBuf::from(format!("{}.png", kind.file_stem())))
        }
    }

    /// Fails to render one specific chart.
    struct FailingSink {
        fail_on: ChartKind,
        inner: RecordingSink,
    }

    impl ChartSink for FailingSink {
        fn render(&mut self, kind: ChartKind, data: &ChartData) -> charts::Result<PathBuf> {
            if kind == self.fail_on {
                return Err(ChartError::Drawing("backend exploded".into()));
            }
            self.inner.render(kind, data)
        }
    }

    fn prepared(text: &str) -> Result<(RecordSet, ColumnPresence, Diagnostics)> {
        let mut rs = parse_records(text, b',').map_err(|e| anyhow!("{:?}", e))?;
        let mut diags = Diagnostics::new();
        let presence = validate_columns(&rs, &ColumnNames::default(), &mut diags);
        derive_date_fields(&mut rs, "registration_date", &default_date_formats())?;
        Ok((rs, presence, diags))
    }

    const FULL: &str = "registration_date,district,company_class\n\
2020-01-15,Pune,Private\n\
2020-02-10,Mumbai,Public\n\
2021-03-01,Pune,Private\n";

    #[test]
    fn test_all_six_charts_generated() -> Result<()> {
        let (rs, presence, mut diags) = prepared(FULL)?;
        let cols = ColumnNames::default();
        let mut sink = RecordingSink::default();

        let (attempts, count) =
            ChartRunner::new(&rs, &cols, presence, 10).run(&mut sink, &mut diags);
        assert_eq!(count, 6);
        assert_eq!(attempts.len(), 6);
        let order: Vec<ChartKind> = sink.rendered.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, ChartKind::ALL.to_vec());
        for (i, a) in attempts.iter().enumerate() {
            assert!(
                matches!(a.outcome, ChartOutcome::Generated { number, .. } if number == i + 1)
            );
        }
        assert!(diags.entries().is_empty());
        Ok(())
    }

    #[test]
    fn test_render_failure_does_not_stop_later_charts() -> Result<()> {
        let (rs, presence, mut diags) = prepared(FULL)?;
        let cols = ColumnNames::default();
        let mut sink = FailingSink {
            fail_on: ChartKind::CompanyClassPie,
            inner: RecordingSink::default(),
        };

        let (attempts, count) =
            ChartRunner::new(&rs, &cols, presence, 10).run(&mut sink, &mut diags);
        assert_eq!(count, 5);
        assert!(matches!(attempts[2].outcome, ChartOutcome::Failed { .. }));
        // numbering continues from the successes only
        assert!(matches!(
            attempts[3].outcome,
            ChartOutcome::Generated { number: 3, .. }
        ));
        assert_eq!(diags.count(Severity::Error), 1);
        assert!(diags.entries()[0]
            .message
            .starts_with("Error in company class analysis:"));
        assert_eq!(sink.inner.rendered.len(), 5);
        Ok(())
    }

    #[test]
    fn test_missing_class_is_error_level_skip() -> Result<()> {
        let (rs, presence, mut diags) =
            prepared("registration_date,district\n2020-01-15,Pune\n")?;
        let cols = ColumnNames::default();
        let mut sink = RecordingSink::default();

        let (attempts, count) =
            ChartRunner::new(&rs, &cols, presence, 10).run(&mut sink, &mut diags);
        assert_eq!(count, 5);
        assert!(matches!(
            attempts[2].outcome,
            ChartOutcome::Skipped { severity: Severity::Error, .. }
        ));
        assert!(sink
            .rendered
            .iter()
            .all(|(k, _)| *k != ChartKind::CompanyClassPie));
        // one validation warning, one skip error
        assert_eq!(diags.count(Severity::Warning), 1);
        assert_eq!(diags.count(Severity::Error), 1);
        Ok(())
    }

    #[test]
    fn test_empty_time_data_fails_each_time_chart() -> Result<()> {
        let (rs, presence, mut diags) = prepared(
            "registration_date,district,company_class\nbad,Pune,Private\n,Thane,Public\n",
        )?;
        let cols = ColumnNames::default();
        let mut sink = RecordingSink::default();

        let (attempts, count) =
            ChartRunner::new(&rs, &cols, presence, 10).run(&mut sink, &mut diags);
        // only the district bar chart and the pie survive
        assert_eq!(count, 2);
        let failed: Vec<ChartKind> = attempts
            .iter()
            .filter(|a| matches!(a.outcome, ChartOutcome::Failed { .. }))
            .map(|a| a.chart)
            .collect();
        assert_eq!(
            failed,
            vec![
                ChartKind::MonthYearHeatmap,
                ChartKind::DailyBoxPlot,
                ChartKind::MonthTotals,
                ChartKind::YearTotals
            ]
        );
        assert_eq!(diags.count(Severity::Error), 4);
        Ok(())
    }

    #[test]
    fn test_summarize_threshold() {
        let mut diags = Diagnostics::new();
        assert!(!summarize(6, 7, &mut diags));
        assert_eq!(diags.count(Severity::Warning), 1);
        assert!(diags.entries()[0].message.contains("Fewer than 7 charts"));

        let mut diags = Diagnostics::new();
        assert!(summarize(6, 6, &mut diags));
        assert!(diags.entries().is_empty());
    }

    #[test]
    fn test_write_json_summary() -> Result<()> {
        let (rs, presence, mut diags) = prepared(FULL)?;
        let cols = ColumnNames::default();
        let mut sink = RecordingSink::default();
        let (attempts, count) =
            ChartRunner::new(&rs, &cols, presence, 10).run(&mut sink, &mut diags);
        let met = summarize(count, 7, &mut diags);

        let report = RunReport {
            input: PathBuf::from("input.csv"),
            rows: rs.num_rows(),
            charts_generated: count,
            expected_chart_count: 7,
            requirement_met: met,
            attempts,
            diagnostics: diags,
        };
        let tmp = tempdir()?;
        let path = report.write_json(&tmp.path().join("out"))?;

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        assert_eq!(json["charts_generated"], 6);
        assert_eq!(json["requirement_met"], false);
        assert_eq!(json["attempts"][0]["chart"], "month_year_heatmap");
        assert_eq!(json["attempts"][0]["status"], "generated");
        assert_eq!(json["attempts"][4]["data"]["type"], "bar");
        assert_eq!(json["diagnostics"][0]["severity"], "warning");
        Ok(())
    }
}

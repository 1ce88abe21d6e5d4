// src/pipeline.rs
use thiserror::Error;
use tracing::{info, warn};

use crate::charts::ChartSink;
use crate::config::{ReportConfig, CHART_ATTEMPTS};
use crate::diagnostics::{Diagnostics, Severity};
use crate::process::{
    convert::{derive_date_fields, DeriveError},
    load_records,
    preview::print_preview,
    schema::validate_columns,
    LoadError,
};
use crate::report::{summarize, ChartRunner, RunReport};

/// Errors that end a run before any chart is attempted.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Derive(#[from] DeriveError),
}

/// Load, validate, derive, then attempt every chart against `sink`.
///
/// Only loading and date derivation can fail the run; chart attempts degrade on their own.
#[tracing::instrument(level = "info", skip_all, fields(input = %config.input_path.display()))]
pub fn run_report(config: &ReportConfig, sink: &mut dyn ChartSink) -> Result<RunReport, FatalError> {
    let mut records = load_records(&config.input_path, config.delimiter_byte())?;
    print_preview(&records, config.preview_rows);

    let mut diagnostics = Diagnostics::new();
    let presence = validate_columns(&records, &config.columns, &mut diagnostics);

    let derived = derive_date_fields(
        &mut records,
        &config.columns.registration_date,
        &config.date_formats,
    )?;
    if derived.missing_dates == records.num_rows() && records.num_rows() > 0 {
        warn!("No registration date could be parsed; time-based charts will fail.");
    }

    if !config.expected_count_reachable() {
        warn!(
            expected = config.expected_chart_count,
            attempts = CHART_ATTEMPTS,
            "expected chart count exceeds the attempts made; the requirement cannot be met"
        );
    }

    let runner = ChartRunner::new(&records, &config.columns, presence, config.top_districts);
    let (attempts, charts_generated) = runner.run(sink, &mut diagnostics);
    let requirement_met = summarize(
        charts_generated,
        config.expected_chart_count,
        &mut diagnostics,
    );
    info!(
        notes = diagnostics.count(Severity::Note),
        warnings = diagnostics.count(Severity::Warning),
        errors = diagnostics.count(Severity::Error),
        "run finished"
    );

    Ok(RunReport {
        input: config.input_path.clone(),
        rows: records.num_rows(),
        charts_generated,
        expected_chart_count: config.expected_chart_count,
        requirement_met,
        attempts,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartData, ChartKind};
    use crate::process::tests::init_test_logging;
    use crate::report::{tests::RecordingSink, ChartOutcome};
    use anyhow::{anyhow, Result};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    fn config_for(file: &NamedTempFile) -> ReportConfig {
        ReportConfig {
            input_path: file.path().to_path_buf(),
            ..ReportConfig::default()
        }
    }

    const NO_DISTRICT: &str = "registration_date,company_class\n\
2020-01-15,Private\n\
2020-01-20,Private\n\
2021-03-01,Public\n";

    #[test]
    fn test_end_to_end_without_district() -> Result<()> {
        init_test_logging();
        let file = csv(NO_DISTRICT)?;
        let mut sink = RecordingSink::default();

        let report = run_report(&config_for(&file), &mut sink)?;
        assert_eq!(report.rows, 3);
        assert_eq!(report.charts_generated, 5);
        assert!(!report.requirement_met);

        let months = match report.chart_data(ChartKind::MonthTotals) {
            Some(ChartData::Bar(series)) => series.clone(),
            other => return Err(anyhow!("unexpected month data: {:?}", other)),
        };
        assert_eq!(months.len(), 12);
        assert_eq!(months.get("Jan"), Some(2));
        assert_eq!(months.get("Mar"), Some(1));
        assert_eq!(months.get("Feb"), Some(0));

        let years = match report.chart_data(ChartKind::YearTotals) {
            Some(ChartData::Bar(series)) => series.clone(),
            other => return Err(anyhow!("unexpected year data: {:?}", other)),
        };
        assert_eq!(years.labels, vec!["2020", "2021"]);
        assert_eq!(years.values, vec![2, 1]);

        let pie = match report.chart_data(ChartKind::CompanyClassPie) {
            Some(ChartData::Pie(p)) => p.clone(),
            other => return Err(anyhow!("unexpected pie data: {:?}", other)),
        };
        let captions: Vec<String> = pie.slices.iter().map(|s| s.caption()).collect();
        assert_eq!(captions, vec!["Private (66.7%)", "Public (33.3%)"]);

        assert!(matches!(
            report.attempt(ChartKind::TopDistricts),
            Some(ChartOutcome::Skipped {
                severity: Severity::Note,
                ..
            })
        ));
        assert_eq!(report.diagnostics.count(Severity::Note), 1);
        assert_eq!(report.diagnostics.count(Severity::Error), 0);
        let warnings: Vec<&str> = report
            .diagnostics
            .with_severity(Severity::Warning)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Fewer than 7 charts generated"));
        assert_eq!(sink.rendered.len(), 5);
        Ok(())
    }

    #[test]
    fn test_missing_date_column_is_fatal() -> Result<()> {
        let file = csv("district,company_class\nPune,Private\n")?;
        let mut sink = RecordingSink::default();

        let err = run_report(&config_for(&file), &mut sink).unwrap_err();
        assert!(matches!(err, FatalError::Derive(DeriveError::MissingColumn(_))));
        assert!(sink.rendered.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let config = ReportConfig {
            input_path: "no/such/registrations.csv".into(),
            ..ReportConfig::default()
        };
        let mut sink = RecordingSink::default();
        let err = run_report(&config, &mut sink).unwrap_err();
        assert!(matches!(err, FatalError::Load(LoadError::NotFound { .. })));
        assert!(sink.rendered.is_empty());
    }

    #[test]
    fn test_unparseable_dates_keep_rows() -> Result<()> {
        let file = csv(
            "registration_date,district,company_class\n\
2020-01-15,Pune,Private\n\
not a date,Pune,Public\n\
,Thane,Private\n",
        )?;
        let mut sink = RecordingSink::default();

        let report = run_report(&config_for(&file), &mut sink)?;
        assert_eq!(report.rows, 3);
        // district and class charts still count rows whose dates are missing
        match report.chart_data(ChartKind::TopDistricts) {
            Some(ChartData::Bar(series)) => assert_eq!(series.get("Pune"), Some(2)),
            other => return Err(anyhow!("unexpected district data: {:?}", other)),
        }
        match report.chart_data(ChartKind::YearTotals) {
            Some(ChartData::Bar(series)) => assert_eq!(series.values, vec![1]),
            other => return Err(anyhow!("unexpected year data: {:?}", other)),
        }
        assert_eq!(report.charts_generated, 6);
        Ok(())
    }

    #[test]
    fn test_repeated_runs_are_identical() -> Result<()> {
        let file = csv(NO_DISTRICT)?;
        let config = ReportConfig {
            expected_chart_count: 5,
            ..config_for(&file)
        };

        let mut first_sink = RecordingSink::default();
        let first = run_report(&config, &mut first_sink)?;
        let mut second_sink = RecordingSink::default();
        let second = run_report(&config, &mut second_sink)?;

        assert!(first.requirement_met);
        assert_eq!(first.charts_generated, second.charts_generated);
        assert_eq!(first.attempts, second.attempts);
        assert_eq!(first.diagnostics.entries(), second.diagnostics.entries());
        assert_eq!(first_sink.rendered, second_sink.rendered);
        Ok(())
    }
}

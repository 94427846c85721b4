//! CSV and JSON export of evaluation rows and alpha tables.
//!
//! Evaluation rows flatten to one CSV record per factor: the scalar metrics
//! first, then `G{i}_avg` and `G{i}_cum` per bucket, bottom bucket first.
//! Undefined values are written as empty cells in CSV and `null` in JSON.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use hobart_eval::EvaluationReport;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame serialization error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),

    /// Serialized output was not valid UTF-8.
    #[error("Invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Format unknown or not supported for this data.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a file extension, `None` when unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "unknown format '{other}', expected csv, json or pretty-json"
            ))),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is not
    /// supported for this data.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        debug!(path = %path.display(), %format, bytes = content.len(), "exported");
        Ok(())
    }
}

/// Header of the flattened report CSV for `n_buckets` buckets.
pub fn report_header(n_buckets: usize) -> Vec<String> {
    let mut header: Vec<String> = [
        "factor",
        "correlation_mean",
        "correlation_std",
        "information_ratio",
        "win_rate",
        "observations",
        "long_short",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    header.extend((1..=n_buckets).map(|i| format!("G{i}_avg")));
    header.extend((1..=n_buckets).map(|i| format!("G{i}_cum")));
    header
}

fn cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn bucket_cells(values: &[f64], n_buckets: usize) -> impl Iterator<Item = String> + '_ {
    (0..n_buckets).map(|i| values.get(i).copied().map(cell).unwrap_or_default())
}

fn report_record(report: &EvaluationReport, n_buckets: usize) -> Vec<String> {
    let mut record = vec![
        report.factor.clone(),
        cell(report.correlation_mean),
        cell(report.correlation_std),
        cell(report.information_ratio),
        cell(report.win_rate),
        report.observations.to_string(),
        cell(report.long_short),
    ];
    record.extend(bucket_cells(&report.bucket_average, n_buckets));
    record.extend(bucket_cells(&report.bucket_cumulative, n_buckets));
    record
}

/// Flatten report rows into CSV. The bucket columns cover the widest row.
pub(crate) fn reports_to_csv(reports: &[EvaluationReport]) -> Result<String, ExportError> {
    let n_buckets = reports
        .iter()
        .map(EvaluationReport::n_buckets)
        .max()
        .unwrap_or(0);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(report_header(n_buckets))?;
    for report in reports {
        wtr.write_record(report_record(report, n_buckets))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for EvaluationReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        std::slice::from_ref(self).export_to_string(format)
    }
}

impl Exporter for [EvaluationReport] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => reports_to_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Alpha tables export as CSV only; nulls become empty cells.
impl Exporter for DataFrame {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut buffer = Vec::new();
                let mut frame = self.clone();
                CsvWriter::new(&mut buffer)
                    .include_header(true)
                    .finish(&mut frame)?;
                Ok(String::from_utf8(buffer)?)
            }
            other => Err(ExportError::InvalidFormat(format!(
                "alpha tables export as csv, not {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn report() -> EvaluationReport {
        EvaluationReport {
            factor: "alpha_rsi_6".to_string(),
            correlation_mean: 0.05,
            correlation_std: 0.1,
            information_ratio: 0.5,
            win_rate: 0.6,
            observations: 40,
            rolling_correlation: vec![0.04, 0.06],
            bucket_average: vec![-0.01, 0.0, 0.02],
            bucket_cumulative: vec![-0.2, f64::NAN, 0.4],
            long_short: 0.03,
        }
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(
            report_header(2)[5..],
            ["observations", "long_short", "G1_avg", "G2_avg", "G1_cum", "G2_cum"]
        );
    }

    #[test]
    fn test_report_csv() {
        let csv = report().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "factor,correlation_mean,correlation_std,information_ratio,win_rate,observations,\
             long_short,G1_avg,G2_avg,G3_avg,G1_cum,G2_cum,G3_cum"
        );
        assert_eq!(
            lines.next().unwrap(),
            "alpha_rsi_6,0.05,0.1,0.5,0.6,40,0.03,-0.01,0,0.02,-0.2,,0.4"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut empty = report();
        empty.factor = "alpha_flat".to_string();
        empty.bucket_average.clear();
        empty.bucket_cumulative.clear();

        let csv = vec![report(), empty]
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let last = csv.lines().last().unwrap();
        assert!(last.starts_with("alpha_flat,"));
        assert!(last.ends_with(",,,,,,"));
    }

    #[test]
    fn test_report_json_nulls() {
        let json = report().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["factor"], "alpha_rsi_6");
        assert!(value[0]["bucket_cumulative"][1].is_null());
    }

    #[test]
    fn test_pretty_json() {
        let json = report().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\n  "));
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_parse_format(#[case] text: &str, #[case] expected: ExportFormat) {
        assert_eq!(text.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_dataframe_csv() {
        let frame = df!(
            "asset" => ["A", "B"],
            "alpha_roc_6" => [Some(0.5), None],
        )
        .unwrap();
        let csv = frame.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv, "asset,alpha_roc_6\nA,0.5\nB,\n");
        assert!(frame.export_to_string(ExportFormat::Json).is_err());
    }
}

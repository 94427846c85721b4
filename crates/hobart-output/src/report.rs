//! Ranked evaluation report with terminal and Markdown renderings.

use chrono::{DateTime, Utc};
use hobart_eval::EvaluationReport;
use serde::Serialize;
use thiserror::Error;

use crate::export::{ExportError, ExportFormat, Exporter, reports_to_csv};

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rows disagree on the number of buckets.
    #[error("factor {factor} has {found} buckets, expected {expected}")]
    BucketMismatch {
        /// Offending row
        factor: String,
        /// Bucket count of the first non-empty row
        expected: usize,
        /// Bucket count of the offending row
        found: usize,
    },
}

/// Evaluation rows of one run, ranked by mean correlation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Forward-return horizon the rows were evaluated at.
    pub horizon: usize,

    /// Evaluation rows, best first.
    pub rows: Vec<EvaluationReport>,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(title: String, horizon: usize, rows: Vec<EvaluationReport>) -> Self {
        Self {
            title,
            generated_at: Utc::now(),
            horizon,
            rows,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bucket count shared by the rows, 0 when no row has buckets.
    pub fn n_buckets(&self) -> usize {
        self.rows
            .iter()
            .map(EvaluationReport::n_buckets)
            .find(|&n| n > 0)
            .unwrap_or(0)
    }

    /// Render as a fixed-width table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "Horizon: {}  Factors: {}\n",
            self.horizon,
            self.rows.len()
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:>9} {:>9} {:>9} {:>7} {:>6} {:>9}\n",
            "Factor", "IC Mean", "IC Std", "IR", "Win", "Obs", "L/S"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<28} {:>9} {:>9} {:>9} {:>7} {:>6} {:>9}\n",
                truncate(&row.factor, 28),
                fixed(row.correlation_mean, 4),
                fixed(row.correlation_std, 4),
                fixed(row.information_ratio, 3),
                percent(row.win_rate),
                row.observations,
                percent(row.long_short),
            ));
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        let n_buckets = self.n_buckets();
        if n_buckets > 0 {
            output.push_str("\nAverage forward return by bucket (G1 = lowest factor)\n");
            output.push_str(&format!("{:<28}", "Factor"));
            for i in 1..=n_buckets {
                output.push_str(&format!(" {:>9}", format!("G{i}")));
            }
            output.push('\n');
            output.push_str(&"-".repeat(28 + 10 * n_buckets));
            output.push('\n');
            for row in &self.rows {
                output.push_str(&format!("{:<28}", truncate(&row.factor, 28)));
                for i in 0..n_buckets {
                    let value = row.bucket_average.get(i).copied().unwrap_or(f64::NAN);
                    output.push_str(&format!(" {:>9}", percent(value)));
                }
                output.push('\n');
            }
        }

        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title));
        output.push_str(&format!(
            "**Generated:** {}  \n**Horizon:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.horizon
        ));

        let n_buckets = self.n_buckets();
        output.push_str("| Factor | IC Mean | IC Std | IR | Win Rate | Obs | Long-Short |");
        for i in 1..=n_buckets {
            output.push_str(&format!(" G{i} |"));
        }
        output.push('\n');
        output.push_str("|--------|---------|--------|----|----------|-----|------------|");
        for _ in 0..n_buckets {
            output.push_str("----|");
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |",
                row.factor,
                fixed(row.correlation_mean, 4),
                fixed(row.correlation_std, 4),
                fixed(row.information_ratio, 3),
                percent(row.win_rate),
                row.observations,
                percent(row.long_short),
            ));
            for i in 0..n_buckets {
                let value = row.bucket_average.get(i).copied().unwrap_or(f64::NAN);
                output.push_str(&format!(" {} |", percent(value)));
            }
            output.push('\n');
        }

        if let Some(best) = self.rows.first() {
            output.push_str("\n## Summary\n\n");
            output.push_str(&format!(
                "- **Best factor:** {} (IC {})\n",
                best.factor,
                fixed(best.correlation_mean, 4)
            ));
            output.push_str(&format!("- **Factors evaluated:** {}\n", self.rows.len()));
        }

        output
    }
}

/// The rows export like a bare row list in CSV; JSON keeps the metadata.
impl Exporter for Report {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => reports_to_csv(&self.rows),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn fixed(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "-".to_string()
    }
}

fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "-".to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('~');
        cut
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    horizon: Option<usize>,
    rows: Vec<EvaluationReport>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the forward-return horizon.
    pub const fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the evaluation rows.
    pub fn rows(mut self, rows: Vec<EvaluationReport>) -> Self {
        self.rows = rows;
        self
    }

    /// Build the report.
    ///
    /// Rows with no buckets are accepted; every other row must share one
    /// bucket count.
    pub fn build(self) -> Result<Report, ReportError> {
        let mut first = None;
        for row in &self.rows {
            let found = row.n_buckets();
            if found == 0 {
                continue;
            }
            let expected = *first.get_or_insert(found);
            if expected != found {
                return Err(ReportError::BucketMismatch {
                    factor: row.factor.clone(),
                    expected,
                    found,
                });
            }
        }

        Ok(Report::new(
            self.title.unwrap_or_else(|| "Factor Evaluation".to_string()),
            self.horizon.unwrap_or(10),
            self.rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(factor: &str, mean: f64, buckets: usize) -> EvaluationReport {
        EvaluationReport {
            factor: factor.to_string(),
            correlation_mean: mean,
            correlation_std: 0.2,
            information_ratio: mean / 0.2,
            win_rate: 0.55,
            observations: 30,
            rolling_correlation: vec![],
            bucket_average: vec![0.01; buckets],
            bucket_cumulative: vec![0.1; buckets],
            long_short: 0.0,
        }
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .title("Daily run")
            .horizon(5)
            .rows(vec![row("alpha_rsi_6", 0.04, 5), row("alpha_flat", f64::NAN, 0)])
            .build()
            .unwrap();

        assert_eq!(report.title, "Daily run");
        assert_eq!(report.horizon, 5);
        assert_eq!(report.n_buckets(), 5);
    }

    #[test]
    fn test_builder_rejects_mixed_buckets() {
        let result = ReportBuilder::new()
            .rows(vec![row("alpha_a", 0.1, 5), row("alpha_b", 0.1, 3)])
            .build();
        assert!(matches!(
            result,
            Err(ReportError::BucketMismatch { expected: 5, found: 3, .. })
        ));
    }

    #[test]
    fn test_ascii_table() {
        let report = Report::new(
            "Factor Evaluation".to_string(),
            10,
            vec![row("alpha_rsi_6", 0.0412, 2), row("alpha_flat", f64::NAN, 0)],
        );
        let ascii = report.to_ascii_table();

        assert!(ascii.contains("Factor Evaluation"));
        assert!(ascii.contains("alpha_rsi_6"));
        assert!(ascii.contains("0.0412"));
        assert!(ascii.contains("55.00%"));
        assert!(ascii.contains(&"=".repeat(80)));
        assert!(ascii.contains("G2"));
    }

    #[test]
    fn test_markdown() {
        let report = Report::new(
            "Factor Evaluation".to_string(),
            10,
            vec![row("alpha_rsi_6", 0.0412, 2)],
        );
        let markdown = report.to_markdown();

        assert!(markdown.starts_with("# Factor Evaluation"));
        assert!(markdown.contains("| Factor | IC Mean |"));
        assert!(markdown.contains("| alpha_rsi_6 | 0.0412 |"));
        assert!(markdown.contains("- **Best factor:** alpha_rsi_6"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("alpha_volume_price_corr_20", 10), "alpha_vol~");
    }

    #[test]
    fn test_to_json_keeps_metadata() {
        let report = Report::new("Run".to_string(), 3, vec![row("alpha_a", 0.1, 2)]);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["horizon"], 3);
        assert_eq!(value["rows"][0]["factor"], "alpha_a");
    }
}

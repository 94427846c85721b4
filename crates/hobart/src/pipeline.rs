//! The factor-mining pipeline: compute, clean, tabulate, evaluate.

use std::fmt;

use hobart_data::Panel;
use hobart_data::columns::{ASSET, CLOSE, TIMESTAMP};
use hobart_eval::{EvaluationReport, FORWARD_RETURN, FactorEvaluator, prepare, sort_reports};
use hobart_factors::expr::lag_per_asset;
use hobart_factors::{CrossSectionalCleaner, FactorError, FactorRegistry, FactorSpec};
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::Result;

/// What happened to one factor descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorOutcome {
    /// The factor was computed into `column`.
    Computed {
        /// Descriptor
        spec: FactorSpec,
        /// Raw column, `factor_*`
        column: String,
    },
    /// The factor was not computed.
    Skipped {
        /// Descriptor
        spec: FactorSpec,
        /// Rendered cause
        reason: String,
    },
}

impl FactorOutcome {
    /// The descriptor this outcome belongs to.
    pub const fn spec(&self) -> &FactorSpec {
        match self {
            Self::Computed { spec, .. } | Self::Skipped { spec, .. } => spec,
        }
    }

    /// Whether the factor was computed.
    pub const fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }
}

impl fmt::Display for FactorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed { spec, column } => write!(f, "{spec} -> {column}"),
            Self::Skipped { spec, reason } => write!(f, "{spec} skipped: {reason}"),
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Input panel with the `factor_*` and `alpha_*` columns appended
    pub panel: Panel,
    /// One outcome per descriptor, in configuration order
    pub outcomes: Vec<FactorOutcome>,
    /// Identity columns plus the `alpha_*` columns
    pub alpha_table: DataFrame,
    /// Evaluation rows, best mean correlation first
    pub reports: Vec<EvaluationReport>,
}

impl RunOutput {
    /// Outcomes of the factors that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &FactorOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_computed())
    }
}

/// A configured run over a registry.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
    registry: FactorRegistry,
    cleaner: CrossSectionalCleaner,
    evaluator: FactorEvaluator,
}

impl Pipeline {
    /// Pipeline over the default registry.
    ///
    /// # Errors
    ///
    /// Fails when the cleaning or evaluation settings are invalid.
    pub fn new(config: RunConfig) -> Result<Self> {
        Self::with_registry(config, FactorRegistry::with_defaults())
    }

    /// Pipeline over a custom registry.
    pub fn with_registry(config: RunConfig, registry: FactorRegistry) -> Result<Self> {
        config.validate()?;
        let cleaner = CrossSectionalCleaner::new(config.cleaning.clone());
        let evaluator = FactorEvaluator::new(config.evaluation.clone())?;
        Ok(Self {
            config,
            registry,
            cleaner,
            evaluator,
        })
    }

    /// Active configuration.
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Registry the factors are built from.
    pub const fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    /// Build, compute and lag one factor.
    ///
    /// # Errors
    ///
    /// Unknown name, invalid parameters, missing input columns, or a
    /// failure inside the factor.
    pub fn compute_factor(
        &self,
        panel: &Panel,
        spec: &FactorSpec,
    ) -> std::result::Result<Vec<f64>, FactorError> {
        let factor = self.registry.build(spec)?;

        let missing = panel.missing_columns(factor.required_columns());
        if !missing.is_empty() {
            return Err(FactorError::MissingColumns {
                factor: spec.name.clone(),
                missing,
            });
        }

        let values = factor.compute(panel)?;
        if values.len() != panel.height() {
            return Err(FactorError::Computation(format!(
                "{} produced {} values for {} rows",
                spec.name,
                values.len(),
                panel.height()
            )));
        }

        Ok(if spec.lag > 0 {
            lag_per_asset(panel, &values, spec.lag)?
        } else {
            values
        })
    }

    /// Compute every configured factor, appending one `factor_*` column each.
    pub fn compute_factors(&self, panel: &Panel) -> Result<(Panel, Vec<FactorOutcome>)> {
        self.compute_factors_with(panel, |_| {})
    }

    /// [`Self::compute_factors`], reporting each outcome as it is decided.
    pub fn compute_factors_with<F>(
        &self,
        panel: &Panel,
        mut on_outcome: F,
    ) -> Result<(Panel, Vec<FactorOutcome>)>
    where
        F: FnMut(&FactorOutcome),
    {
        let mut working = panel.clone();
        let mut outcomes = Vec::with_capacity(self.config.factors.len());

        for spec in &self.config.factors {
            let outcome = match self.compute_factor(panel, spec) {
                Ok(values) => {
                    let column = spec.column_name();
                    working = working.with_column(&column, &values)?;
                    debug!(factor = %spec, column = %column, "computed factor");
                    FactorOutcome::Computed {
                        spec: spec.clone(),
                        column,
                    }
                }
                Err(error) => {
                    warn!(factor = %spec, %error, "skipping factor");
                    FactorOutcome::Skipped {
                        spec: spec.clone(),
                        reason: error.to_string(),
                    }
                }
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        let computed = outcomes.iter().filter(|o| o.is_computed()).count();
        info!(
            computed,
            skipped = outcomes.len() - computed,
            "factor computation finished"
        );
        Ok((working, outcomes))
    }

    /// Clean every computed factor into its `alpha_*` column.
    pub fn clean(&self, panel: &Panel, outcomes: &[FactorOutcome]) -> Result<Panel> {
        let mut working = panel.clone();
        for outcome in outcomes {
            if let FactorOutcome::Computed { spec, column } = outcome {
                let cleaned = self.cleaner.process(&working, column)?;
                working = working.with_column(&spec.alpha_name(), &cleaned)?;
                debug!(factor = %spec, alpha = %spec.alpha_name(), "cleaned factor");
            }
        }
        Ok(working)
    }

    /// `asset`, `timestamp`, `close` and the `alpha_*` columns.
    pub fn alpha_table(&self, panel: &Panel, outcomes: &[FactorOutcome]) -> Result<DataFrame> {
        let alphas = alpha_columns(outcomes);
        let mut columns = vec![ASSET, TIMESTAMP, CLOSE];
        columns.extend(alphas.iter().map(String::as_str));
        Ok(panel.select(&columns)?)
    }

    /// Evaluate each `alpha_*` column against forward returns.
    ///
    /// Rows without a forward return are dropped first. The result is sorted
    /// by mean correlation, descending.
    pub fn evaluate(
        &self,
        panel: &Panel,
        outcomes: &[FactorOutcome],
    ) -> Result<Vec<EvaluationReport>> {
        let prepared = prepare(panel, self.config.evaluation.horizon)?;
        info!(
            rows = prepared.height(),
            horizon = self.config.evaluation.horizon,
            "prepared evaluation panel"
        );

        let mut reports = alpha_columns(outcomes)
            .iter()
            .map(|alpha| self.evaluator.evaluate(&prepared, alpha, FORWARD_RETURN))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        sort_reports(&mut reports);
        Ok(reports)
    }

    /// Run every stage.
    pub fn run(&self, panel: &Panel) -> Result<RunOutput> {
        let (panel, outcomes) = self.compute_factors(panel)?;
        self.finish(panel, outcomes)
    }

    /// Clean, tabulate and evaluate factors computed by
    /// [`Self::compute_factors`].
    pub fn finish(&self, panel: Panel, outcomes: Vec<FactorOutcome>) -> Result<RunOutput> {
        let panel = self.clean(&panel, &outcomes)?;
        let alpha_table = self.alpha_table(&panel, &outcomes)?;
        let reports = self.evaluate(&panel, &outcomes)?;
        Ok(RunOutput {
            panel,
            outcomes,
            alpha_table,
            reports,
        })
    }
}

/// `alpha_*` column of every computed factor, deduplicated, in order.
fn alpha_columns(outcomes: &[FactorOutcome]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for outcome in outcomes {
        if let FactorOutcome::Computed { spec, .. } = outcome {
            let alpha = spec.alpha_name();
            if !columns.contains(&alpha) {
                columns.push(alpha);
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use hobart_factors::FactorParams;
    use polars::prelude::*;

    fn panel() -> Panel {
        let mut asset = Vec::new();
        let mut timestamp = Vec::new();
        let mut close = Vec::new();
        for (name, step) in [("A", 1.0), ("B", -0.5), ("C", 0.25)] {
            for t in 0..12 {
                asset.push(name);
                timestamp.push(t as i64);
                close.push(50.0 + step * t as f64);
            }
        }
        Panel::new(df!("asset" => asset, "timestamp" => timestamp, "close" => close).unwrap())
            .unwrap()
    }

    fn config(factors: Vec<FactorSpec>) -> RunConfig {
        RunConfig {
            factors,
            ..RunConfig::default()
        }
        .with_horizon(1)
        .with_buckets(2)
    }

    #[test]
    fn test_unknown_and_unsupported_factors_are_skipped() {
        let pipeline = Pipeline::new(config(vec![
            FactorSpec::new("nope"),
            FactorSpec::new("pvt"),
            FactorSpec::new("roc").with_params(FactorParams::new().with("window", 3.0)),
        ]))
        .unwrap();

        let (panel, outcomes) = pipeline.compute_factors(&panel()).unwrap();

        assert!(matches!(&outcomes[0], FactorOutcome::Skipped { reason, .. } if reason.contains("nope")));
        assert!(matches!(&outcomes[1], FactorOutcome::Skipped { reason, .. } if reason.contains("volume")));
        assert!(outcomes[2].is_computed());
        assert!(panel.has_column("factor_roc_3"));
        assert!(!panel.has_column("factor_pvt"));
    }

    #[test]
    fn test_invalid_params_are_skipped() {
        let pipeline = Pipeline::new(config(vec![
            FactorSpec::new("rsi").with_params(FactorParams::new().with("window", 0.0)),
        ]))
        .unwrap();
        let (_, outcomes) = pipeline.compute_factors(&panel()).unwrap();
        assert!(!outcomes[0].is_computed());
    }

    #[test]
    fn test_progress_callback_sees_every_outcome() {
        let pipeline = Pipeline::new(config(vec![
            FactorSpec::new("roc"),
            FactorSpec::new("nope"),
        ]))
        .unwrap();
        let mut seen = Vec::new();
        pipeline
            .compute_factors_with(&panel(), |outcome| seen.push(outcome.spec().name.clone()))
            .unwrap();
        assert_eq!(seen, vec!["roc", "nope"]);
    }

    #[test]
    fn test_run_produces_alpha_table() {
        let pipeline = Pipeline::new(config(vec![
            FactorSpec::new("roc").with_params(FactorParams::new().with("window", 3.0)),
            FactorSpec::new("bias").with_params(FactorParams::new().with("window", 3.0)),
        ]))
        .unwrap();

        let output = pipeline.run(&panel()).unwrap();

        let names: Vec<&str> = output
            .alpha_table
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["asset", "timestamp", "close", "alpha_roc_3", "alpha_bias_3"]
        );
        assert_eq!(output.alpha_table.height(), 36);
        assert_eq!(output.reports.len(), 2);
        assert_eq!(output.skipped().count(), 0);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let result = Pipeline::new(RunConfig::default().with_horizon(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_specs_share_a_column() {
        let outcomes = vec![
            FactorOutcome::Computed {
                spec: FactorSpec::new("roc"),
                column: "factor_roc".to_string(),
            },
            FactorOutcome::Computed {
                spec: FactorSpec::new("roc"),
                column: "factor_roc".to_string(),
            },
        ];
        assert_eq!(alpha_columns(&outcomes), vec!["alpha_roc"]);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = FactorOutcome::Skipped {
            spec: FactorSpec::new("roc").with_lag(1),
            reason: "boom".to_string(),
        };
        assert_eq!(outcome.to_string(), "roc (lag 1) skipped: boom");
    }
}

//! Compliance Engine - single entry point for validating a creative.
//!
//! The engine is immutable after construction. Every call validates the
//! input, filters the registry by applicability, evaluates the remaining rules
//! in id order and scores the results. A rule that faults or panics fails on
//! its own; it never takes the rest of the report down with it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use lazy_static::lazy_static;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::classifier::{classify_with_timeout, ClassifierVerdict, TextClassifier};
use crate::config::{ConfigError, CopyLexicon, CopyPatterns, EngineConfig};
use crate::document::{CreativeDocument, CreativeFormat, FormatPreset, InputError};
use crate::hashing::document_hash;
use crate::report::{ComplianceReport, TextAnalysis};
use crate::rules::copy::{is_text_rule, screen_text, TextScreening};
use crate::rules::{registry, Category, Outcome, RuleContext, RuleDescriptor, RuleResult, RuleSpec};

lazy_static! {
    static ref DEFAULT_LEXICON: CopyLexicon = CopyPatterns::default()
        .compile()
        .expect("built-in copy patterns are valid");
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct ComplianceEngine {
    config: EngineConfig,
    lexicon: CopyLexicon,
    rules: Vec<RuleSpec>,
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceEngine {
    /// Engine with default thresholds, pattern lists and all 18 rules.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            lexicon: DEFAULT_LEXICON.clone(),
            rules: registry().to_vec(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.check_engine_version()?;
        let lexicon = config.copy.compile()?;
        Ok(Self {
            config,
            lexicon,
            rules: registry().to_vec(),
        })
    }

    /// Replace the rule set. Rules are kept in id order.
    pub fn with_rules(mut self, mut rules: Vec<RuleSpec>) -> Self {
        rules.sort_by_key(|r| r.id);
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validate(&self, doc: &CreativeDocument) -> Result<ComplianceReport, EngineError> {
        self.run(doc, |_| true, None)
    }

    pub fn validate_json(&self, payload: &str) -> Result<ComplianceReport, EngineError> {
        let doc = CreativeDocument::from_json(payload)?;
        self.validate(&doc)
    }

    /// Real-time subset validation: only applicable rules in `categories`.
    pub fn validate_categories(
        &self,
        doc: &CreativeDocument,
        categories: &[Category],
    ) -> Result<ComplianceReport, EngineError> {
        self.run(doc, |spec| categories.contains(&spec.category), None)
    }

    /// Like [`validate`](Self::validate), with the copy rules decided by
    /// `classifier` when it answers in time. Any classifier failure falls back
    /// to the local keyword rules.
    pub async fn validate_with_classifier(
        &self,
        doc: &CreativeDocument,
        classifier: &dyn TextClassifier,
    ) -> Result<ComplianceReport, EngineError> {
        doc.validate()?;

        let text = doc.copy_text();
        if text.is_empty() {
            return self.run(doc, |_| true, None);
        }

        let timeout = Duration::from_millis(self.config.classifier_timeout_ms);
        match classify_with_timeout(classifier, &text, timeout).await {
            Ok(verdict) => self.run(doc, |_| true, Some(&verdict)),
            Err(e) => {
                warn!(error = %e, "text classifier failed, using local copy rules");
                self.run(doc, |_| true, None)
            }
        }
    }

    pub fn rule_catalog(&self) -> Vec<RuleDescriptor> {
        self.rules.iter().map(RuleSpec::descriptor).collect()
    }

    pub fn supported_formats(&self) -> Vec<FormatPreset> {
        CreativeFormat::ALL.iter().map(CreativeFormat::preset).collect()
    }

    pub fn screen_text(&self, text: &str) -> TextScreening {
        screen_text(&self.lexicon, text)
    }

    fn run(
        &self,
        doc: &CreativeDocument,
        include: impl Fn(&RuleSpec) -> bool,
        verdict: Option<&ClassifierVerdict>,
    ) -> Result<ComplianceReport, EngineError> {
        doc.validate()?;

        let ctx = RuleContext::new(doc, &self.config, &self.lexicon);
        let (results, from_classifier): (Vec<RuleResult>, Vec<bool>) = self
            .rules
            .iter()
            .filter(|spec| spec.applicability.applies(doc) && include(*spec))
            .map(|spec| match verdict.and_then(|v| v.get(spec.id)) {
                Some(rv) if is_text_rule(spec.id) => {
                    let outcome = if rv.passed {
                        Outcome::Pass
                    } else {
                        Outcome::Fail(rv.rationale.clone().unwrap_or_else(|| {
                            format!("{} flagged by text classifier", spec.name)
                        }))
                    };
                    (spec.result(outcome), true)
                }
                _ => (evaluate(spec, &ctx), false),
            })
            .unzip();

        // A verdict that decided no rule leaves the report fully local.
        let text_analysis = if from_classifier.contains(&true) {
            TextAnalysis::Classifier
        } else {
            TextAnalysis::Local
        };
        let report = ComplianceReport::from_results(results, text_analysis, document_hash(doc)?);

        info!(
            score = report.compliance_score,
            total = report.total_rules,
            passed = report.passed_rules,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "compliance check complete"
        );
        Ok(report)
    }
}

/// Runs one rule, turning a fault or panic into a failing error result.
fn evaluate(spec: &RuleSpec, ctx: &RuleContext<'_>) -> RuleResult {
    match catch_unwind(AssertUnwindSafe(|| (spec.evaluate)(ctx))) {
        Ok(Ok(outcome)) => {
            let result = spec.result(outcome);
            debug!(rule_id = spec.id, passed = result.passed, "rule evaluated");
            result
        }
        Ok(Err(fault)) => {
            error!(rule_id = spec.id, rule = spec.name, error = %fault, "rule fault");
            spec.fault_result()
        }
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(rule_id = spec.id, rule = spec.name, panic = %detail, "rule panicked");
            spec.fault_result()
        }
    }
}

//! Compliance Report - scored outcome of one validation, and the export gate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{RuleId, RuleResult, Severity};

/// Which path decided the copy rules (1-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnalysis {
    Local,
    Classifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub compliance_score: u8,
    pub total_rules: usize,
    pub passed_rules: usize,
    pub is_compliant: bool,
    pub errors: Vec<RuleResult>,
    pub warnings: Vec<RuleResult>,
    pub evaluated_rules: Vec<RuleId>,
    pub text_analysis: TextAnalysis,
    pub document_hash: String,
}

/// `round(100 * passed / total)` with halves rounded up; 0 when nothing ran.
pub fn compliance_score(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let passed = passed.min(total);
    ((200 * passed + total) / (2 * total)) as u8
}

impl ComplianceReport {
    /// Builds the report from results in evaluation order.
    pub fn from_results(
        results: Vec<RuleResult>,
        text_analysis: TextAnalysis,
        document_hash: String,
    ) -> Self {
        let total_rules = results.len();
        let passed_rules = results.iter().filter(|r| r.passed).count();
        let evaluated_rules = results.iter().map(|r| r.rule_id).collect();

        let (errors, warnings): (Vec<RuleResult>, Vec<RuleResult>) = results
            .into_iter()
            .filter(|r| !r.passed)
            .partition(|r| r.severity == Severity::Error);

        Self {
            compliance_score: compliance_score(passed_rules, total_rules),
            total_rules,
            passed_rules,
            is_compliant: errors.is_empty(),
            errors,
            warnings,
            evaluated_rules,
            text_analysis,
            document_hash,
        }
    }

    /// Errors block export; warnings travel along as advisories.
    pub fn export_decision(&self) -> Result<ExportClearance, ExportBlocked> {
        if self.is_compliant {
            Ok(ExportClearance {
                advisories: self.warnings.clone(),
            })
        } else {
            Err(ExportBlocked {
                count: self.errors.len(),
                errors: self.errors.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportClearance {
    pub advisories: Vec<RuleResult>,
}

#[derive(Debug, Clone, Serialize, Error)]
#[error("Export blocked by {count} compliance error(s)")]
pub struct ExportBlocked {
    pub errors: Vec<RuleResult>,
    pub count: usize,
}

//! Text Classifier - optional delegation of the copy rules (1-7).
//!
//! A classifier is any async service that can judge copy. Its verdict is
//! advisory input to the engine: when it fails, times out, or answers for a
//! rule it has no say over, the engine falls back to the local keyword rules.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::copy::is_text_rule;
use crate::rules::RuleId;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),
}

/// Judgement for one copy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub rule_id: RuleId,
    pub passed: bool,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    #[serde(default)]
    pub verdicts: Vec<RuleVerdict>,
}

impl ClassifierVerdict {
    pub fn new(verdicts: Vec<RuleVerdict>) -> Self {
        Self { verdicts }
    }

    /// Parse a classifier's raw JSON answer.
    pub fn from_json(payload: &str) -> Result<Self, ClassifierError> {
        let verdict: ClassifierVerdict = serde_json::from_str(payload)
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
        verdict.check()?;
        Ok(verdict)
    }

    /// Only rules 1-7 may be decided by a classifier.
    pub fn check(&self) -> Result<(), ClassifierError> {
        match self.verdicts.iter().find(|v| !is_text_rule(v.rule_id)) {
            Some(v) => Err(ClassifierError::InvalidResponse(format!(
                "verdict for rule {} which is not a copy rule",
                v.rule_id
            ))),
            None => Ok(()),
        }
    }

    /// First verdict for `rule_id`, if the classifier gave one.
    pub fn get(&self, rule_id: RuleId) -> Option<&RuleVerdict> {
        self.verdicts.iter().find(|v| v.rule_id == rule_id)
    }
}

#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError>;
}

/// Runs `classifier` bounded by `timeout` and checks the verdict it returns.
pub async fn classify_with_timeout(
    classifier: &dyn TextClassifier,
    text: &str,
    timeout: Duration,
) -> Result<ClassifierVerdict, ClassifierError> {
    let verdict = tokio::time::timeout(timeout, classifier.classify(text))
        .await
        .map_err(|_| ClassifierError::Timeout(timeout.as_millis() as u64))??;
    verdict.check()?;
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    #[async_trait]
    impl TextClassifier for Slow {
        async fn classify(&self, _text: &str) -> Result<ClassifierVerdict, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ClassifierVerdict::default())
        }
    }

    struct Fixed(ClassifierVerdict);

    #[async_trait]
    impl TextClassifier for Fixed {
        async fn classify(&self, _text: &str) -> Result<ClassifierVerdict, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_verdict_from_json() {
        let verdict = ClassifierVerdict::from_json(
            r#"{"verdicts": [{"rule_id": 3, "passed": false, "rationale": "eco claim"}]}"#,
        )
        .unwrap();
        assert_eq!(verdict.get(3).map(|v| v.passed), Some(false));
        assert!(verdict.get(1).is_none());
    }

    #[test]
    fn test_verdict_outside_copy_rules_rejected() {
        let result = ClassifierVerdict::from_json(r#"{"verdicts": [{"rule_id": 12, "passed": true}]}"#);
        assert!(matches!(result, Err(ClassifierError::InvalidResponse(_))));

        let result = ClassifierVerdict::from_json("not json");
        assert!(matches!(result, Err(ClassifierError::InvalidResponse(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let result = classify_with_timeout(&Slow, "copy", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ClassifierError::Timeout(50))));
    }

    #[tokio::test]
    async fn test_bad_rule_id_from_classifier() {
        let classifier = Fixed(ClassifierVerdict::new(vec![RuleVerdict {
            rule_id: 16,
            passed: true,
            rationale: None,
        }]));
        let result = classify_with_timeout(&classifier, "copy", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ClassifierError::InvalidResponse(_))));
    }
}

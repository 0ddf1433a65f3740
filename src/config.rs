//! Engine Configuration - thresholds and copy pattern lists as data.
//!
//! Every field has a serde default so a config file only needs to name what it
//! overrides. Pattern lists are regular expressions matched case-insensitively.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern in {list}: {source}")]
    Pattern {
        list: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Config requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub layout: LayoutThresholds,
    #[serde(default)]
    pub typography: TypographyThresholds,
    #[serde(default)]
    pub drinkaware: DrinkawareThresholds,
    #[serde(default)]
    pub copy: CopyPatterns,
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: u64,
}

fn default_engine_min_version() -> String { "1.0.0".to_string() }
fn default_classifier_timeout_ms() -> u64 { 2000 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_min_version: default_engine_min_version(),
            layout: LayoutThresholds::default(),
            typography: TypographyThresholds::default(),
            drinkaware: DrinkawareThresholds::default(),
            copy: CopyPatterns::default(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.check_engine_version()?;
        Ok(config)
    }

    pub fn check_engine_version(&self) -> Result<(), ConfigError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| ConfigError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| ConfigError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(ConfigError::EngineVersionMismatch {
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutThresholds {
    #[serde(default = "default_stories_top")]
    pub stories_safe_top: f64,
    #[serde(default = "default_stories_bottom")]
    pub stories_safe_bottom: f64,
    #[serde(default = "default_tag_bottom_region")]
    pub tag_bottom_region: f64,
    #[serde(default = "default_cta_max_length")]
    pub cta_max_length: usize,
}

fn default_stories_top() -> f64 { 200.0 }
fn default_stories_bottom() -> f64 { 250.0 }
fn default_tag_bottom_region() -> f64 { 150.0 }
fn default_cta_max_length() -> usize { 40 }

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            stories_safe_top: default_stories_top(),
            stories_safe_bottom: default_stories_bottom(),
            tag_bottom_region: default_tag_bottom_region(),
            cta_max_length: default_cta_max_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypographyThresholds {
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f64,
    #[serde(default = "default_legal_min_font_size")]
    pub legal_min_font_size: f64,
    /// Text longer than this, sitting in the legal region, is treated as a disclaimer.
    #[serde(default = "default_legal_text_min_length")]
    pub legal_text_min_length: usize,
    /// Fraction of the canvas height, measured from the bottom.
    #[serde(default = "default_legal_region_fraction")]
    pub legal_region_fraction: f64,
    #[serde(default = "default_contrast_normal")]
    pub contrast_normal: f64,
    #[serde(default = "default_contrast_large")]
    pub contrast_large: f64,
    #[serde(default = "default_large_bold_size")]
    pub large_text_bold_size: f64,
    #[serde(default = "default_large_regular_size")]
    pub large_text_regular_size: f64,
}

fn default_min_font_size() -> f64 { 14.0 }
fn default_legal_min_font_size() -> f64 { 18.0 }
fn default_legal_text_min_length() -> usize { 60 }
fn default_legal_region_fraction() -> f64 { 0.2 }
fn default_contrast_normal() -> f64 { 4.5 }
fn default_contrast_large() -> f64 { 3.0 }
fn default_large_bold_size() -> f64 { 18.0 }
fn default_large_regular_size() -> f64 { 24.0 }

impl Default for TypographyThresholds {
    fn default() -> Self {
        Self {
            min_font_size: default_min_font_size(),
            legal_min_font_size: default_legal_min_font_size(),
            legal_text_min_length: default_legal_text_min_length(),
            legal_region_fraction: default_legal_region_fraction(),
            contrast_normal: default_contrast_normal(),
            contrast_large: default_contrast_large(),
            large_text_bold_size: default_large_bold_size(),
            large_text_regular_size: default_large_regular_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkawareThresholds {
    #[serde(default = "default_drinkaware_min_height")]
    pub min_height: f64,
    #[serde(default = "default_drinkaware_says_min_height")]
    pub says_min_height: f64,
    #[serde(default = "default_drinkaware_min_contrast")]
    pub min_contrast: f64,
}

fn default_drinkaware_min_height() -> f64 { 20.0 }
fn default_drinkaware_says_min_height() -> f64 { 12.0 }
fn default_drinkaware_min_contrast() -> f64 { 4.5 }

impl Default for DrinkawareThresholds {
    fn default() -> Self {
        Self {
            min_height: default_drinkaware_min_height(),
            says_min_height: default_drinkaware_says_min_height(),
            min_contrast: default_drinkaware_min_contrast(),
        }
    }
}

/// Lexical heuristics for the copy rules. These are keyword matches, not semantic
/// understanding: "green" in a product name is flagged the same as a green claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyPatterns {
    #[serde(default = "default_terms_patterns")]
    pub terms_and_conditions: Vec<String>,
    #[serde(default = "default_competition_patterns")]
    pub competitions: Vec<String>,
    #[serde(default = "default_sustainability_patterns")]
    pub sustainability: Vec<String>,
    #[serde(default = "default_charity_patterns")]
    pub charity: Vec<String>,
    #[serde(default = "default_price_patterns")]
    pub price_callouts: Vec<String>,
    #[serde(default = "default_money_back_patterns")]
    pub money_back: Vec<String>,
    /// Claim phrases that fail on their own.
    #[serde(default = "default_claim_phrases")]
    pub claim_phrases: Vec<String>,
    /// Survey language that fails only alongside an asterisk.
    #[serde(default = "default_survey_terms")]
    pub survey_terms: Vec<String>,
    #[serde(default = "default_cta_patterns")]
    pub cta: Vec<String>,
    #[serde(default = "default_approved_tags")]
    pub approved_tags: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_terms_patterns() -> Vec<String> {
    strings(&[
        r"terms\s+(?:and|&)\s+conditions?",
        r"\bt\s*&\s*c'?s?\b",
        r"\*\s*see\b",
        r"\bterms\s+apply\b",
        r"\bsubject\s+to\b",
        r"\brestrictions?\s+apply\b",
    ])
}

fn default_competition_patterns() -> Vec<String> {
    strings(&[
        r"\benter\s+now\s+to\s+win\b",
        r"\bwin\b",
        r"\bcompetitions?\b",
        r"\bprize\s+draw\b",
        r"\bgiveaway\b",
        r"\bsweepstakes\b",
        r"\braffle\b",
    ])
}

fn default_sustainability_patterns() -> Vec<String> {
    strings(&[
        r"\beco[-\s]?friendly\b",
        r"\bsustainab(?:le|ility)\b",
        r"\bcarbon\s+neutral\b",
        r"\bgreen\b",
        r"\bnet\s+zero\b",
        r"\benvironmentally\s+friendly\b",
    ])
}

fn default_charity_patterns() -> Vec<String> {
    strings(&[
        r"%\s*donated",
        r"\bcharity\s+partners?\b",
        r"\bin\s+aid\s+of\b",
        r"\bproceeds\s+go\s+to\b",
        r"\bdonations?\b",
    ])
}

fn default_price_patterns() -> Vec<String> {
    strings(&[r"[£$€]\d+(?:\.\d{2})?"])
}

fn default_money_back_patterns() -> Vec<String> {
    strings(&[
        r"\bmoney[-\s]back\s+guarantee",
        r"\b100\s*%\s*guaranteed\b",
        r"\brefund\s+guarantee",
    ])
}

fn default_claim_phrases() -> Vec<String> {
    strings(&[r"\baccording\s+to\s+(?:a|our)\s+survey\b"])
}

fn default_survey_terms() -> Vec<String> {
    strings(&[
        r"\bsurvey",
        r"\bstud(?:y|ies)\b",
        r"\bproven\b",
        r"\btested\b",
        r"\bclinically\b",
        r"\b\d+\s*%\s+of\b",
    ])
}

fn default_cta_patterns() -> Vec<String> {
    strings(&[r"\b(?:shop\s+now|buy\s+now|learn\s+more|get\s+it\s+now)\b"])
}

fn default_approved_tags() -> Vec<String> {
    strings(&[
        "Only at Tesco",
        "Available at Tesco",
        "Selected stores. While stocks last.",
    ])
}

impl Default for CopyPatterns {
    fn default() -> Self {
        Self {
            terms_and_conditions: default_terms_patterns(),
            competitions: default_competition_patterns(),
            sustainability: default_sustainability_patterns(),
            charity: default_charity_patterns(),
            price_callouts: default_price_patterns(),
            money_back: default_money_back_patterns(),
            claim_phrases: default_claim_phrases(),
            survey_terms: default_survey_terms(),
            cta: default_cta_patterns(),
            approved_tags: default_approved_tags(),
        }
    }
}

/// A named, compiled pattern list. The source string is kept for messages.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<(String, Regex)>,
}

impl PatternSet {
    pub fn compile(list: &'static str, sources: &[String]) -> Result<Self, ConfigError> {
        let patterns = sources
            .iter()
            .map(|src| {
                RegexBuilder::new(src)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (src.clone(), re))
                    .map_err(|source| ConfigError::Pattern { list, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The matched substring of the first pattern that hits.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .find_map(|(_, re)| re.find(text).map(|m| m.as_str()))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Copy pattern lists compiled once per engine.
#[derive(Debug, Clone)]
pub struct CopyLexicon {
    pub terms_and_conditions: PatternSet,
    pub competitions: PatternSet,
    pub sustainability: PatternSet,
    pub charity: PatternSet,
    pub price_callouts: PatternSet,
    pub money_back: PatternSet,
    pub claim_phrases: PatternSet,
    pub survey_terms: PatternSet,
    pub cta: PatternSet,
    pub approved_tags: Vec<String>,
}

impl CopyPatterns {
    pub fn compile(&self) -> Result<CopyLexicon, ConfigError> {
        Ok(CopyLexicon {
            terms_and_conditions: PatternSet::compile(
                "terms_and_conditions",
                &self.terms_and_conditions,
            )?,
            competitions: PatternSet::compile("competitions", &self.competitions)?,
            sustainability: PatternSet::compile("sustainability", &self.sustainability)?,
            charity: PatternSet::compile("charity", &self.charity)?,
            price_callouts: PatternSet::compile("price_callouts", &self.price_callouts)?,
            money_back: PatternSet::compile("money_back", &self.money_back)?,
            claim_phrases: PatternSet::compile("claim_phrases", &self.claim_phrases)?,
            survey_terms: PatternSet::compile("survey_terms", &self.survey_terms)?,
            cta: PatternSet::compile("cta", &self.cta)?,
            approved_tags: self.approved_tags.clone(),
        })
    }
}

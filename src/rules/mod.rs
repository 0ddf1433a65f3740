//! Rule Registry - the closed set of compliance rules.
//!
//! Every rule is a [`RuleSpec`]: identity, category, severity, an applicability
//! predicate over the document and a plain evaluation function. The engine
//! filters the registry by applicability and evaluates what remains in id order.

pub mod copy;
pub mod design;
pub mod format;
pub mod media;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CopyLexicon, EngineConfig};
use crate::contrast::ColorError;
use crate::document::{CreativeDocument, CreativeFormat};

pub type RuleId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Copy,
    Design,
    Format,
    Accessibility,
    Media,
    Alcohol,
    Packshot,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Copy,
        Category::Design,
        Category::Format,
        Category::Accessibility,
        Category::Media,
        Category::Alcohol,
        Category::Packshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Copy => "copy",
            Category::Design => "design",
            Category::Format => "format",
            Category::Accessibility => "accessibility",
            Category::Media => "media",
            Category::Alcohol => "alcohol",
            Category::Packshot => "packshot",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Outcome of one rule for one document. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: RuleId,
    #[serde(rename = "rule")]
    pub rule_name: String,
    pub category: Category,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

impl Outcome {
    /// Fails with all issues joined, or passes when there are none.
    pub fn from_issues(issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail(issues.join("; "))
        }
    }
}

/// An unexpected condition while evaluating a rule. Isolated to that rule.
#[derive(Debug, Error)]
pub enum RuleFault {
    #[error("Element {element} has an unreadable color: {source}")]
    Color {
        element: String,
        #[source]
        source: ColorError,
    },

    #[error("Rule panicked: {0}")]
    Panicked(String),
}

/// When a rule is part of the report for a given document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    Always,
    StoriesFormat,
    PeopleInImages,
    AlcoholCampaign,
}

impl Applicability {
    pub fn applies(&self, doc: &CreativeDocument) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::StoriesFormat => doc.format == CreativeFormat::Stories,
            Applicability::PeopleInImages => doc.has_people_in_images,
            Applicability::AlcoholCampaign => doc.is_alcohol_campaign,
        }
    }
}

/// Everything a rule may read. Built once per validation call.
pub struct RuleContext<'a> {
    pub doc: &'a CreativeDocument,
    pub config: &'a EngineConfig,
    pub lexicon: &'a CopyLexicon,
    pub copy_text: String,
}

impl<'a> RuleContext<'a> {
    pub fn new(doc: &'a CreativeDocument, config: &'a EngineConfig, lexicon: &'a CopyLexicon) -> Self {
        Self {
            doc,
            config,
            lexicon,
            copy_text: doc.copy_text(),
        }
    }
}

pub type EvaluateFn = fn(&RuleContext<'_>) -> Result<Outcome, RuleFault>;

#[derive(Clone, Copy)]
pub struct RuleSpec {
    pub id: RuleId,
    pub name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
    pub applicability: Applicability,
    pub evaluate: EvaluateFn,
}

impl std::fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSpec")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

pub const FAULT_MESSAGE: &str = "Rule could not be evaluated due to an internal error";

impl RuleSpec {
    pub fn result(&self, outcome: Outcome) -> RuleResult {
        let (passed, message) = match outcome {
            Outcome::Pass => (true, String::new()),
            Outcome::Fail(message) => (false, message),
        };
        RuleResult {
            rule_id: self.id,
            rule_name: self.name.to_string(),
            category: self.category,
            severity: self.severity,
            passed,
            message,
        }
    }

    /// Faults always surface as errors, whatever the rule's normal severity.
    pub fn fault_result(&self) -> RuleResult {
        RuleResult {
            rule_id: self.id,
            rule_name: self.name.to_string(),
            category: self.category,
            severity: Severity::Error,
            passed: false,
            message: FAULT_MESSAGE.to_string(),
        }
    }

    pub fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            id: self.id,
            name: self.name,
            category: self.category,
            severity: self.severity,
            description: self.description,
            applicability: self.applicability,
        }
    }
}

/// Serializable view of a rule for catalog listings.
#[derive(Debug, Clone, Serialize)]
pub struct RuleDescriptor {
    pub id: RuleId,
    pub name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
    pub applicability: Applicability,
}

const fn rule(
    id: RuleId,
    name: &'static str,
    category: Category,
    severity: Severity,
    applicability: Applicability,
    description: &'static str,
    evaluate: EvaluateFn,
) -> RuleSpec {
    RuleSpec { id, name, category, severity, description, applicability, evaluate }
}

use Applicability as A;
use Category as C;

static REGISTRY: [RuleSpec; 18] = [
    rule(1, "No T&Cs", C::Copy, Severity::Error, A::Always,
        "No T&Cs or claims in copy", copy::no_terms_and_conditions),
    rule(2, "No Competitions", C::Copy, Severity::Error, A::Always,
        "Competition copy not allowed", copy::no_competitions),
    rule(3, "No Sustainability Claims", C::Copy, Severity::Error, A::Always,
        "No green or sustainability claims", copy::no_sustainability_claims),
    rule(4, "No Charity Partnerships", C::Copy, Severity::Error, A::Always,
        "Charity partnership text not allowed", copy::no_charity_partnerships),
    rule(5, "No Price Call-Outs", C::Copy, Severity::Error, A::Always,
        "Prices belong in value tiles, not copy", copy::no_price_callouts),
    rule(6, "No Money-Back Guarantees", C::Copy, Severity::Error, A::Always,
        "Money-back guarantee text not allowed", copy::no_money_back_guarantees),
    rule(7, "No Claims", C::Copy, Severity::Error, A::Always,
        "No claims via asterisks or survey references", copy::no_claims),
    rule(8, "Tesco Tags", C::Copy, Severity::Error, A::Always,
        "Only approved Tesco tag text", copy::approved_tags),
    rule(9, "Value Tile", C::Design, Severity::Error, A::Always,
        "Value tiles carry required prices and are not overlaid", design::value_tiles),
    rule(10, "CTA", C::Design, Severity::Error, A::Always,
        "Calls to action are non-empty and short", design::call_to_action),
    rule(11, "Tesco Tag Position", C::Design, Severity::Error, A::Always,
        "Tesco tags sit in the bottom region", design::tag_position),
    rule(12, "Social Safe Zone", C::Format, Severity::Error, A::StoriesFormat,
        "9:16 keeps 200px top and 250px bottom free", format::social_safe_zone),
    rule(13, "Minimum Font Size", C::Accessibility, Severity::Error, A::Always,
        "Text meets minimum font sizes", design::minimum_font_size),
    rule(14, "Contrast", C::Accessibility, Severity::Error, A::Always,
        "Text meets WCAG AA contrast", design::text_contrast),
    rule(15, "Photography of People", C::Media, Severity::Warning, A::PeopleInImages,
        "People in images need confirmed usage rights", media::photography_of_people),
    rule(16, "Drinkaware", C::Alcohol, Severity::Error, A::AlcoholCampaign,
        "Alcohol campaigns include a legible Drinkaware lock-up", media::drinkaware_lockup),
    rule(17, "Packshot Positioning", C::Packshot, Severity::Error, A::Always,
        "Packshot is not covered by value tiles or tags", media::packshot_positioning),
    rule(18, "Packshot Safe Zone", C::Packshot, Severity::Error, A::StoriesFormat,
        "Packshot sits fully inside the 9:16 safe zone", media::packshot_safe_zone),
];

/// All rules in id order.
pub fn registry() -> &'static [RuleSpec] {
    &REGISTRY
}

pub fn find(id: RuleId) -> Option<&'static RuleSpec> {
    REGISTRY.iter().find(|r| r.id == id)
}

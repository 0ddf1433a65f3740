//! Copy rules (1-8) and standalone text screening.
//!
//! Rules 1-7 are keyword heuristics over the concatenated copy. They will flag
//! incidental matches ("Green Giant" trips rule 3); that is accepted and the
//! pattern lists are configuration, not code.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{find, Outcome, RuleContext, RuleFault, RuleId};
use crate::config::{CopyLexicon, PatternSet};
use crate::document::{ElementKind, TileType};

lazy_static! {
    /// Clubcard tag template. Day and month ranges are checked separately.
    static ref CLUBCARD_TAG: Regex = Regex::new(
        r"^Available in selected stores\. Clubcard/app required\. Ends (\d{2})/(\d{2})$"
    )
    .unwrap();
}

fn forbid(set: &PatternSet, text: &str, what: &str) -> Outcome {
    match set.first_match(text) {
        Some(found) => Outcome::Fail(format!("{} detected in copy: '{}'", what, found)),
        None => Outcome::Pass,
    }
}

pub fn check_terms(lexicon: &CopyLexicon, text: &str) -> Outcome {
    forbid(&lexicon.terms_and_conditions, text, "T&Cs or claim text")
}

pub fn check_competitions(lexicon: &CopyLexicon, text: &str) -> Outcome {
    forbid(&lexicon.competitions, text, "Competition language")
}

pub fn check_sustainability(lexicon: &CopyLexicon, text: &str) -> Outcome {
    forbid(&lexicon.sustainability, text, "Sustainability claim")
}

pub fn check_charity(lexicon: &CopyLexicon, text: &str) -> Outcome {
    forbid(&lexicon.charity, text, "Charity partnership text")
}

pub fn check_price_callouts(lexicon: &CopyLexicon, text: &str) -> Outcome {
    match lexicon.price_callouts.first_match(text) {
        Some(found) => Outcome::Fail(format!(
            "Price call-out '{}' in copy; prices belong in a value tile",
            found
        )),
        None => Outcome::Pass,
    }
}

pub fn check_money_back(lexicon: &CopyLexicon, text: &str) -> Outcome {
    forbid(&lexicon.money_back, text, "Money-back guarantee")
}

/// Survey language only counts as a claim when a footnote asterisk is present.
pub fn check_claims(lexicon: &CopyLexicon, text: &str) -> Outcome {
    if let Some(found) = lexicon.claim_phrases.first_match(text) {
        return Outcome::Fail(format!("Survey claim detected in copy: '{}'", found));
    }
    if text.contains('*') {
        if let Some(found) = lexicon.survey_terms.first_match(text) {
            return Outcome::Fail(format!(
                "Asterisked claim detected in copy: '*' with '{}'",
                found
            ));
        }
    }
    Outcome::Pass
}

type CopyCheck = fn(&CopyLexicon, &str) -> Outcome;

/// The text-only rules, in id order.
pub const TEXT_CHECKS: [(RuleId, CopyCheck); 7] = [
    (1, check_terms),
    (2, check_competitions),
    (3, check_sustainability),
    (4, check_charity),
    (5, check_price_callouts),
    (6, check_money_back),
    (7, check_claims),
];

pub fn is_text_rule(id: RuleId) -> bool {
    TEXT_CHECKS.iter().any(|(rule_id, _)| *rule_id == id)
}

pub fn no_terms_and_conditions(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_terms(ctx.lexicon, &ctx.copy_text))
}

pub fn no_competitions(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_competitions(ctx.lexicon, &ctx.copy_text))
}

pub fn no_sustainability_claims(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_sustainability(ctx.lexicon, &ctx.copy_text))
}

pub fn no_charity_partnerships(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_charity(ctx.lexicon, &ctx.copy_text))
}

pub fn no_price_callouts(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_price_callouts(ctx.lexicon, &ctx.copy_text))
}

pub fn no_money_back_guarantees(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_money_back(ctx.lexicon, &ctx.copy_text))
}

pub fn no_claims(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    Ok(check_claims(ctx.lexicon, &ctx.copy_text))
}

/// `Available in selected stores. Clubcard/app required. Ends DD/MM` with
/// day 01-31 and month 01-12.
pub fn is_clubcard_tag(text: &str) -> bool {
    let Some(caps) = CLUBCARD_TAG.captures(text) else {
        return false;
    };
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    (1..=31).contains(&day) && (1..=12).contains(&month)
}

/// Every tag element, and a non-empty `tag_text`, must be approved text or a
/// valid Clubcard tag, compared exactly. When a Clubcard value tile is present
/// and the creative carries tags, one of them must be a Clubcard tag.
pub fn approved_tags(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let doc = ctx.doc;
    let approved = &ctx.lexicon.approved_tags;

    let mut tags: Vec<(String, &str)> = doc
        .elements
        .iter()
        .enumerate()
        .filter_map(|(i, el)| match &el.kind {
            ElementKind::Tag(tag) => Some((format!("Tag {}", el.label(i)), tag.text.as_str())),
            _ => None,
        })
        .collect();
    if let Some(text) = doc.tag_text.as_deref().filter(|t| !t.trim().is_empty()) {
        tags.push(("Tag text".to_string(), text));
    }

    let mut issues = vec![];
    let mut has_clubcard_tag = false;

    for (label, text) in &tags {
        if approved.iter().any(|a| a.as_str() == *text) {
            continue;
        }
        if is_clubcard_tag(text) {
            has_clubcard_tag = true;
            continue;
        }
        issues.push(format!(
            "{} '{}' is not approved; use one of: {}, or the Clubcard tag ending 'Ends DD/MM'",
            label,
            text,
            approved.join(", ")
        ));
    }

    let has_clubcard_tile = doc.elements.iter().any(|el| {
        matches!(&el.kind, ElementKind::ValueTile(tile) if tile.tile_type == TileType::Clubcard)
    });
    if has_clubcard_tile && !tags.is_empty() && !has_clubcard_tag {
        issues.push("Clubcard Price tile requires a Clubcard tag with an 'Ends DD/MM' date".to_string());
    }

    Ok(Outcome::from_issues(issues))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningSeverity {
    High,
    Low,
}

/// Result of screening a single piece of copy outside of a full creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextScreening {
    pub is_compliant: bool,
    pub violations: Vec<String>,
    pub severity: ScreeningSeverity,
}

/// Runs the text-only copy rules (1-7) over `text`.
pub fn screen_text(lexicon: &CopyLexicon, text: &str) -> TextScreening {
    let violations: Vec<String> = TEXT_CHECKS
        .iter()
        .filter_map(|(id, check)| match check(lexicon, text) {
            Outcome::Pass => None,
            Outcome::Fail(message) => {
                let name = find(*id).map_or("Copy", |spec| spec.name);
                Some(format!("{}: {}", name, message))
            }
        })
        .collect();

    TextScreening {
        is_compliant: violations.is_empty(),
        severity: if violations.is_empty() {
            ScreeningSeverity::Low
        } else {
            ScreeningSeverity::High
        },
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CopyPatterns, EngineConfig};
    use crate::document::{CreativeDocument, CreativeFormat, Element, TagElement, ValueTileElement};

    fn lexicon() -> CopyLexicon {
        CopyPatterns::default().compile().unwrap()
    }

    fn failed(outcome: Outcome) -> bool {
        matches!(outcome, Outcome::Fail(_))
    }

    #[test]
    fn test_terms_patterns() {
        let lx = lexicon();
        assert!(failed(check_terms(&lx, "Big savings. T&Cs apply")));
        assert!(failed(check_terms(&lx, "Read the Terms and Conditions")));
        assert!(failed(check_terms(&lx, "Tastes great *see pack")));
        assert!(!failed(check_terms(&lx, "Tastes great")));
    }

    #[test]
    fn test_competition_whole_word() {
        let lx = lexicon();
        assert!(failed(check_competitions(&lx, "Enter now to win a hamper")));
        assert!(failed(check_competitions(&lx, "Prize draw this weekend")));
        assert!(!failed(check_competitions(&lx, "Perfect for winter windows")));
    }

    #[test]
    fn test_sustainability_known_false_positive() {
        let lx = lexicon();
        assert!(failed(check_sustainability(&lx, "Carbon neutral crisps")));
        // Brand names trip the keyword list; documented limitation.
        assert!(failed(check_sustainability(&lx, "Green Giant sweetcorn")));
        assert!(!failed(check_sustainability(&lx, "Evergreen favourite")));
    }

    #[test]
    fn test_charity_patterns() {
        let lx = lexicon();
        assert!(failed(check_charity(&lx, "10% donated to local schools")));
        assert!(failed(check_charity(&lx, "Sold in aid of children")));
        assert!(!failed(check_charity(&lx, "Made with care")));
    }

    #[test]
    fn test_price_pattern() {
        let lx = lexicon();
        match check_price_callouts(&lx, "Save £5 today!") {
            Outcome::Fail(message) => assert!(message.contains("£5")),
            Outcome::Pass => panic!("price not detected"),
        }
        assert!(failed(check_price_callouts(&lx, "Only £1.50")));
        assert!(!failed(check_price_callouts(&lx, "Serves 4")));
    }

    #[test]
    fn test_money_back() {
        let lx = lexicon();
        assert!(failed(check_money_back(&lx, "Money-back guarantee included")));
        assert!(failed(check_money_back(&lx, "100% guaranteed fresh")));
        assert!(!failed(check_money_back(&lx, "Fresh every day")));
    }

    #[test]
    fn test_claims_need_asterisk_or_phrase() {
        let lx = lexicon();
        assert!(failed(check_claims(&lx, "Loved by families*  *Survey of 500")));
        assert!(failed(check_claims(&lx, "Best taste according to a survey")));
        assert!(!failed(check_claims(&lx, "Tested recipe")));
        assert!(!failed(check_claims(&lx, "Crunchy*")));
    }

    #[test]
    fn test_clubcard_tag_dates() {
        let prefix = "Available in selected stores. Clubcard/app required. Ends";
        assert!(is_clubcard_tag(&format!("{} 31/12", prefix)));
        assert!(is_clubcard_tag(&format!("{} 01/01", prefix)));
        assert!(!is_clubcard_tag(&format!("{} 32/01", prefix)));
        assert!(!is_clubcard_tag(&format!("{} 10/13", prefix)));
        assert!(!is_clubcard_tag(&format!("{} 00/05", prefix)));
        assert!(!is_clubcard_tag(&format!("{} 1/5", prefix)));
    }

    fn tag(text: &str) -> Element {
        Element::new(
            ElementKind::Tag(TagElement { text: text.to_string() }),
            0.0,
            980.0,
            400.0,
            40.0,
        )
    }

    fn run_tags(doc: &CreativeDocument) -> Outcome {
        let config = EngineConfig::default();
        let lx = lexicon();
        let ctx = RuleContext::new(doc, &config, &lx);
        approved_tags(&ctx).unwrap()
    }

    #[test]
    fn test_approved_tag_elements() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.elements.push(tag("Available at Tesco"));
        assert_eq!(run_tags(&doc), Outcome::Pass);

        doc.elements.push(tag("Only at Tesco!!"));
        assert!(failed(run_tags(&doc)));
    }

    #[test]
    fn test_tag_text_must_match_exactly() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.elements.push(tag("Only at Tesco "));
        assert!(failed(run_tags(&doc)));

        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.tag_text = Some("only at tesco".to_string());
        assert!(failed(run_tags(&doc)));

        doc.tag_text = Some("   ".to_string());
        assert_eq!(run_tags(&doc), Outcome::Pass);
    }

    #[test]
    fn test_clubcard_tile_without_tags_passes() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.elements.push(Element::new(
            ElementKind::ValueTile(ValueTileElement {
                tile_type: TileType::Clubcard,
                price: Some("£2".to_string()),
                regular_price: Some("£3".to_string()),
            }),
            20.0,
            20.0,
            200.0,
            120.0,
        ));
        assert_eq!(run_tags(&doc), Outcome::Pass);
    }

    #[test]
    fn test_clubcard_tile_requires_clubcard_tag() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.elements.push(Element::new(
            ElementKind::ValueTile(ValueTileElement {
                tile_type: TileType::Clubcard,
                price: Some("£2".to_string()),
                regular_price: Some("£3".to_string()),
            }),
            20.0,
            20.0,
            200.0,
            120.0,
        ));
        doc.elements.push(tag("Only at Tesco"));
        assert!(failed(run_tags(&doc)));

        doc.elements.push(tag(
            "Available in selected stores. Clubcard/app required. Ends 28/02",
        ));
        assert_eq!(run_tags(&doc), Outcome::Pass);
    }

    #[test]
    fn test_screen_text() {
        let lx = lexicon();
        let clean = screen_text(&lx, "Crunchy, golden and delicious");
        assert!(clean.is_compliant);
        assert_eq!(clean.severity, ScreeningSeverity::Low);

        let dirty = screen_text(&lx, "Win big! Only £3, money back guarantee");
        assert!(!dirty.is_compliant);
        assert_eq!(dirty.severity, ScreeningSeverity::High);
        assert_eq!(dirty.violations.len(), 3);
        assert!(dirty.violations[0].starts_with("No Competitions"));
    }
}

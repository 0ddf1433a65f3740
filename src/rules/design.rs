//! Design and accessibility rules: value tiles, CTAs, tag position,
//! minimum font sizes and WCAG AA contrast.

use super::{Outcome, RuleContext, RuleFault};
use crate::contrast::{contrast_ratio, Color};
use crate::document::{ElementKind, TextElement, TileType};
use crate::geometry::rects_overlap;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Rule 9: White and Clubcard tiles need a price, Clubcard also the regular
/// price, and no tile may overlap another tile or a tag.
pub fn value_tiles(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let elements = &ctx.doc.elements;
    let mut issues = vec![];

    for (i, el) in elements.iter().enumerate() {
        let ElementKind::ValueTile(tile) = &el.kind else {
            continue;
        };

        match tile.tile_type {
            TileType::White | TileType::Clubcard if is_blank(&tile.price) => {
                issues.push(format!("Value tile {} requires a price", el.label(i)));
            }
            _ => {}
        }
        if tile.tile_type == TileType::Clubcard && is_blank(&tile.regular_price) {
            issues.push(format!(
                "Clubcard value tile {} requires a regular price",
                el.label(i)
            ));
        }

        // Each colliding pair is reported once, from the earlier tile.
        for (j, other) in elements.iter().enumerate() {
            if j == i || !(other.is_value_tile() || other.is_tag()) {
                continue;
            }
            if other.is_value_tile() && j < i {
                continue;
            }
            if rects_overlap(&el.rect(), &other.rect()) {
                issues.push(format!(
                    "Value tile {} overlaps {} {}",
                    el.label(i),
                    other.type_name(),
                    other.label(j)
                ));
            }
        }
    }

    Ok(Outcome::from_issues(issues))
}

/// Rule 10: anything reading like a call to action must be short. Matching the
/// CTA pattern already implies non-empty text.
pub fn call_to_action(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let max_len = ctx.config.layout.cta_max_length;
    let mut issues = vec![];

    for (i, el) in ctx.doc.elements.iter().enumerate() {
        let Some(text) = el.text() else {
            continue;
        };
        if !ctx.lexicon.cta.is_match(text) {
            continue;
        }

        let length = text.trim().chars().count();
        if length > max_len {
            issues.push(format!(
                "CTA {} is {} characters, maximum is {}",
                el.label(i),
                length,
                max_len
            ));
        }
    }

    Ok(Outcome::from_issues(issues))
}

/// Rule 11: tags must reach into the bottom band of the canvas.
pub fn tag_position(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let (_, canvas_h) = ctx.doc.canvas_size();
    let band_top = canvas_h - ctx.config.layout.tag_bottom_region;
    let mut issues = vec![];

    for (i, el) in ctx.doc.elements.iter().enumerate() {
        if el.is_tag() && el.rect().bottom() < band_top {
            issues.push(format!(
                "Tesco tag {} must sit in the bottom {}px of the creative",
                el.label(i),
                ctx.config.layout.tag_bottom_region
            ));
        }
    }

    Ok(Outcome::from_issues(issues))
}

/// Rule 13: body text needs 14px; long text in the bottom band is treated as
/// legal copy and needs 18px.
pub fn minimum_font_size(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let typo = &ctx.config.typography;
    let (_, canvas_h) = ctx.doc.canvas_size();
    let legal_top = canvas_h * (1.0 - typo.legal_region_fraction);
    let mut issues = vec![];

    for (i, el) in ctx.doc.elements.iter().enumerate() {
        let ElementKind::Text(text) = &el.kind else {
            continue;
        };

        let is_legal =
            text.text.chars().count() > typo.legal_text_min_length && el.y >= legal_top;
        let required = if is_legal {
            typo.legal_min_font_size
        } else {
            typo.min_font_size
        };

        if text.font_size < required {
            issues.push(format!(
                "{} {} has font size {}px, minimum is {}px",
                if is_legal { "Legal text" } else { "Text" },
                el.label(i),
                text.font_size,
                required
            ));
        }
    }

    Ok(Outcome::from_issues(issues))
}

fn is_large_text(text: &TextElement, ctx: &RuleContext<'_>) -> bool {
    let typo = &ctx.config.typography;
    (text.is_bold() && text.font_size >= typo.large_text_bold_size)
        || text.font_size >= typo.large_text_regular_size
}

/// Rule 14: text fill against the canvas background. Layered backgrounds are
/// not resolved.
pub fn text_contrast(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let typo = &ctx.config.typography;
    let background: Color = ctx.doc.background_color.parse().map_err(|source| RuleFault::Color {
        element: "background".to_string(),
        source,
    })?;
    let mut issues = vec![];

    for (i, el) in ctx.doc.elements.iter().enumerate() {
        let ElementKind::Text(text) = &el.kind else {
            continue;
        };

        let fill: Color = text.fill.parse().map_err(|source| RuleFault::Color {
            element: el.label(i),
            source,
        })?;
        let ratio = contrast_ratio(&fill, &background);
        let required = if is_large_text(text, ctx) {
            typo.contrast_large
        } else {
            typo.contrast_normal
        };

        if ratio < required {
            issues.push(format!(
                "Text {} contrast ratio {:.2}:1 is below the required {}:1 (WCAG AA)",
                el.label(i),
                ratio,
                required
            ));
        }
    }

    Ok(Outcome::from_issues(issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CopyLexicon, EngineConfig};
    use crate::document::{
        CreativeDocument, CreativeFormat, Element, TagElement, ValueTileElement,
    };

    fn text(content: &str, size: f64, fill: &str) -> ElementKind {
        ElementKind::Text(TextElement {
            text: content.to_string(),
            font_size: size,
            font_family: "Arial".to_string(),
            fill: fill.to_string(),
            font_weight: None,
        })
    }

    fn tile(tile_type: TileType, price: Option<&str>, regular: Option<&str>) -> ElementKind {
        ElementKind::ValueTile(ValueTileElement {
            tile_type,
            price: price.map(String::from),
            regular_price: regular.map(String::from),
        })
    }

    fn tag(content: &str) -> ElementKind {
        ElementKind::Tag(TagElement { text: content.to_string() })
    }

    fn eval(doc: &CreativeDocument, rule: super::super::EvaluateFn) -> Result<Outcome, RuleFault> {
        let config = EngineConfig::default();
        let lexicon: CopyLexicon = config.copy.compile().unwrap();
        let ctx = RuleContext::new(doc, &config, &lexicon);
        rule(&ctx)
    }

    fn square() -> CreativeDocument {
        CreativeDocument::new(CreativeFormat::Square)
    }

    #[test]
    fn test_value_tile_prices() {
        let mut doc = square();
        doc.elements.push(Element::new(tile(TileType::New, None, None), 20.0, 20.0, 100.0, 100.0));
        assert_eq!(eval(&doc, value_tiles).unwrap(), Outcome::Pass);

        doc.elements.push(Element::new(tile(TileType::Clubcard, Some("£2"), None), 500.0, 20.0, 100.0, 100.0));
        match eval(&doc, value_tiles).unwrap() {
            Outcome::Fail(message) => assert!(message.contains("regular price")),
            Outcome::Pass => panic!("missing regular price not flagged"),
        }
    }

    #[test]
    fn test_value_tile_overlap_with_tag() {
        let mut doc = square();
        doc.elements.push(Element::new(tile(TileType::White, Some("£1"), None), 0.0, 900.0, 300.0, 150.0));
        doc.elements.push(Element::new(tag("Only at Tesco"), 100.0, 1000.0, 300.0, 40.0).with_id("tag"));
        match eval(&doc, value_tiles).unwrap() {
            Outcome::Fail(message) => assert!(message.contains("'tag'")),
            Outcome::Pass => panic!("overlap not flagged"),
        }
    }

    #[test]
    fn test_cta_length() {
        let mut doc = square();
        doc.elements.push(Element::new(text("Shop now", 30.0, "#000000"), 0.0, 0.0, 10.0, 10.0));
        assert_eq!(eval(&doc, call_to_action).unwrap(), Outcome::Pass);

        doc.elements.push(Element::new(
            text("Shop now for the very best picnic range of the whole summer", 30.0, "#000000"),
            0.0,
            0.0,
            10.0,
            10.0,
        ));
        assert!(matches!(eval(&doc, call_to_action).unwrap(), Outcome::Fail(_)));
    }

    #[test]
    fn test_cta_length_ignores_padding() {
        let padded = format!("   {}   ", "Shop now for fresh strawberries today");
        let mut doc = square();
        doc.elements.push(Element::new(text(&padded, 30.0, "#000000"), 0.0, 0.0, 10.0, 10.0));
        assert_eq!(eval(&doc, call_to_action).unwrap(), Outcome::Pass);

        doc.elements.push(Element::new(tag("Buy now and collect your picnic hamper in store"), 0.0, 0.0, 10.0, 10.0));
        match eval(&doc, call_to_action).unwrap() {
            Outcome::Fail(message) => assert!(message.contains("maximum is 40")),
            Outcome::Pass => panic!("long tag CTA passed"),
        }
    }

    #[test]
    fn test_tag_position() {
        let mut doc = square();
        doc.elements.push(Element::new(tag("Available at Tesco"), 0.0, 980.0, 300.0, 40.0));
        assert_eq!(eval(&doc, tag_position).unwrap(), Outcome::Pass);

        doc.elements.push(Element::new(tag("Available at Tesco"), 0.0, 400.0, 300.0, 40.0));
        assert!(matches!(eval(&doc, tag_position).unwrap(), Outcome::Fail(_)));
    }

    #[test]
    fn test_font_size_legal_copy() {
        let legal = "Available while stocks last in participating larger stores across the UK only";
        let mut doc = square();
        doc.elements.push(Element::new(text(legal, 16.0, "#000000"), 0.0, 100.0, 900.0, 40.0));
        assert_eq!(eval(&doc, minimum_font_size).unwrap(), Outcome::Pass);

        doc.elements[0].y = 950.0;
        assert!(matches!(eval(&doc, minimum_font_size).unwrap(), Outcome::Fail(_)));

        doc.elements[0].kind = text(legal, 18.0, "#000000");
        assert_eq!(eval(&doc, minimum_font_size).unwrap(), Outcome::Pass);

        doc.elements.push(Element::new(text("Hi", 12.0, "#000000"), 0.0, 0.0, 10.0, 10.0));
        assert!(matches!(eval(&doc, minimum_font_size).unwrap(), Outcome::Fail(_)));
    }

    #[test]
    fn test_contrast_thresholds_by_size() {
        // #8A8A8A on white is about 3.45:1.
        let mut doc = square();
        doc.elements.push(Element::new(text("Big", 24.0, "#8A8A8A"), 0.0, 0.0, 10.0, 10.0));
        assert_eq!(eval(&doc, text_contrast).unwrap(), Outcome::Pass);

        doc.elements[0].kind = text("Small", 16.0, "#8A8A8A");
        assert!(matches!(eval(&doc, text_contrast).unwrap(), Outcome::Fail(_)));
    }

    #[test]
    fn test_bold_18_counts_as_large() {
        let mut doc = square();
        let mut kind = text("Bold", 18.0, "#8A8A8A");
        if let ElementKind::Text(t) = &mut kind {
            t.font_weight = Some("bold".to_string());
        }
        doc.elements.push(Element::new(kind, 0.0, 0.0, 10.0, 10.0));
        assert_eq!(eval(&doc, text_contrast).unwrap(), Outcome::Pass);
    }

    #[test]
    fn test_unreadable_fill_is_a_fault() {
        let mut doc = square();
        doc.elements.push(Element::new(text("Hi", 30.0, "tomato"), 0.0, 0.0, 10.0, 10.0));
        assert!(matches!(eval(&doc, text_contrast), Err(RuleFault::Color { .. })));
    }
}

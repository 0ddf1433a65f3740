//! Media, alcohol and packshot rules.

use super::format::{describe_violation, stories_safe_zone};
use super::{Outcome, RuleContext, RuleFault};
use crate::contrast::{contrast_ratio, Color};
use crate::document::{CreativeDocument, Element, ElementKind, ImageRole, Placement};
use crate::geometry::rects_overlap;

/// Rule 15: people in images need an explicit confirmation from the user.
pub fn photography_of_people(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    if ctx.doc.has_people_in_images && !ctx.doc.people_confirmed {
        return Ok(Outcome::Fail(
            "Image contains people. Confirm usage rights are cleared and they are integral to the campaign"
                .to_string(),
        ));
    }
    Ok(Outcome::Pass)
}

/// Only pure black or pure white lock-ups are allowed.
fn lockup_color(value: &str) -> Option<Color> {
    value
        .parse::<Color>()
        .ok()
        .filter(|c| *c == Color::BLACK || *c == Color::WHITE)
}

/// Rule 16: the first `drinkaware` element must be black or white, tall enough
/// for the placement and legible against the background.
pub fn drinkaware_lockup(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let doc = ctx.doc;
    let limits = &ctx.config.drinkaware;

    let Some((index, element, lockup)) = doc
        .elements
        .iter()
        .enumerate()
        .find_map(|(i, el)| match &el.kind {
            ElementKind::Drinkaware(d) => Some((i, el, d)),
            _ => None,
        })
    else {
        return Ok(Outcome::Fail(
            "Alcohol campaign is missing the Drinkaware lock-up".to_string(),
        ));
    };

    let mut issues = vec![];

    let min_height = match doc.placement {
        Placement::Says => limits.says_min_height,
        Placement::Social => limits.min_height,
    };
    if element.height < min_height {
        issues.push(format!(
            "Drinkaware lock-up {} must be at least {}px high, found {}px",
            element.label(index),
            min_height,
            element.height
        ));
    }

    match lockup_color(&lockup.color) {
        None => issues.push(format!(
            "Drinkaware lock-up {} must be all-black or all-white",
            element.label(index)
        )),
        Some(color) => {
            let background: Color = doc.background_color.parse().map_err(|source| {
                RuleFault::Color {
                    element: "background".to_string(),
                    source,
                }
            })?;
            let ratio = contrast_ratio(&color, &background);
            if ratio < limits.min_contrast {
                issues.push(format!(
                    "Drinkaware lock-up {} contrast {:.2}:1 against the background is below {}:1",
                    element.label(index),
                    ratio,
                    limits.min_contrast
                ));
            }
        }
    }

    Ok(Outcome::from_issues(issues))
}

/// The product image the creative is built around.
///
/// An image explicitly tagged `packshot` wins; otherwise the lowest image in
/// z-order that is not a logo or background.
pub fn primary_packshot(doc: &CreativeDocument) -> Option<(usize, &Element)> {
    let images: Vec<(usize, &Element, Option<ImageRole>)> = doc
        .z_order()
        .into_iter()
        .filter_map(|i| match &doc.elements[i].kind {
            ElementKind::Image(img) => Some((i, &doc.elements[i], img.role)),
            _ => None,
        })
        .collect();

    images
        .iter()
        .find(|(_, _, role)| *role == Some(ImageRole::Packshot))
        .or_else(|| {
            images
                .iter()
                .find(|(_, _, role)| !matches!(role, Some(ImageRole::Logo | ImageRole::Background)))
        })
        .map(|(i, el, _)| (*i, *el))
}

/// Rule 17: value tiles and tags must not cover the packshot.
pub fn packshot_positioning(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let Some((index, packshot)) = primary_packshot(ctx.doc) else {
        return Ok(Outcome::Pass);
    };

    let issues = ctx
        .doc
        .elements
        .iter()
        .enumerate()
        .filter(|(_, el)| el.is_value_tile() || el.is_tag())
        .filter(|(_, el)| rects_overlap(&packshot.rect(), &el.rect()))
        .map(|(j, el)| {
            format!(
                "Packshot {} is overlapped by {} {}",
                packshot.label(index),
                el.type_name(),
                el.label(j)
            )
        })
        .collect();

    Ok(Outcome::from_issues(issues))
}

/// Rule 18: the packshot must sit wholly inside the Stories safe zone.
pub fn packshot_safe_zone(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let Some((index, packshot)) = primary_packshot(ctx.doc) else {
        return Ok(Outcome::Pass);
    };

    let zone = stories_safe_zone(&ctx.config.layout);
    let (canvas_w, canvas_h) = ctx.doc.canvas_size();
    let rect = packshot.rect();

    if zone.contains(&rect, canvas_w, canvas_h) {
        Ok(Outcome::Pass)
    } else {
        Ok(Outcome::Fail(format!(
            "Packshot {} {}",
            packshot.label(index),
            describe_violation(&rect, &zone, canvas_h)
        )))
    }
}

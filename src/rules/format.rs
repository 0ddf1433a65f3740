//! Format rule: the 9:16 Stories safe zone.

use super::{Outcome, RuleContext, RuleFault};
use crate::config::LayoutThresholds;
use crate::geometry::{Rect, SafeZone};

/// Stories overlays cover the top and bottom of the frame; left and right are free.
pub fn stories_safe_zone(layout: &LayoutThresholds) -> SafeZone {
    SafeZone {
        top: layout.stories_safe_top,
        bottom: layout.stories_safe_bottom,
        left: 0.0,
        right: 0.0,
    }
}

/// Which edge of the zone a rect breaks, for messages.
pub(crate) fn describe_violation(rect: &Rect, zone: &SafeZone, canvas_h: f64) -> String {
    if rect.is_degenerate() {
        "has invalid dimensions".to_string()
    } else if rect.y < zone.top {
        format!("enters the top safe zone ({}px)", zone.top)
    } else if rect.bottom() > canvas_h - zone.bottom {
        format!("enters the bottom safe zone ({}px)", zone.bottom)
    } else {
        "extends past the canvas edge".to_string()
    }
}

/// Rule 12: every element must sit inside the Stories safe zone.
pub fn social_safe_zone(ctx: &RuleContext<'_>) -> Result<Outcome, RuleFault> {
    let zone = stories_safe_zone(&ctx.config.layout);
    let (canvas_w, canvas_h) = ctx.doc.canvas_size();

    let issues = ctx
        .doc
        .elements
        .iter()
        .enumerate()
        .filter(|(_, el)| !zone.contains(&el.rect(), canvas_w, canvas_h))
        .map(|(i, el)| {
            format!(
                "Element {} {}",
                el.label(i),
                describe_violation(&el.rect(), &zone, canvas_h)
            )
        })
        .collect();

    Ok(Outcome::from_issues(issues))
}

//! Tea bank and tea box labels.

use log::debug;

use super::geometry::{RuleSpan, TeaBankGeometry, TeaBoxGeometry};
use super::{draw_brand, draw_centered, CREAM, ORANGE, RULE};
use crate::assets::LabelTemplate;
use crate::canvas::{draw_lines, Align, PageSurface, Placement, RenderError, Rule, TextStyle};
use crate::fonts::{FontCatalog, FontWeight};
use crate::layout::{fit_above_line, fit_text};
use crate::records::TeaRecord;
use crate::text::{format_price, PriceTier};

fn horizontal_rule(span: RuleSpan, page_width: f64, width: f64) -> Rule {
    Rule {
        from: (span.inset, span.y),
        to: (page_width - span.inset, span.y),
        width,
        color: RULE,
    }
}

/// Draws the square bank label for `record` on a new page.
///
/// From top to bottom: brand line, tea type resting on the upper rule, item name between the
/// rules, price, and price tier.
pub fn compose_tea_bank<S, C>(
    surface: &mut S,
    fonts: &C,
    template: &LabelTemplate,
    geometry: &TeaBankGeometry,
    record: &TeaRecord,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let width = template.width();
    surface.begin_page(template)?;
    draw_brand(surface, fonts, geometry.brand, width)?;

    let tier = PriceTier::from_price(record.price);
    draw_centered(
        surface,
        fonts,
        &geometry.tier,
        tier.label(),
        FontWeight::Medium,
        CREAM,
        width,
        Some(geometry.tier_max_height),
    )?;

    let guide = geometry.guide();
    let block = geometry
        .tea_type
        .block(&record.tea_type, FontWeight::Bold, width - geometry.tea_type_inset);
    let tea_type = fit_above_line(fonts, &block, &guide);
    let baseline = tea_type.last_baseline.unwrap_or_else(|| guide.floor());
    debug!(
        "Tea type {:?} at {}pt, {} line(s), last baseline {:.2}",
        record.tea_type,
        tea_type.size,
        tea_type.lines.len(),
        baseline
    );
    draw_lines(
        surface,
        fonts,
        &tea_type,
        &TextStyle::new(FontWeight::Bold, ORANGE, block.line_height),
        Placement::above_baseline(width / 2.0, baseline),
    )?;
    surface.draw_rule(&horizontal_rule(geometry.upper_rule, width, geometry.rule_width))?;

    let block = geometry
        .name
        .block(&record.name, FontWeight::Medium, width - geometry.name_inset)
        .with_max_height(geometry.name_height());
    let name = fit_text(fonts, &block);
    draw_lines(
        surface,
        fonts,
        &name,
        &TextStyle::new(FontWeight::Medium, CREAM, block.line_height),
        Placement::centered(width / 2.0, geometry.name_center()),
    )?;
    surface.draw_rule(&horizontal_rule(geometry.lower_rule, width, geometry.rule_width))?;

    draw_centered(
        surface,
        fonts,
        &geometry.price,
        &format_price(record.price),
        FontWeight::Bold,
        ORANGE,
        width,
        None,
    )
}

/// Draws the wide box label for `record` on a new page.
///
/// Two vertical rules split the page into columns: tea type on the left, name in the middle,
/// price and tier on the right.
pub fn compose_tea_box<S, C>(
    surface: &mut S,
    fonts: &C,
    template: &LabelTemplate,
    geometry: &TeaBoxGeometry,
    record: &TeaRecord,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let (width, height) = (template.width(), template.height());
    surface.begin_page(template)?;

    for x in geometry.column_rules {
        surface.draw_rule(&Rule {
            from: (x, geometry.rule_margin),
            to: (x, height - geometry.rule_margin),
            width: geometry.rule_width,
            color: RULE,
        })?;
    }

    let [(left_x0, left_x1), (mid_x0, mid_x1), (right_x0, right_x1)] = geometry.columns(width);

    let block = geometry
        .tea_type
        .block(&record.tea_type, FontWeight::Bold, left_x1 - left_x0);
    draw_lines(
        surface,
        fonts,
        &fit_text(fonts, &block),
        &TextStyle::new(FontWeight::Bold, ORANGE, block.line_height),
        Placement::in_range(Align::Left, left_x0, left_x1, height / 2.0),
    )?;

    let block = geometry
        .name
        .block(&record.name, FontWeight::Medium, mid_x1 - mid_x0);
    draw_lines(
        surface,
        fonts,
        &fit_text(fonts, &block),
        &TextStyle::new(FontWeight::Medium, CREAM, block.line_height),
        Placement::in_range(Align::Center, mid_x0, mid_x1, height / 2.0 + geometry.name_offset_y),
    )?;

    let price = format_price(record.price);
    let block = geometry
        .price
        .block(&price, FontWeight::Bold, right_x1 - right_x0);
    draw_lines(
        surface,
        fonts,
        &fit_text(fonts, &block),
        &TextStyle::new(FontWeight::Bold, ORANGE, block.line_height),
        Placement::in_range(Align::Right, right_x0, right_x1, geometry.price_y),
    )?;

    let tier = PriceTier::from_price(record.price);
    let block = geometry
        .tier
        .block(tier.label(), FontWeight::Medium, right_x1 - right_x0);
    draw_lines(
        surface,
        fonts,
        &fit_text(fonts, &block),
        &TextStyle::new(FontWeight::Medium, CREAM, block.line_height),
        Placement::in_range(Align::Right, right_x0, right_x1, geometry.tier_y),
    )
}

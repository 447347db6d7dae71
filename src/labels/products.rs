//! Two-sided product labels.

use super::geometry::ProductsGeometry;
use super::{draw_brand, draw_centered, CREAM, ORANGE};
use crate::assets::LabelTemplate;
use crate::canvas::{PageSurface, RenderError};
use crate::fonts::{FontCatalog, FontWeight};
use crate::records::ProductRecord;
use crate::text::{format_price, hours_phrase, sentence_case};

/// Draws the front and back of a product label as two pages sharing one background.
///
/// The front carries the sentence-cased name and the price; the back carries the shelf-life
/// heading and the hour count with an agreeing noun.
pub fn compose_product<S, C>(
    surface: &mut S,
    fonts: &C,
    template: &LabelTemplate,
    geometry: &ProductsGeometry,
    record: &ProductRecord,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let width = template.width();
    let name = sentence_case(&record.name);

    surface.begin_page(template)?;
    draw_brand(surface, fonts, geometry.brand, width)?;
    draw_centered(surface, fonts, &geometry.name, &name, FontWeight::Bold, CREAM, width, None)?;
    draw_centered(
        surface,
        fonts,
        &geometry.price,
        &format_price(record.price),
        FontWeight::SemiBold,
        ORANGE,
        width,
        None,
    )?;

    surface.begin_page(template)?;
    draw_brand(surface, fonts, geometry.brand, width)?;
    draw_centered(
        surface,
        fonts,
        &geometry.title,
        &geometry.back_title,
        FontWeight::Bold,
        CREAM,
        width,
        None,
    )?;
    draw_centered(
        surface,
        fonts,
        &geometry.shelf_life,
        &hours_phrase(record.hours),
        FontWeight::SemiBold,
        ORANGE,
        width,
        None,
    )
}

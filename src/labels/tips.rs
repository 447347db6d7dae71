//! Two-sided tip-jar cards.

use image::ImageFormat;

use super::geometry::TipsGeometry;
use super::{CREAM, ORANGE};
use crate::assets::LabelTemplate;
use crate::canvas::{draw_lines, ImagePlacement, PageSurface, Placement, RenderError, TextStyle};
use crate::fonts::{FontCatalog, FontWeight};
use crate::layout::fit_text;
use crate::qr;
use crate::records::TipsRecord;

/// Draws the card front (name, goal and QR code) and the plain back.
///
/// The QR payload is `record.link` exactly as validated.
pub fn compose_tips<S, C>(
    surface: &mut S,
    fonts: &C,
    front: &LabelTemplate,
    back: &LabelTemplate,
    geometry: &TipsGeometry,
    record: &TipsRecord,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let width = front.width();
    surface.begin_page(front)?;

    let name_block = geometry
        .name
        .block(&record.name, FontWeight::Bold, width - geometry.name_inset);
    let goal_block = geometry
        .goal
        .block(&record.goal, FontWeight::Regular, width - geometry.goal_inset);
    let name = fit_text(fonts, &name_block);
    let goal = fit_text(fonts, &goal_block);

    let (name_center, goal_center) = geometry.stack(
        name.block_height(name_block.line_height),
        name.lines.len(),
        goal.block_height(goal_block.line_height),
        goal.lines.len(),
    );

    draw_lines(
        surface,
        fonts,
        &name,
        &TextStyle::new(FontWeight::Bold, CREAM, name_block.line_height),
        Placement::centered(width / 2.0, name_center),
    )?;
    draw_lines(
        surface,
        fonts,
        &goal,
        &TextStyle::new(FontWeight::Regular, ORANGE, goal_block.line_height),
        Placement::centered(width / 2.0, goal_center),
    )?;

    let qr_box = geometry.qr;
    let png = qr::generate(&record.link, qr_box.qr_size)?;
    let code = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
    let (x, y) = qr_box.origin();
    let side = f64::from(qr_box.qr_size);
    surface.draw_image(
        &code,
        ImagePlacement {
            x,
            y,
            width: side,
            height: side,
        },
    )?;

    surface.begin_page(back)
}

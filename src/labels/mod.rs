//! Label document builders, one pipeline per label family.
//!
//! Each family has a `compose_*` function that draws onto any [`PageSurface`] with any
//! [`FontCatalog`], and a `build_*` function that runs it against a [`PdfSurface`] with the
//! shared [`Resources`] and returns serialized bytes.  Builds read nothing but the record and the
//! resources, so they may run concurrently.

mod geometry;
mod products;
mod tea;
mod tips;

pub use geometry::{
    BrandMark, CenteredSlot, LabelGeometry, ProductsGeometry, QrBox, RuleSpan, TeaBankGeometry,
    TeaBoxGeometry, TextSlot, TipsGeometry,
};
pub use products::compose_product;
pub use tea::{compose_tea_bank, compose_tea_box};
pub use tips::compose_tips;

use log::debug;

use crate::assets::{Resources, TemplateKind};
use crate::canvas::{
    draw_lines, draw_segments, Color, PageSurface, PdfSurface, Placement, RenderError, TextStyle,
};
use crate::fonts::{FontCatalog, FontWeight};
use crate::layout::fit_text;
use crate::records::{DomainRecord, ProductRecord, TeaRecord, TipsRecord};

/// Accent color: prices, tea types, the brand's initials.
pub const ORANGE: Color = Color::from_hex(0xF6763C);

/// Main text color.
pub const CREAM: Color = Color::from_hex(0xF4EFE8);

/// Stroke color of printed rules.
pub const RULE: Color = Color::from_hex(0xC1BAB1);

/// The brand line, as `(text, color)` segments drawn edge to edge.
pub const BRAND_SEGMENTS: [(&str, Color); 5] = [
    ("Ч", ORANGE),
    ("АЙНАЯ", CREAM),
    (" ", CREAM),
    ("И", ORANGE),
    ("СТОРИЯ", CREAM),
];

fn draw_brand<S, C>(surface: &mut S, fonts: &C, brand: BrandMark, page_width: f64) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    draw_segments(
        surface,
        fonts,
        &BRAND_SEGMENTS,
        FontWeight::Medium,
        brand.size,
        page_width / 2.0,
        brand.baseline,
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_centered<S, C>(
    surface: &mut S,
    fonts: &C,
    slot: &CenteredSlot,
    text: &str,
    weight: FontWeight,
    color: Color,
    page_width: f64,
    max_height: Option<f64>,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let block = slot
        .text
        .block(text, weight, page_width - slot.inset)
        .with_max_height(max_height);
    let layout = fit_text(fonts, &block);
    draw_lines(
        surface,
        fonts,
        &layout,
        &TextStyle::new(weight, color, block.line_height),
        Placement::centered(page_width / 2.0, slot.center_y),
    )
}

/// The two independent documents printed for one tea item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeaDocuments {
    /// Single-page bank label.
    pub bank: Vec<u8>,
    /// Single-page box label.
    pub box_label: Vec<u8>,
}

/// Builds the bank and box labels for `record`.
pub fn build_tea(record: &TeaRecord, resources: &Resources) -> Result<TeaDocuments, RenderError> {
    let fonts = resources.fonts();
    let templates = resources.templates();
    let geometry = resources.geometry();

    let mut bank = PdfSurface::new(format!("{} (bank)", record.name), fonts);
    compose_tea_bank(
        &mut bank,
        fonts,
        templates.get(TemplateKind::TeaBank),
        &geometry.tea_bank,
        record,
    )?;

    let mut box_label = PdfSurface::new(format!("{} (box)", record.name), fonts);
    compose_tea_box(
        &mut box_label,
        fonts,
        templates.get(TemplateKind::TeaBox),
        &geometry.tea_box,
        record,
    )?;

    debug!("Built tea labels for {:?}", record.name);
    Ok(TeaDocuments {
        bank: bank.finish()?,
        box_label: box_label.finish()?,
    })
}

/// Builds the two-page product label for `record`.
pub fn build_product(record: &ProductRecord, resources: &Resources) -> Result<Vec<u8>, RenderError> {
    let fonts = resources.fonts();
    let mut surface = PdfSurface::new(record.name.clone(), fonts);
    compose_product(
        &mut surface,
        fonts,
        resources.templates().get(TemplateKind::Products),
        &resources.geometry().products,
        record,
    )?;
    debug!("Built product label for {:?}", record.name);
    surface.finish()
}

/// Builds the two-page tips card for `record`.
pub fn build_tips(record: &TipsRecord, resources: &Resources) -> Result<Vec<u8>, RenderError> {
    let fonts = resources.fonts();
    let templates = resources.templates();
    let mut surface = PdfSurface::new(format!("Tips: {}", record.name), fonts);
    compose_tips(
        &mut surface,
        fonts,
        templates.get(TemplateKind::TipsFront),
        templates.get(TemplateKind::TipsBack),
        &resources.geometry().tips,
        record,
    )?;
    debug!("Built tips card for {:?}", record.name);
    surface.finish()
}

/// Builds every document for `record`: bank then box for tea, one document otherwise.
pub fn build(record: &DomainRecord, resources: &Resources) -> Result<Vec<Vec<u8>>, RenderError> {
    match record {
        DomainRecord::Tea(tea) => {
            let TeaDocuments { bank, box_label } = build_tea(tea, resources)?;
            Ok(vec![bank, box_label])
        }
        DomainRecord::Product(product) => Ok(vec![build_product(product, resources)?]),
        DomainRecord::Tips(tips) => Ok(vec![build_tips(tips, resources)?]),
    }
}

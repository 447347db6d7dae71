//! [`PageSurface`] backed by `printpdf`.

use std::io::{BufWriter, Cursor};

use image::{DynamicImage, GenericImageView};
use log::debug;
use printpdf::{
    Color as PdfColor, Image, IndirectFontRef, Line, LineCapStyle, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Pt, Rgb,
};

use super::{Color, ImagePlacement, PageSurface, RenderError, Rule, TextRun};
use crate::assets::LabelTemplate;
use crate::fonts::{FontSet, FontWeight};

const LAYER_NAME: &str = "Label";

/// Images are placed at 72 dpi so one pixel maps to one point before scaling.
const POINTS_PER_INCH: f64 = 72.0;

fn mm(points: f64) -> Mm {
    Mm::from(Pt(points))
}

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.unit_rgb();
    PdfColor::Rgb(Rgb::new(r, g, b, None))
}

struct OpenDocument {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: [Option<IndirectFontRef>; 4],
}

impl OpenDocument {
    fn font(&mut self, set: &FontSet, weight: FontWeight) -> Result<IndirectFontRef, RenderError> {
        let slot = &mut self.fonts[weight.index()];
        if let Some(font) = slot {
            return Ok(font.clone());
        }

        let program = Cursor::new(set.face(weight).bytes().to_vec());
        let font = self
            .document
            .add_external_font(program)
            .map_err(|err| RenderError::Pdf(format!("failed to embed {weight:?} font: {err:?}")))?;
        *slot = Some(font.clone());
        Ok(font)
    }
}

/// A PDF document under construction whose page sizes come from label templates.
///
/// Pages are created by [`PageSurface::begin_page`]; the document is serialized exactly once by
/// [`PdfSurface::finish`], which consumes the surface.
pub struct PdfSurface<'f> {
    title: String,
    fonts: &'f FontSet,
    open: Option<OpenDocument>,
    pages: usize,
}

impl<'f> PdfSurface<'f> {
    /// Creates an empty document titled `title` drawing with `fonts`.
    pub fn new(title: impl Into<String>, fonts: &'f FontSet) -> Self {
        Self {
            title: title.into(),
            fonts,
            open: None,
            pages: 0,
        }
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serializes the document.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let open = self.open.ok_or(RenderError::EmptyDocument)?;
        let mut writer = BufWriter::new(Vec::new());
        open.document
            .save(&mut writer)
            .map_err(|err| RenderError::Pdf(format!("{err:?}")))?;
        let bytes = writer
            .into_inner()
            .map_err(|err| RenderError::Io(err.into_error()))?;
        debug!("Serialized {:?}: {} page(s), {} bytes", self.title, self.pages, bytes.len());
        Ok(bytes)
    }

    fn current(&mut self) -> Result<&mut OpenDocument, RenderError> {
        self.open.as_mut().ok_or(RenderError::NoActivePage)
    }
}

fn place_image(layer: &PdfLayerReference, image: &DynamicImage, placement: ImagePlacement) {
    let (px_width, px_height) = image.dimensions();
    let scale_x = placement.width / f64::from(px_width.max(1));
    let scale_y = placement.height / f64::from(px_height.max(1));
    Image::from_dynamic_image(image).add_to_layer(
        layer.clone(),
        Some(mm(placement.x)),
        Some(mm(placement.y)),
        None,
        Some(scale_x),
        Some(scale_y),
        Some(POINTS_PER_INCH),
    );
}

impl PageSurface for PdfSurface<'_> {
    fn begin_page(&mut self, template: &LabelTemplate) -> Result<(), RenderError> {
        let width = mm(template.width());
        let height = mm(template.height());

        match self.open.as_mut() {
            None => {
                let (document, page, layer) =
                    PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);
                let layer = document.get_page(page).get_layer(layer);
                self.open = Some(OpenDocument {
                    document,
                    layer,
                    fonts: [None, None, None, None],
                });
            }
            Some(open) => {
                let (page, layer) = open.document.add_page(width, height, LAYER_NAME);
                open.layer = open.document.get_page(page).get_layer(layer);
            }
        }
        self.pages += 1;

        let open = self.current()?;
        place_image(
            &open.layer,
            template.background(),
            ImagePlacement {
                x: 0.0,
                y: 0.0,
                width: template.width(),
                height: template.height(),
            },
        );
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let open = self.current()?;
        let font = open.font(fonts, run.weight)?;
        open.layer.set_fill_color(pdf_color(run.color));
        open.layer
            .use_text(run.text, run.size, mm(run.x), mm(run.y), &font);
        Ok(())
    }

    fn draw_rule(&mut self, rule: &Rule) -> Result<(), RenderError> {
        let open = self.current()?;
        open.layer.set_outline_color(pdf_color(rule.color));
        open.layer.set_outline_thickness(rule.width);
        open.layer.set_line_cap_style(LineCapStyle::Round);
        open.layer.add_shape(Line {
            points: vec![
                (Point::new(mm(rule.from.0), mm(rule.from.1)), false),
                (Point::new(mm(rule.to.0), mm(rule.to.1)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &DynamicImage,
        placement: ImagePlacement,
    ) -> Result<(), RenderError> {
        let open = self.current()?;
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        place_image(&open.layer, &rgb, placement);
        Ok(())
    }
}

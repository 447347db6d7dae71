#![allow(dead_code)]

use image::DynamicImage;
use label_press::assets::{LabelTemplate, TemplateKind};
use label_press::canvas::{ImagePlacement, PageSurface, RenderError, Rule, TextRun};
use label_press::fonts::{FontCatalog, FontMetrics, FontWeight};

pub const ASCENT: f64 = 0.8;
pub const DESCENT: f64 = 0.2;

/// Fixed-pitch metrics: every character is `advance * size` wide.
pub struct FixedPitch {
    advance: f64,
}

impl FontMetrics for FixedPitch {
    fn ascent(&self, size: f64) -> f64 {
        size * ASCENT
    }

    fn descent(&self, size: f64) -> f64 {
        size * DESCENT
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * self.advance
    }
}

/// Heavier weights are wider, like the real family.
pub struct SyntheticFonts {
    faces: [FixedPitch; 4],
}

impl SyntheticFonts {
    pub fn new() -> Self {
        Self {
            faces: [
                FixedPitch { advance: 0.55 },
                FixedPitch { advance: 0.6 },
                FixedPitch { advance: 0.62 },
                FixedPitch { advance: 0.65 },
            ],
        }
    }
}

impl FontCatalog for SyntheticFonts {
    fn metrics(&self, weight: FontWeight) -> &dyn FontMetrics {
        let index = match weight {
            FontWeight::Regular => 0,
            FontWeight::Medium => 1,
            FontWeight::SemiBold => 2,
            FontWeight::Bold => 3,
        };
        &self.faces[index]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedText {
    pub page: usize,
    pub text: String,
    pub weight: FontWeight,
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedImage {
    pub page: usize,
    pub pixels: (u32, u32),
    pub placement: ImagePlacement,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSurface {
    pub pages: Vec<TemplateKind>,
    pub texts: Vec<RecordedText>,
    pub rules: Vec<(usize, Rule)>,
    pub images: Vec<RecordedImage>,
}

impl RecordingSurface {
    fn current(&self) -> Result<usize, RenderError> {
        self.pages
            .len()
            .checked_sub(1)
            .ok_or(RenderError::NoActivePage)
    }

    pub fn text(&self, text: &str) -> Option<&RecordedText> {
        self.texts.iter().find(|run| run.text == text)
    }

    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.texts
            .iter()
            .filter(|run| run.page == page)
            .map(|run| run.text.as_str())
            .collect()
    }
}

impl PageSurface for RecordingSurface {
    fn begin_page(&mut self, template: &LabelTemplate) -> Result<(), RenderError> {
        self.pages.push(template.kind());
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> Result<(), RenderError> {
        let page = self.current()?;
        self.texts.push(RecordedText {
            page,
            text: run.text.to_owned(),
            weight: run.weight,
            size: run.size,
            x: run.x,
            y: run.y,
        });
        Ok(())
    }

    fn draw_rule(&mut self, rule: &Rule) -> Result<(), RenderError> {
        let page = self.current()?;
        self.rules.push((page, *rule));
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &DynamicImage,
        placement: ImagePlacement,
    ) -> Result<(), RenderError> {
        use image::GenericImageView;

        let page = self.current()?;
        self.images.push(RecordedImage {
            page,
            pixels: image.dimensions(),
            placement,
        });
        Ok(())
    }
}

pub fn template(kind: TemplateKind) -> LabelTemplate {
    let (width, height) = match kind {
        TemplateKind::Products => (900, 650),
        TemplateKind::TeaBank => (1654, 1654),
        TemplateKind::TeaBox => (1890, 236),
        TemplateKind::TipsFront | TemplateKind::TipsBack => (650, 1000),
    };
    LabelTemplate::from_image(kind, DynamicImage::new_rgb8(width, height))
}

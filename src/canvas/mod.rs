//! Composition of fitted text, rules and images onto page surfaces.
//!
//! The compositor works against the [`PageSurface`] trait.  [`PdfSurface`] is the production
//! implementation; anything else that can place strings at absolute coordinates (a recorder in
//! tests, for instance) can stand in for it.

mod pdf;

pub use pdf::PdfSurface;

use std::fmt;

use image::DynamicImage;

use crate::assets::LabelTemplate;
use crate::fonts::{FontCatalog, FontWeight};
use crate::layout::FittedLayout;
use crate::qr::QrError;

/// An opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn unit_rgb(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

/// Horizontal alignment of a line inside its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Flush with the left edge.
    Left,
    /// Centered on the midpoint.
    #[default]
    Center,
    /// Flush with the right edge.
    Right,
}

/// Horizontal extent `[x0, x1]` a block is aligned within.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalRange {
    /// Left edge.
    pub x0: f64,
    /// Right edge.
    pub x1: f64,
}

impl HorizontalRange {
    /// Range between two edges.
    pub fn new(x0: f64, x1: f64) -> Self {
        Self { x0, x1 }
    }

    /// Degenerate range used for centering on a single coordinate.
    pub fn centered_at(x: f64) -> Self {
        Self { x0: x, x1: x }
    }

    /// Midpoint of the range.
    pub fn center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

/// How a block is positioned vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VerticalAnchor {
    /// The block is centered symmetrically around this coordinate.
    Center(f64),
    /// The last line's baseline sits on this coordinate.
    LastBaseline(f64),
}

/// Font, color and leading of a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font weight.
    pub weight: FontWeight,
    /// Fill color.
    pub color: Color,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f64,
}

impl TextStyle {
    /// Creates a style.
    pub fn new(weight: FontWeight, color: Color, line_height: f64) -> Self {
        Self {
            weight,
            color,
            line_height,
        }
    }
}

/// Where a block goes on the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Horizontal alignment.
    pub align: Align,
    /// Range the alignment refers to.
    pub range: HorizontalRange,
    /// Vertical anchor.
    pub anchor: VerticalAnchor,
}

impl Placement {
    /// Block centered on `(x, y)`.
    pub fn centered(x: f64, y: f64) -> Self {
        Self {
            align: Align::Center,
            range: HorizontalRange::centered_at(x),
            anchor: VerticalAnchor::Center(y),
        }
    }

    /// Block aligned inside `[x0, x1]` and centered on `y`.
    pub fn in_range(align: Align, x0: f64, x1: f64, y: f64) -> Self {
        Self {
            align,
            range: HorizontalRange::new(x0, x1),
            anchor: VerticalAnchor::Center(y),
        }
    }

    /// Block centered on `x` whose last baseline sits on `baseline`.
    pub fn above_baseline(x: f64, baseline: f64) -> Self {
        Self {
            align: Align::Center,
            range: HorizontalRange::centered_at(x),
            anchor: VerticalAnchor::LastBaseline(baseline),
        }
    }
}

/// A single string placed with its baseline origin at `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun<'a> {
    /// Text to draw.
    pub text: &'a str,
    /// Font weight.
    pub weight: FontWeight,
    /// Font size in points.
    pub size: f64,
    /// Fill color.
    pub color: Color,
    /// Left edge of the string.
    pub x: f64,
    /// Baseline.
    pub y: f64,
}

/// A straight stroked line with round caps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    /// Start point.
    pub from: (f64, f64),
    /// End point.
    pub to: (f64, f64),
    /// Stroke width in points.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

/// Rectangle an image is scaled into.  `(x, y)` is the bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Target width in points.
    pub width: f64,
    /// Target height in points.
    pub height: f64,
}

/// A sequence of pages that accepts absolutely positioned drawing operations.
pub trait PageSurface {
    /// Starts a new page sized and filled by `template`'s background.
    fn begin_page(&mut self, template: &LabelTemplate) -> Result<(), RenderError>;

    /// Draws one string on the current page.
    fn draw_text(&mut self, run: &TextRun<'_>) -> Result<(), RenderError>;

    /// Strokes a rule on the current page.
    fn draw_rule(&mut self, rule: &Rule) -> Result<(), RenderError>;

    /// Draws a raster scaled into `placement` on the current page.
    fn draw_image(
        &mut self,
        image: &DynamicImage,
        placement: ImagePlacement,
    ) -> Result<(), RenderError>;
}

/// Errors raised while composing or serializing a document.
#[derive(Debug)]
pub enum RenderError {
    /// A drawing call was made before any page was started.
    NoActivePage,
    /// The document was finished without pages.
    EmptyDocument,
    /// The PDF backend rejected an operation.
    Pdf(String),
    /// A raster could not be decoded or encoded.
    Image(image::ImageError),
    /// The QR payload could not be encoded.
    Qr(QrError),
    /// Writing the serialized document failed.
    Io(std::io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActivePage => write!(f, "drawing requested before a page was started"),
            Self::EmptyDocument => write!(f, "document has no pages"),
            Self::Pdf(message) => write!(f, "PDF backend error: {message}"),
            Self::Image(err) => write!(f, "image error: {err}"),
            Self::Qr(err) => write!(f, "QR error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Qr(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NoActivePage | Self::EmptyDocument | Self::Pdf(_) => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}

impl From<QrError> for RenderError {
    fn from(err: QrError) -> Self {
        Self::Qr(err)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Baselines of `line_count` lines at `size`, first line first.
///
/// Center-anchored blocks are symmetric around the anchor: the first baseline is
/// `center + block_height / 2 - size`.  Baseline-anchored blocks end on the anchor.  Consecutive
/// lines are `size * line_height` apart.
pub fn baselines(line_count: usize, size: f64, line_height: f64, anchor: VerticalAnchor) -> Vec<f64> {
    let step = size * line_height;
    let first = match anchor {
        VerticalAnchor::Center(center) => center + step * line_count as f64 / 2.0 - size,
        VerticalAnchor::LastBaseline(last) => last + line_count.saturating_sub(1) as f64 * step,
    };
    (0..line_count).map(|index| first - index as f64 * step).collect()
}

/// Left edge of a line of `width` aligned within `range`.
pub fn line_origin_x(align: Align, range: HorizontalRange, width: f64) -> f64 {
    match align {
        Align::Left => range.x0,
        Align::Center => range.center() - width / 2.0,
        Align::Right => range.x1 - width,
    }
}

/// Draws every line of `layout` with `style` at `placement`.
pub fn draw_lines<S, C>(
    surface: &mut S,
    fonts: &C,
    layout: &FittedLayout,
    style: &TextStyle,
    placement: Placement,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let metrics = fonts.metrics(style.weight);
    let size = layout.size_pt();
    let ys = baselines(layout.lines.len(), size, style.line_height, placement.anchor);

    for (line, y) in layout.lines.iter().zip(ys) {
        let width = metrics.text_width(line, size);
        surface.draw_text(&TextRun {
            text: line,
            weight: style.weight,
            size,
            color: style.color,
            x: line_origin_x(placement.align, placement.range, width),
            y,
        })?;
    }
    Ok(())
}

/// Draws differently colored segments as one line centered on `center_x`.
pub fn draw_segments<S, C>(
    surface: &mut S,
    fonts: &C,
    segments: &[(&str, Color)],
    weight: FontWeight,
    size: f64,
    center_x: f64,
    baseline: f64,
) -> Result<(), RenderError>
where
    S: PageSurface + ?Sized,
    C: FontCatalog + ?Sized,
{
    let metrics = fonts.metrics(weight);
    let widths: Vec<f64> = segments
        .iter()
        .map(|(text, _)| metrics.text_width(text, size))
        .collect();
    let mut x = center_x - widths.iter().sum::<f64>() / 2.0;

    for ((text, color), width) in segments.iter().zip(widths) {
        surface.draw_text(&TextRun {
            text,
            weight,
            size,
            color: *color,
            x,
            y: baseline,
        })?;
        x += width;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_split_into_channels() {
        assert_eq!(
            Color::from_hex(0xF6763C),
            Color {
                r: 0xF6,
                g: 0x76,
                b: 0x3C
            }
        );
    }

    #[test]
    fn centered_block_is_symmetric() {
        let ys = baselines(3, 10.0, 1.0, VerticalAnchor::Center(100.0));
        assert_eq!(ys, vec![105.0, 95.0, 85.0]);
        // The first line's em box starts half a block height above the center.
        assert!((ys[0] + 10.0 - 100.0 - 15.0).abs() < 1e-9);
    }

    #[test]
    fn baseline_anchor_ends_on_the_anchor() {
        let ys = baselines(2, 20.0, 1.05, VerticalAnchor::LastBaseline(300.0));
        assert_eq!(ys.len(), 2);
        assert!((ys[1] - 300.0).abs() < 1e-9);
        assert!((ys[0] - 321.0).abs() < 1e-9);
    }

    #[test]
    fn alignment_inside_range() {
        let range = HorizontalRange::new(100.0, 300.0);
        assert_eq!(line_origin_x(Align::Left, range, 50.0), 100.0);
        assert_eq!(line_origin_x(Align::Center, range, 50.0), 175.0);
        assert_eq!(line_origin_x(Align::Right, range, 50.0), 250.0);
    }
}

//! Styled QR code rasters for the tip-jar cards.
//!
//! Codes are always encoded at the highest error-correction level.  The styled renderer draws
//! rounded data modules and rounded finder eyes; when it cannot honour the requested size the
//! plain square renderer is used instead.  Both read the same module matrix, so the payload is
//! identical whichever path produced the image.

use std::fmt;
use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba, RgbaImage};
use log::warn;
use qrcode::{Color as Module, EcLevel, QrCode};

use crate::canvas::Color;

/// Module color of the printed code.
pub const QR_FOREGROUND: Color = Color::from_hex(0x231F20);

/// Background behind the printed code.
pub const QR_BACKGROUND: Color = Color::from_hex(0xFEF6E9);

/// Quiet zone width in modules.
const BORDER: u32 = 1;

/// Rounded modules collapse into blobs below this many pixels per module.
const MIN_STYLED_PITCH: u32 = 2;

/// Side of a finder pattern in modules.
const EYE_MODULES: usize = 7;

/// Errors raised while encoding or rasterizing a QR code.
#[derive(Debug)]
pub enum QrError {
    /// The payload does not fit any QR version at the required error-correction level.
    Encode(qrcode::types::QrError),
    /// The styled renderer cannot draw at the requested size.
    ModulesTooSmall {
        /// Requested output size.
        size_px: u32,
        /// Modules per side including the quiet zone.
        modules: u32,
    },
    /// PNG encoding failed.
    Png(image::ImageError),
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode QR payload: {err}"),
            Self::ModulesTooSmall { size_px, modules } => write!(
                f,
                "{size_px}px is too small for {modules} rounded modules"
            ),
            Self::Png(err) => write!(f, "failed to encode QR PNG: {err}"),
        }
    }
}

impl std::error::Error for QrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Png(err) => Some(err),
            Self::Encode(_) | Self::ModulesTooSmall { .. } => None,
        }
    }
}

impl From<qrcode::types::QrError> for QrError {
    fn from(err: qrcode::types::QrError) -> Self {
        Self::Encode(err)
    }
}

/// Encoded payload and its square module matrix.
#[derive(Clone)]
pub struct ModuleGrid {
    code: QrCode,
    width: usize,
    dark: Vec<bool>,
}

impl ModuleGrid {
    /// Encodes `data` verbatim at error-correction level H.
    pub fn encode(data: &str) -> Result<Self, QrError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|module| module == Module::Dark)
            .collect();
        Ok(Self { code, width, dark })
    }

    /// Modules per side, without the quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Modules per side including the quiet zone on both edges.
    pub fn framed_width(&self) -> u32 {
        self.width as u32 + 2 * BORDER
    }

    /// Whether the module at `(x, y)` is dark.  Coordinates outside the grid are light.
    pub fn is_dark(&self, x: i64, y: i64) -> bool {
        let width = self.width as i64;
        if x < 0 || y < 0 || x >= width || y >= width {
            return false;
        }
        self.dark[(y * width + x) as usize]
    }

    fn in_eye(&self, x: usize, y: usize) -> bool {
        let far = self.width - EYE_MODULES;
        (x < EYE_MODULES && y < EYE_MODULES)
            || (x >= far && y < EYE_MODULES)
            || (x < EYE_MODULES && y >= far)
    }

    fn eye_origins(&self) -> [(usize, usize); 3] {
        let far = self.width - EYE_MODULES;
        [(0, 0), (far, 0), (0, far)]
    }
}

impl fmt::Debug for ModuleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleGrid")
            .field("width", &self.width)
            .field("version", &self.code.version())
            .finish()
    }
}

/// Which renderer produced a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrStyle {
    /// Rounded modules and eyes.
    Styled,
    /// Square modules.
    Plain,
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 0xff])
}

/// Square modules, `pitch` pixels each, without a quiet zone.
pub fn render_plain(grid: &ModuleGrid, pitch: u32) -> RgbaImage {
    grid.code
        .render::<Rgba<u8>>()
        .quiet_zone(false)
        .module_dimensions(pitch, pitch)
        .dark_color(rgba(QR_FOREGROUND))
        .light_color(rgba(QR_BACKGROUND))
        .build()
}

/// Rounded modules and eyes, `pitch` pixels per module, without a quiet zone.
///
/// A data module's corner is rounded only where both neighbours on that corner are light, so
/// runs of dark modules stay connected.
pub fn render_styled(grid: &ModuleGrid, pitch: u32) -> RgbaImage {
    let side = grid.width() as u32 * pitch;
    let mut image = ImageBuffer::from_pixel(side, side, rgba(QR_BACKGROUND));
    let dark = rgba(QR_FOREGROUND);
    let light = rgba(QR_BACKGROUND);
    let radius = f64::from(pitch) / 2.0;
    let origin = |index: usize| index as u32 * pitch;

    for y in 0..grid.width() {
        for x in 0..grid.width() {
            if grid.in_eye(x, y) || !grid.is_dark(x as i64, y as i64) {
                continue;
            }
            let (xi, yi) = (x as i64, y as i64);
            let corners = [
                !grid.is_dark(xi - 1, yi) && !grid.is_dark(xi, yi - 1),
                !grid.is_dark(xi + 1, yi) && !grid.is_dark(xi, yi - 1),
                !grid.is_dark(xi - 1, yi) && !grid.is_dark(xi, yi + 1),
                !grid.is_dark(xi + 1, yi) && !grid.is_dark(xi, yi + 1),
            ];
            fill_module(&mut image, origin(x), origin(y), pitch, corners, dark);
        }
    }

    let outer = EYE_MODULES as u32 * pitch;
    for (ex, ey) in grid.eye_origins() {
        let (x0, y0) = (origin(ex), origin(ey));
        fill_rounded_rect(&mut image, x0, y0, outer, outer, f64::from(pitch), dark);
        fill_rounded_rect(
            &mut image,
            x0 + pitch,
            y0 + pitch,
            outer - 2 * pitch,
            outer - 2 * pitch,
            radius,
            light,
        );
        fill_rounded_rect(
            &mut image,
            x0 + 2 * pitch,
            y0 + 2 * pitch,
            outer - 4 * pitch,
            outer - 4 * pitch,
            radius,
            dark,
        );
    }
    image
}

fn fill_module(image: &mut RgbaImage, x0: u32, y0: u32, pitch: u32, rounded: [bool; 4], color: Rgba<u8>) {
    let size = f64::from(pitch);
    let radius = size / 2.0;
    for dy in 0..pitch {
        for dx in 0..pitch {
            let px = f64::from(dx) + 0.5;
            let py = f64::from(dy) + 0.5;
            let corner = match (px < radius, py < radius) {
                (true, true) => 0,
                (false, true) => 1,
                (true, false) => 2,
                (false, false) => 3,
            };
            if rounded[corner] {
                let cx = if px < radius { radius } else { size - radius };
                let cy = if py < radius { radius } else { size - radius };
                if outside_corner(px, py, cx, cy, radius, size) {
                    continue;
                }
            }
            image.put_pixel(x0 + dx, y0 + dy, color);
        }
    }
}

fn outside_corner(px: f64, py: f64, cx: f64, cy: f64, radius: f64, size: f64) -> bool {
    let in_corner_x = px < radius || px > size - radius;
    let in_corner_y = py < radius || py > size - radius;
    in_corner_x && in_corner_y && (px - cx).powi(2) + (py - cy).powi(2) > radius * radius
}

fn fill_rounded_rect(
    image: &mut RgbaImage,
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    radius: f64,
    color: Rgba<u8>,
) {
    let (w, h) = (f64::from(width), f64::from(height));
    for dy in 0..height {
        for dx in 0..width {
            let px = f64::from(dx) + 0.5;
            let py = f64::from(dy) + 0.5;
            let cx = px.clamp(radius, (w - radius).max(radius));
            let cy = py.clamp(radius, (h - radius).max(radius));
            if (px - cx).powi(2) + (py - cy).powi(2) > radius * radius {
                continue;
            }
            image.put_pixel(x0 + dx, y0 + dy, color);
        }
    }
}

/// Centres `code` on a `side` square of background, which leaves at least the quiet zone
/// around it when the pitch was derived from [`ModuleGrid::framed_width`].
fn frame(code: &RgbaImage, side: u32) -> RgbaImage {
    let mut canvas = ImageBuffer::from_pixel(side, side, rgba(QR_BACKGROUND));
    let offset = side.saturating_sub(code.width()) / 2;
    imageops::replace(&mut canvas, code, offset, offset);
    canvas
}

/// Whole pixels per module that fit `size_px` together with the quiet zone.
fn pitch_for(grid: &ModuleGrid, size_px: u32) -> u32 {
    size_px / grid.framed_width()
}

fn styled_at(grid: &ModuleGrid, size_px: u32) -> Result<RgbaImage, QrError> {
    let pitch = pitch_for(grid, size_px);
    if pitch < MIN_STYLED_PITCH {
        return Err(QrError::ModulesTooSmall {
            size_px,
            modules: grid.framed_width(),
        });
    }
    Ok(frame(&render_styled(grid, pitch), size_px))
}

fn plain_at(grid: &ModuleGrid, size_px: u32) -> RgbaImage {
    let pitch = pitch_for(grid, size_px);
    if pitch >= 1 {
        return frame(&render_plain(grid, pitch), size_px);
    }
    warn!(
        "{size_px}px cannot hold {} whole modules; the QR code is downscaled",
        grid.framed_width()
    );
    let full = frame(&render_plain(grid, 1), grid.framed_width());
    imageops::resize(&full, size_px, size_px, FilterType::Nearest)
}

/// Encodes `url` and returns a `size_px` square raster plus the renderer that drew it.
///
/// Every module is drawn with the same whole number of pixels and the code is centred, so the
/// raster decodes at any size that holds at least one pixel per module.
pub fn generate_image(url: &str, size_px: u32) -> Result<(RgbaImage, QrStyle), QrError> {
    let grid = ModuleGrid::encode(url)?;
    match styled_at(&grid, size_px) {
        Ok(raster) => Ok((raster, QrStyle::Styled)),
        Err(err) => {
            warn!("Styled QR rendering unavailable ({err}); using square modules");
            Ok((plain_at(&grid, size_px), QrStyle::Plain))
        }
    }
}

/// Encodes `url` into a `size_px` square PNG.
pub fn generate(url: &str, size_px: u32) -> Result<Vec<u8>, QrError> {
    let (raster, _) = generate_image(url, size_px)?;
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(raster)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(QrError::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://netmonet.co/tip/123456?o=1";

    fn assert_matches_grid(image: &RgbaImage, grid: &ModuleGrid, pitch: u32, offset: u32) {
        for y in 0..grid.width() {
            for x in 0..grid.width() {
                let px = offset + x as u32 * pitch + pitch / 2;
                let py = offset + y as u32 * pitch + pitch / 2;
                assert_eq!(
                    *image.get_pixel(px, py) == rgba(QR_FOREGROUND),
                    grid.is_dark(x as i64, y as i64),
                    "module ({x}, {y}) differs"
                );
            }
        }
    }

    fn decode(png: &[u8]) -> Vec<String> {
        let luma = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .expect("valid png")
            .to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width() as usize,
            luma.height() as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| grid.decode().ok())
            .map(|(_, content)| content)
            .collect()
    }

    fn png(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("png encodes");
        bytes
    }

    fn link_of_length(len: usize) -> String {
        let base = "https://pay.example/t/";
        format!("{base}{}", "a1B2c3".chars().cycle().take(len - base.len()).collect::<String>())
    }

    #[test]
    fn styled_and_plain_carry_the_same_modules() {
        let grid = ModuleGrid::encode(LINK).expect("encodes");
        assert_matches_grid(&render_styled(&grid, 10), &grid, 10, 0);
        assert_matches_grid(&render_plain(&grid, 10), &grid, 10, 0);
    }

    #[test]
    fn card_raster_uses_whole_pixel_modules() {
        let grid = ModuleGrid::encode(LINK).expect("encodes");
        let pitch = pitch_for(&grid, 180);
        let offset = (180 - grid.width() as u32 * pitch) / 2;
        assert!(offset >= pitch, "quiet zone narrower than a module");

        let (image, style) = generate_image(LINK, 180).expect("encodes");
        assert_eq!(style, QrStyle::Styled);
        assert_eq!(image.dimensions(), (180, 180));
        assert_matches_grid(&image, &grid, pitch, offset);
    }

    #[test]
    fn card_sized_codes_decode_to_the_link() {
        for len in (30..=300).step_by(10) {
            let link = link_of_length(len);
            let png = generate(&link, 180).expect("encodes");
            assert_eq!(decode(&png), vec![link.clone()], "length {len}");
        }
    }

    #[test]
    fn plain_fallback_decodes_to_the_link() {
        let grid = ModuleGrid::encode(LINK).expect("encodes");
        let side = grid.framed_width() * 3;
        let image = frame(&render_plain(&grid, 3), side);
        assert_matches_grid(&image, &grid, 3, 3);
        assert_eq!(decode(&png(image)), vec![LINK.to_owned()]);
    }

    #[test]
    fn tiny_output_falls_back_to_plain() {
        let (image, style) = generate_image(LINK, 20).expect("encodes");
        assert_eq!(style, QrStyle::Plain);
        assert_eq!(image.dimensions(), (20, 20));
    }

    #[test]
    fn one_pixel_pitch_is_plain_and_exact() {
        let grid = ModuleGrid::encode(LINK).expect("encodes");
        let size = grid.framed_width() + 1;
        let (image, style) = generate_image(LINK, size).expect("encodes");
        assert_eq!(style, QrStyle::Plain);
        assert_matches_grid(&image, &grid, 1, 1);
    }

    #[test]
    fn png_output_is_deterministic() {
        let first = generate(LINK, 180).expect("encodes");
        let second = generate(LINK, 180).expect("encodes");
        assert!(first.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(first, second);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let url = format!("https://example.com/{}", "x".repeat(4000));
        assert!(matches!(generate(&url, 180), Err(QrError::Encode(_))));
    }
}

//! Font loading and measuring utilities for the label_press crate.
//!
//! Layout code never talks to a font file directly.  It asks a [`FontCatalog`] for the
//! [`FontMetrics`] of a [`FontWeight`] and measures strings through that trait, which keeps the
//! fitters usable with synthetic metrics in tests and with the bundled Unbounded faces in
//! production.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::assets::AssetError;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Unbounded";

/// Per-size vertical metrics and string widths of one font face.
pub trait FontMetrics {
    /// Distance from the baseline to the top of the tallest glyph, in points.
    fn ascent(&self, size: f64) -> f64;

    /// Distance from the baseline to the lowest glyph edge, in points.  Always non-negative.
    fn descent(&self, size: f64) -> f64;

    /// Advance width of `text` set at `size`, in points.
    fn text_width(&self, text: &str, size: f64) -> f64;
}

/// Resolves font identifiers to their metrics.
pub trait FontCatalog {
    /// Returns the metrics for the given weight.
    fn metrics(&self, weight: FontWeight) -> &dyn FontMetrics;
}

/// The four weights every label family draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Body text.
    Regular,
    /// Names, tiers and the brand mark.
    Medium,
    /// Prices and shelf-life phrases on product labels.
    SemiBold,
    /// Headlines.
    Bold,
}

impl FontWeight {
    /// All weights in a stable order.
    pub const ALL: [FontWeight; 4] = [
        FontWeight::Regular,
        FontWeight::Medium,
        FontWeight::SemiBold,
        FontWeight::Bold,
    ];

    /// File name of the bundled face for this weight.
    pub fn file_name(self) -> &'static str {
        match self {
            FontWeight::Regular => "Unbounded-Regular.ttf",
            FontWeight::Medium => "Unbounded-Medium.ttf",
            FontWeight::SemiBold => "Unbounded-SemiBold.ttf",
            FontWeight::Bold => "Unbounded-Bold.ttf",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FontWeight::Regular => 0,
            FontWeight::Medium => 1,
            FontWeight::SemiBold => 2,
            FontWeight::Bold => 3,
        }
    }
}

/// Weights whose absence is fatal.  Regular falls back to medium.
const REQUIRED_WEIGHTS: [FontWeight; 3] =
    [FontWeight::Medium, FontWeight::SemiBold, FontWeight::Bold];

/// A parsed TrueType/OpenType face with cached metrics.
///
/// Advances of every character the face maps are read once at load time.  The raw bytes are
/// kept so the PDF surface can embed the same program that was measured.
#[derive(Clone)]
pub struct FontFace {
    name: String,
    bytes: Arc<[u8]>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    advances: Arc<HashMap<char, u16>>,
    missing_advance: u16,
}

impl FontFace {
    /// Parses a face from raw bytes.  `name` is only used for diagnostics.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self, AssetError> {
        let name = name.into();
        let bytes = bytes.into();
        let face = ttf_parser::Face::parse(&bytes, 0).map_err(|err| AssetError::InvalidFont {
            name: name.clone(),
            message: err.to_string(),
        })?;

        let units_per_em = face.units_per_em().max(1);
        Ok(Self {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            advances: Arc::new(build_advances(&face)),
            missing_advance: face
                .glyph_hor_advance(ttf_parser::GlyphId(0))
                .unwrap_or(units_per_em),
            name,
            bytes,
        })
    }

    /// Reads and parses the face stored at `path`.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let bytes = fs::read(path).map_err(|err| AssetError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    /// Diagnostic name of the face.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw font program.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn scale(&self, size: f64) -> f64 {
        size / f64::from(self.units_per_em)
    }
}

impl FontMetrics for FontFace {
    fn ascent(&self, size: f64) -> f64 {
        f64::from(self.ascender) * self.scale(size)
    }

    fn descent(&self, size: f64) -> f64 {
        (f64::from(self.descender) * self.scale(size)).abs()
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: u64 = text
            .chars()
            .map(|ch| u64::from(self.advances.get(&ch).copied().unwrap_or(self.missing_advance)))
            .sum();
        units as f64 * self.scale(size)
    }
}

fn build_advances(face: &ttf_parser::Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };
    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|codepoint| {
            let Some(ch) = char::from_u32(codepoint) else {
                return;
            };
            if let Some(advance) = subtable
                .glyph_index(codepoint)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                advances.entry(ch).or_insert(advance);
            }
        });
    }
    advances
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("units_per_em", &self.units_per_em)
            .field("mapped_chars", &self.advances.len())
            .finish()
    }
}

/// The loaded regular/medium/semibold/bold faces.
#[derive(Clone, Debug)]
pub struct FontSet {
    faces: [FontFace; 4],
}

impl FontSet {
    /// Builds a set from already parsed faces.
    pub fn new(regular: FontFace, medium: FontFace, semibold: FontFace, bold: FontFace) -> Self {
        Self {
            faces: [regular, medium, semibold, bold],
        }
    }

    /// Loads the bundled family from `directory`.
    ///
    /// Medium, semibold and bold must be present.  A missing regular face is replaced by the
    /// medium one.
    pub fn load(directory: &Path) -> Result<Self, AssetError> {
        let missing = missing_font_files(directory);
        if !missing.is_empty() {
            return Err(AssetError::MissingFiles {
                directory: directory.to_path_buf(),
                files: missing,
            });
        }

        let medium = FontFace::load(&directory.join(FontWeight::Medium.file_name()))?;
        let semibold = FontFace::load(&directory.join(FontWeight::SemiBold.file_name()))?;
        let bold = FontFace::load(&directory.join(FontWeight::Bold.file_name()))?;

        let regular_path = directory.join(FontWeight::Regular.file_name());
        let regular = if regular_path.is_file() {
            FontFace::load(&regular_path)?
        } else {
            warn!(
                "Regular {} face missing at {}; using the medium face instead.",
                DEFAULT_FONT_FAMILY_NAME,
                regular_path.display()
            );
            medium.clone()
        };

        info!(
            "Loaded {} font family from {}",
            DEFAULT_FONT_FAMILY_NAME,
            directory.display()
        );
        Ok(Self::new(regular, medium, semibold, bold))
    }

    /// Returns the face for `weight`.
    pub fn face(&self, weight: FontWeight) -> &FontFace {
        &self.faces[weight.index()]
    }
}

impl FontCatalog for FontSet {
    fn metrics(&self, weight: FontWeight) -> &dyn FontMetrics {
        self.face(weight)
    }
}

/// Lists the required font files that are absent from `directory`.
pub(crate) fn missing_font_files(directory: &Path) -> Vec<PathBuf> {
    REQUIRED_WEIGHTS
        .iter()
        .map(|weight| directory.join(weight.file_name()))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

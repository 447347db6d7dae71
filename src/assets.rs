//! Startup resources: asset discovery, background templates and the shared resource bundle.
//!
//! Everything in this module is loaded once before any label is built.  A missing font or
//! background is fatal here so that builds never start with an incomplete resource set.

use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use log::info;

use crate::fonts::{self, FontSet};
use crate::labels::LabelGeometry;

/// Environment variable overriding the font directory.
pub const FONTS_DIR_ENV: &str = "LABEL_PRESS_FONTS_DIR";

/// Environment variable overriding the background directory.
pub const BACKGROUNDS_DIR_ENV: &str = "LABEL_PRESS_ASSETS_DIR";

/// Errors raised while loading fonts, backgrounds or configuration.
#[derive(Debug)]
pub enum AssetError {
    /// None of the candidate directories contained the required files.
    DirectoryNotFound {
        /// What was being searched for.
        what: &'static str,
        /// One entry per candidate directory, with the reason it was rejected.
        attempts: Vec<String>,
    },
    /// The directory exists but required files are absent.
    MissingFiles {
        /// Directory that was inspected.
        directory: PathBuf,
        /// Absolute paths of the absent files.
        files: Vec<PathBuf>,
    },
    /// A font file could not be parsed.
    InvalidFont {
        /// Font file or source name.
        name: String,
        /// Parser message.
        message: String,
    },
    /// A background raster could not be decoded.
    InvalidImage {
        /// Raster path.
        path: PathBuf,
        /// Decoder error.
        source: image::ImageError,
    },
    /// The geometry configuration file is not valid JSON for [`LabelGeometry`].
    InvalidConfig {
        /// Configuration path.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },
    /// Reading a file failed.
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryNotFound { what, attempts } => {
                let summary = if attempts.is_empty() {
                    "no search paths were available".to_owned()
                } else {
                    attempts.join(", ")
                };
                write!(f, "Unable to locate {what}. Checked: {summary}")
            }
            Self::MissingFiles { directory, files } => {
                let list = files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Missing files in {}: {}", directory.display(), list)
            }
            Self::InvalidFont { name, message } => {
                write!(f, "Failed to parse font {name}: {message}")
            }
            Self::InvalidImage { path, .. } => {
                write!(f, "Failed to decode background {}", path.display())
            }
            Self::InvalidConfig { path, .. } => {
                write!(f, "Invalid geometry configuration {}", path.display())
            }
            Self::Io { path, .. } => write!(f, "Failed to read {}", path.display()),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidImage { source, .. } => Some(source),
            Self::InvalidConfig { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::DirectoryNotFound { .. } | Self::MissingFiles { .. } | Self::InvalidFont { .. } => {
                None
            }
        }
    }
}

/// The five fixed template backgrounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Front and back of two-sided product labels.
    Products,
    /// Square jar label for tea.
    TeaBank,
    /// Long strip label for tea boxes.
    TeaBox,
    /// Front of the tip-jar card.
    TipsFront,
    /// Back of the tip-jar card.
    TipsBack,
}

impl TemplateKind {
    /// All templates in a stable order.
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::Products,
        TemplateKind::TeaBank,
        TemplateKind::TeaBox,
        TemplateKind::TipsFront,
        TemplateKind::TipsBack,
    ];

    /// Background file name for this template.
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Products => "products.png",
            TemplateKind::TeaBank => "tea_bank.png",
            TemplateKind::TeaBox => "tea_box.png",
            TemplateKind::TipsFront => "tips_front.png",
            TemplateKind::TipsBack => "tips_back.png",
        }
    }
}

/// A background raster whose pixel size defines the page size in points.
#[derive(Clone, Debug)]
pub struct LabelTemplate {
    kind: TemplateKind,
    background: Arc<DynamicImage>,
    width: u32,
    height: u32,
}

impl LabelTemplate {
    /// Wraps a decoded background.  The image is converted to 8-bit RGB once here; transparent
    /// areas are composited onto white paper.
    pub fn from_image(kind: TemplateKind, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let background = match image {
            rgb @ DynamicImage::ImageRgb8(_) => rgb,
            other if other.color().has_alpha() => DynamicImage::ImageRgb8(onto_white(&other)),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Self {
            kind,
            background: Arc::new(background),
            width,
            height,
        }
    }

    /// Decodes the background stored at `path`.
    pub fn load(kind: TemplateKind, path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|err| AssetError::InvalidImage {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(Self::from_image(kind, image))
    }

    /// Which template this is.
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// The RGB background raster.
    pub fn background(&self) -> &DynamicImage {
        &self.background
    }

    /// Page width in points.
    pub fn width(&self) -> f64 {
        f64::from(self.width)
    }

    /// Page height in points.
    pub fn height(&self) -> f64 {
        f64::from(self.height)
    }
}

fn onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |channel: u8| ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// All five backgrounds, loaded once per process or batch.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    templates: [LabelTemplate; 5],
}

impl TemplateSet {
    /// Builds a set from decoded templates given in [`TemplateKind::ALL`] order.
    pub fn new(
        products: LabelTemplate,
        tea_bank: LabelTemplate,
        tea_box: LabelTemplate,
        tips_front: LabelTemplate,
        tips_back: LabelTemplate,
    ) -> Self {
        Self {
            templates: [products, tea_bank, tea_box, tips_front, tips_back],
        }
    }

    /// Loads every background from `directory`.  Any missing file is fatal.
    pub fn load(directory: &Path) -> Result<Self, AssetError> {
        let missing = missing_background_files(directory);
        if !missing.is_empty() {
            return Err(AssetError::MissingFiles {
                directory: directory.to_path_buf(),
                files: missing,
            });
        }

        let load = |kind: TemplateKind| LabelTemplate::load(kind, &directory.join(kind.file_name()));
        let set = Self::new(
            load(TemplateKind::Products)?,
            load(TemplateKind::TeaBank)?,
            load(TemplateKind::TeaBox)?,
            load(TemplateKind::TipsFront)?,
            load(TemplateKind::TipsBack)?,
        );
        info!("Loaded {} label backgrounds from {}", set.templates.len(), directory.display());
        Ok(set)
    }

    /// Returns the template of the given kind.
    pub fn get(&self, kind: TemplateKind) -> &LabelTemplate {
        let index = match kind {
            TemplateKind::Products => 0,
            TemplateKind::TeaBank => 1,
            TemplateKind::TeaBox => 2,
            TemplateKind::TipsFront => 3,
            TemplateKind::TipsBack => 4,
        };
        &self.templates[index]
    }
}

fn missing_background_files(directory: &Path) -> Vec<PathBuf> {
    TemplateKind::ALL
        .iter()
        .map(|kind| directory.join(kind.file_name()))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

/// Directories holding the font family and the template backgrounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetPaths {
    /// Directory with the `Unbounded-*.ttf` files.
    pub fonts: PathBuf,
    /// Directory with the five background PNGs.
    pub backgrounds: PathBuf,
}

impl AssetPaths {
    /// Uses explicit directories without searching.
    pub fn new(fonts: impl Into<PathBuf>, backgrounds: impl Into<PathBuf>) -> Self {
        Self {
            fonts: fonts.into(),
            backgrounds: backgrounds.into(),
        }
    }

    /// Searches the environment override, the executable directory and the crate directory.
    pub fn discover() -> Result<Self, AssetError> {
        Self::resolve(None, None)
    }

    /// Uses each explicit directory as given and discovers only the ones left out.
    pub fn resolve(fonts: Option<&Path>, backgrounds: Option<&Path>) -> Result<Self, AssetError> {
        let fonts = match fonts {
            Some(path) => path.to_path_buf(),
            None => Self::discover_fonts()?,
        };
        let backgrounds = match backgrounds {
            Some(path) => path.to_path_buf(),
            None => Self::discover_backgrounds()?,
        };
        Ok(Self { fonts, backgrounds })
    }

    /// Locates the font directory alone.
    pub fn discover_fonts() -> Result<PathBuf, AssetError> {
        resolve_directory(
            "font directory",
            FONTS_DIR_ENV,
            "assets/fonts",
            fonts::missing_font_files,
        )
    }

    /// Locates the background directory alone.
    pub fn discover_backgrounds() -> Result<PathBuf, AssetError> {
        resolve_directory(
            "background directory",
            BACKGROUNDS_DIR_ENV,
            "assets/backgrounds",
            missing_background_files,
        )
    }

    /// Indicates whether [`AssetPaths::discover`] would succeed.
    pub fn available() -> bool {
        Self::discover().is_ok()
    }
}

fn directory_candidates(env_var: &str, relative: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env::var_os(env_var) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join(relative);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative);
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn resolve_directory(
    what: &'static str,
    env_var: &str,
    relative: &str,
    missing_files: fn(&Path) -> Vec<PathBuf>,
) -> Result<PathBuf, AssetError> {
    let mut attempts = Vec::new();

    for candidate in directory_candidates(env_var, relative) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_files(&candidate);
        if missing.is_empty() {
            return Ok(candidate);
        }

        let missing_list = missing
            .iter()
            .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
            .collect::<Vec<_>>()
            .join(", ");
        attempts.push(format!("{} (missing files [{}])", candidate.display(), missing_list));
    }

    Err(AssetError::DirectoryNotFound { what, attempts })
}

/// The immutable font, template and geometry bundle threaded into every build.
#[derive(Clone, Debug)]
pub struct Resources {
    fonts: FontSet,
    templates: TemplateSet,
    geometry: LabelGeometry,
}

impl Resources {
    /// Bundles already loaded resources with the default geometry.
    pub fn new(fonts: FontSet, templates: TemplateSet) -> Self {
        Self {
            fonts,
            templates,
            geometry: LabelGeometry::default(),
        }
    }

    /// Loads fonts and backgrounds from `paths`.
    pub fn load(paths: &AssetPaths) -> Result<Self, AssetError> {
        let fonts = FontSet::load(&paths.fonts)?;
        let templates = TemplateSet::load(&paths.backgrounds)?;
        Ok(Self::new(fonts, templates))
    }

    /// Replaces the geometry and returns the updated bundle.
    pub fn with_geometry(mut self, geometry: LabelGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Loaded font faces.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Loaded backgrounds.
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Per-template geometric constants.
    pub fn geometry(&self) -> &LabelGeometry {
        &self.geometry
    }
}

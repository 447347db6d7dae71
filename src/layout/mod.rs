//! Adaptive text layout: line wrapping and largest-legible font size search.
//!
//! Coordinates follow the PDF convention used by the page surfaces: the origin is the bottom-left
//! corner of the template and `y` grows upwards.

mod fit;
mod wrap;

pub use fit::{fit_above_line, fit_text, AnchorGeometry, GuideLine, ELLIPSIS, TRUNCATED_CHARS};
pub use wrap::wrap_lines;

use crate::fonts::FontWeight;

/// Inclusive range of integer font sizes searched from the top down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeRange {
    min: u32,
    max: u32,
}

impl SizeRange {
    /// Creates a range.  The bounds are ordered so `min <= max` always holds.
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest allowed size.
    pub fn min(self) -> u32 {
        self.min
    }

    /// Largest allowed size.
    pub fn max(self) -> u32 {
        self.max
    }

    /// Whether `size` lies within the range.
    pub fn contains(self, size: u32) -> bool {
        (self.min..=self.max).contains(&size)
    }

    /// Sizes from the largest to the smallest.
    ///
    /// Glyph widths are not strictly monotone in the size on every backend, so callers scan this
    /// linearly instead of bisecting.
    pub fn descending(self) -> impl Iterator<Item = u32> {
        (self.min..=self.max).rev()
    }
}

/// A string together with the box it has to fit in.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock<'a> {
    /// Text to lay out.  Whitespace is collapsed by the wrapper.
    pub text: &'a str,
    /// Font the text is set in.
    pub weight: FontWeight,
    /// Candidate sizes.
    pub sizes: SizeRange,
    /// Maximum width of a line, in points.
    pub max_width: f64,
    /// Maximum number of lines.
    pub max_lines: usize,
    /// Optional bound on `size * line_height * lines`.
    pub max_height: Option<f64>,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f64,
    /// Whether overlong words may be broken between characters.
    pub allow_char_break: bool,
}

impl<'a> TextBlock<'a> {
    /// Creates a block with a line height of `1.2` and character breaking allowed.
    pub fn new(
        text: &'a str,
        weight: FontWeight,
        sizes: SizeRange,
        max_width: f64,
        max_lines: usize,
    ) -> Self {
        Self {
            text,
            weight,
            sizes,
            max_width,
            max_lines,
            max_height: None,
            line_height: 1.2,
            allow_char_break: true,
        }
    }

    /// Bounds the height of the wrapped block and returns the updated block.
    pub fn with_max_height(mut self, max_height: impl Into<Option<f64>>) -> Self {
        self.max_height = max_height.into();
        self
    }

    /// Sets the line height multiple and returns the updated block.
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    /// Enables or disables breaking words between characters.
    pub fn with_char_break(mut self, allow_char_break: bool) -> Self {
        self.allow_char_break = allow_char_break;
        self
    }
}

/// The resolved size and lines of a [`TextBlock`].
#[derive(Clone, Debug, PartialEq)]
pub struct FittedLayout {
    /// Chosen font size.
    pub size: u32,
    /// Lines in reading order.
    pub lines: Vec<String>,
    /// Baseline of the last line when the layout is anchored to a guide line.
    pub last_baseline: Option<f64>,
    /// Set when the search was exhausted and a fallback (floor size, truncation or vertical
    /// clamp) produced the layout.
    pub degraded: bool,
}

impl FittedLayout {
    pub(crate) fn new(size: u32, lines: Vec<String>) -> Self {
        Self {
            size,
            lines,
            last_baseline: None,
            degraded: false,
        }
    }

    pub(crate) fn anchored(size: u32, lines: Vec<String>, last_baseline: f64) -> Self {
        Self {
            last_baseline: Some(last_baseline),
            ..Self::new(size, lines)
        }
    }

    pub(crate) fn into_degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    /// Font size as a float for drawing and measuring.
    pub fn size_pt(&self) -> f64 {
        f64::from(self.size)
    }

    /// Height of the block: `size * line_height * lines`.
    pub fn block_height(&self, line_height: f64) -> f64 {
        block_height(self.size, line_height, self.lines.len())
    }
}

pub(crate) fn block_height(size: u32, line_height: f64, lines: usize) -> f64 {
    f64::from(size) * line_height * lines as f64
}

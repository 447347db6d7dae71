//! Font size search over a [`TextBlock`], optionally anchored above a guide line.

use log::debug;

use super::{block_height, wrap_lines, FittedLayout, TextBlock};
use crate::fonts::{FontCatalog, FontMetrics};

/// Marker appended to the truncated last-resort line.
pub const ELLIPSIS: char = '…';

/// Number of characters kept by the truncated last-resort line.
pub const TRUNCATED_CHARS: usize = 20;

/// Vertical constraints for text that sits on a printed rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuideLine {
    /// Highest coordinate a glyph may reach.
    pub ceiling: f64,
    /// Coordinate of the printed rule.
    pub guide: f64,
    /// Minimum gap between the lowest glyph edge and the rule.
    pub clearance: f64,
}

impl GuideLine {
    /// Lowest coordinate a glyph may reach.
    pub fn floor(&self) -> f64 {
        self.guide + self.clearance
    }
}

/// Vertical extents of a block whose lowest glyph edge rests on `floor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorGeometry {
    /// Baseline of the last (lowest) line.
    pub last_baseline: f64,
    /// Baseline of the first (highest) line.
    pub first_baseline: f64,
    /// Top edge of the first line's glyphs.
    pub top_glyph: f64,
}

impl AnchorGeometry {
    /// Computes the extents for `line_count` lines at `size`.
    pub fn resting_on(
        metrics: &dyn FontMetrics,
        size: u32,
        line_count: usize,
        line_height: f64,
        floor: f64,
    ) -> Self {
        let size_pt = f64::from(size);
        let last_baseline = floor + metrics.descent(size_pt);
        let steps = line_count.saturating_sub(1) as f64;
        let first_baseline = last_baseline + steps * size_pt * line_height;
        Self {
            last_baseline,
            first_baseline,
            top_glyph: first_baseline + metrics.ascent(size_pt),
        }
    }
}

fn wrap_at(metrics: &dyn FontMetrics, block: &TextBlock<'_>, size: u32) -> Option<Vec<String>> {
    let size_pt = f64::from(size);
    wrap_lines(
        block.text,
        |line| metrics.text_width(line, size_pt),
        block.max_width,
        block.max_lines,
        block.allow_char_break,
    )
}

fn truncated_line(text: &str) -> String {
    let kept: String = text.trim().chars().take(TRUNCATED_CHARS).collect();
    format!("{kept}{ELLIPSIS}")
}

/// Returns the largest size in `block.sizes` at which the text wraps into the block.
///
/// When `block.max_height` is set the wrapped block must also satisfy
/// `size * line_height * lines <= max_height`.  If no size fits, the text is wrapped at the
/// minimum size ignoring the height bound, and if even that fails a single truncated line is
/// returned.  The result is always renderable.
pub fn fit_text<C>(fonts: &C, block: &TextBlock<'_>) -> FittedLayout
where
    C: FontCatalog + ?Sized,
{
    let metrics = fonts.metrics(block.weight);

    for size in block.sizes.descending() {
        let Some(lines) = wrap_at(metrics, block, size) else {
            continue;
        };
        if let Some(max_height) = block.max_height {
            if block_height(size, block.line_height, lines.len()) > max_height {
                continue;
            }
        }
        return FittedLayout::new(size, lines);
    }

    let size = block.sizes.min();
    let lines = wrap_at(metrics, block, size).unwrap_or_else(|| vec![truncated_line(block.text)]);
    debug!(
        "No size in {}..={} fits {:?}; degrading to {} line(s) at {}",
        block.sizes.min(),
        block.sizes.max(),
        block.text,
        lines.len(),
        size
    );
    FittedLayout::new(size, lines).into_degraded()
}

/// Fits text so that its lowest glyph edge sits `clearance` above `guide`.
///
/// For each size, the last baseline is placed at `guide + clearance + descent`, the first baseline
/// `lines - 1` line steps above it, and the size is accepted once the first line's ascent stays
/// at or below `ceiling`.  If nothing fits, the minimum size is used and the block is shifted
/// down until its top touches the ceiling, giving up exact clearance for no overflow.
pub fn fit_above_line<C>(fonts: &C, block: &TextBlock<'_>, guide: &GuideLine) -> FittedLayout
where
    C: FontCatalog + ?Sized,
{
    let metrics = fonts.metrics(block.weight);
    let floor = guide.floor();

    if block.text.split_whitespace().next().is_none() {
        let size = block.sizes.min();
        let last_baseline = floor + metrics.descent(f64::from(size));
        return FittedLayout::anchored(size, vec![String::new()], last_baseline);
    }

    for size in block.sizes.descending() {
        let Some(lines) = wrap_at(metrics, block, size) else {
            continue;
        };
        let geometry =
            AnchorGeometry::resting_on(metrics, size, lines.len(), block.line_height, floor);
        if geometry.top_glyph <= guide.ceiling {
            return FittedLayout::anchored(size, lines, geometry.last_baseline);
        }
    }

    let size = block.sizes.min();
    let lines = wrap_at(metrics, block, size).unwrap_or_else(|| vec![truncated_line(block.text)]);
    let geometry = AnchorGeometry::resting_on(metrics, size, lines.len(), block.line_height, floor);
    let mut last_baseline = geometry.last_baseline;
    if geometry.top_glyph > guide.ceiling {
        last_baseline -= geometry.top_glyph - guide.ceiling;
    }
    debug!(
        "Anchored fit of {:?} exhausted; clamped last baseline to {:.2} at size {}",
        block.text, last_baseline, size
    );
    FittedLayout::anchored(size, lines, last_baseline).into_degraded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontMetrics, FontWeight};
    use crate::layout::SizeRange;

    struct Mono;

    impl FontMetrics for Mono {
        fn ascent(&self, size: f64) -> f64 {
            size * 0.8
        }
        fn descent(&self, size: f64) -> f64 {
            size * 0.2
        }
        fn text_width(&self, text: &str, size: f64) -> f64 {
            text.chars().count() as f64 * size * 0.5
        }
    }

    impl FontCatalog for Mono {
        fn metrics(&self, _weight: FontWeight) -> &dyn FontMetrics {
            self
        }
    }

    fn block(text: &str, min: u32, max: u32, width: f64, lines: usize) -> TextBlock<'_> {
        TextBlock::new(text, FontWeight::Bold, SizeRange::new(min, max), width, lines)
            .with_char_break(false)
    }

    #[test]
    fn picks_largest_size_that_wraps() {
        // "abcd" is 2 * size wide; 100 / 2 = 50.
        let layout = fit_text(&Mono, &block("abcd", 10, 80, 100.0, 1));
        assert_eq!(layout.size, 50);
        assert_eq!(layout.lines, vec!["abcd"]);
        assert!(!layout.degraded);
    }

    #[test]
    fn height_bound_forces_smaller_size() {
        let unbounded = fit_text(&Mono, &block("ab cd", 10, 80, 100.0, 2).with_line_height(1.0));
        let bounded = fit_text(
            &Mono,
            &block("ab cd", 10, 80, 100.0, 2)
                .with_line_height(1.0)
                .with_max_height(60.0),
        );
        assert!(bounded.size < unbounded.size || bounded.lines.len() == 1);
        assert!(bounded.block_height(1.0) <= 60.0);
    }

    #[test]
    fn exhausted_search_truncates_at_the_floor() {
        let text = "averyveryverylongsingleword";
        let layout = fit_text(&Mono, &block(text, 10, 20, 30.0, 1));
        assert_eq!(layout.size, 10);
        assert!(layout.degraded);
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.lines[0].ends_with(ELLIPSIS));
        assert_eq!(layout.lines[0].chars().count(), TRUNCATED_CHARS + 1);
    }

    #[test]
    fn exhausted_height_bound_rewraps_at_the_floor() {
        let layout = fit_text(
            &Mono,
            &block("ab cd", 10, 12, 10.0, 2)
                .with_line_height(1.0)
                .with_max_height(5.0),
        );
        assert_eq!(layout.size, 10);
        assert_eq!(layout.lines, vec!["ab", "cd"]);
        assert!(layout.degraded);
    }

    #[test]
    fn anchored_fit_rests_on_the_clearance() {
        let guide = GuideLine {
            ceiling: 500.0,
            guide: 100.0,
            clearance: 10.0,
        };
        let layout = fit_above_line(&Mono, &block("tea", 10, 200, 300.0, 2), &guide);
        let last = layout.last_baseline.expect("anchored");
        let size = layout.size_pt();
        assert!((last - size * 0.2 - 110.0).abs() < 1e-9);
        assert!(last + size * 0.8 <= 500.0);
        assert!(!layout.degraded);
    }

    #[test]
    fn anchored_fit_clamps_under_the_ceiling() {
        let guide = GuideLine {
            ceiling: 120.0,
            guide: 100.0,
            clearance: 10.0,
        };
        let layout = fit_above_line(&Mono, &block("tea", 30, 40, 300.0, 1), &guide);
        assert!(layout.degraded);
        assert_eq!(layout.size, 30);
        let top = layout.last_baseline.expect("anchored") + 30.0 * 0.8;
        assert!((top - 120.0).abs() < 1e-9);
    }

    #[test]
    fn anchored_empty_text_yields_blank_line() {
        let guide = GuideLine {
            ceiling: 500.0,
            guide: 100.0,
            clearance: 10.0,
        };
        let layout = fit_above_line(&Mono, &block("  ", 12, 40, 300.0, 2), &guide);
        assert_eq!(layout.size, 12);
        assert_eq!(layout.lines, vec![String::new()]);
    }
}

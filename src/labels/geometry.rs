//! Per-template geometric constants.
//!
//! The defaults are tuned against the bundled backgrounds.  A JSON file may override any family
//! or any top-level field of a family; omitted fields keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::AssetError;
use crate::fonts::FontWeight;
use crate::layout::{GuideLine, SizeRange, TextBlock};

/// Size range, line budget and wrapping rules of one text field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextSlot {
    /// Largest size tried.
    pub max_size: u32,
    /// Smallest size tried.
    pub min_size: u32,
    /// Line budget.
    pub max_lines: usize,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f64,
    /// Whether overlong words may be split between characters.
    pub char_break: bool,
}

impl TextSlot {
    const fn new(max_size: u32, min_size: u32, max_lines: usize, line_height: f64, char_break: bool) -> Self {
        Self {
            max_size,
            min_size,
            max_lines,
            line_height,
            char_break,
        }
    }

    /// Candidate sizes.
    pub fn sizes(&self) -> SizeRange {
        SizeRange::new(self.min_size, self.max_size)
    }

    /// The fitter input for `text` set in `weight` on lines at most `max_width` wide.
    pub fn block<'a>(&self, text: &'a str, weight: FontWeight, max_width: f64) -> TextBlock<'a> {
        TextBlock::new(text, weight, self.sizes(), max_width, self.max_lines)
            .with_line_height(self.line_height)
            .with_char_break(self.char_break)
    }
}

/// A text field centered horizontally on the page and vertically on `center_y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenteredSlot {
    /// Fitting rules.
    #[serde(flatten)]
    pub text: TextSlot,
    /// Page width minus the maximum line width.
    pub inset: f64,
    /// Vertical center of the block.
    pub center_y: f64,
}

impl CenteredSlot {
    const fn new(text: TextSlot, inset: f64, center_y: f64) -> Self {
        Self {
            text,
            inset,
            center_y,
        }
    }
}

/// Baseline and size of the two-colored brand line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrandMark {
    /// Baseline of the brand line.
    pub baseline: f64,
    /// Font size.
    pub size: f64,
}

/// A horizontal rule spanning the page minus `inset` on each side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSpan {
    /// Vertical position.
    pub y: f64,
    /// Distance from each page edge.
    pub inset: f64,
}

/// Two-sided product label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsGeometry {
    /// Brand line on both sides.
    pub brand: BrandMark,
    /// Product name, front side.
    pub name: CenteredSlot,
    /// Price, front side.
    pub price: CenteredSlot,
    /// Heading printed on the back side.
    pub back_title: String,
    /// Heading slot, back side.
    pub title: CenteredSlot,
    /// Shelf-life phrase, back side.
    pub shelf_life: CenteredSlot,
}

impl Default for ProductsGeometry {
    fn default() -> Self {
        Self {
            brand: BrandMark {
                baseline: 585.0,
                size: 36.0,
            },
            name: CenteredSlot::new(TextSlot::new(72, 34, 2, 1.15, true), 140.0, 355.0),
            price: CenteredSlot::new(TextSlot::new(60, 28, 1, 1.0, true), 200.0, 80.0),
            back_title: "Срок хранения".to_owned(),
            title: CenteredSlot::new(TextSlot::new(72, 36, 2, 1.05, true), 160.0, 355.0),
            shelf_life: CenteredSlot::new(TextSlot::new(60, 28, 1, 1.0, true), 200.0, 80.0),
        }
    }
}

/// Square tea bank label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeaBankGeometry {
    /// Brand line at the top.
    pub brand: BrandMark,
    /// Price tier near the bottom.
    pub tier: CenteredSlot,
    /// Height bound of the tier block.
    pub tier_max_height: f64,
    /// Tea type resting on the upper rule.
    pub tea_type: TextSlot,
    /// Page width minus the tea type's maximum line width.
    pub tea_type_inset: f64,
    /// Highest coordinate the tea type may reach.
    pub tea_type_ceiling: f64,
    /// Gap kept between the tea type and the upper rule.
    pub tea_type_clearance: f64,
    /// Rule under the tea type.
    pub upper_rule: RuleSpan,
    /// Item name between the rules.
    pub name: TextSlot,
    /// Page width minus the name's maximum line width.
    pub name_inset: f64,
    /// Top of the name box.
    pub name_top: f64,
    /// Bottom of the name box.
    pub name_bottom: f64,
    /// Rule under the name.
    pub lower_rule: RuleSpan,
    /// Price below the lower rule.
    pub price: CenteredSlot,
    /// Stroke width of both rules.
    pub rule_width: f64,
}

impl TeaBankGeometry {
    /// Constraints of the tea type block.
    pub fn guide(&self) -> GuideLine {
        GuideLine {
            ceiling: self.tea_type_ceiling,
            guide: self.upper_rule.y,
            clearance: self.tea_type_clearance,
        }
    }

    /// Height available to the name.
    pub fn name_height(&self) -> f64 {
        self.name_top - self.name_bottom
    }

    /// Vertical center of the name box.
    pub fn name_center(&self) -> f64 {
        (self.name_top + self.name_bottom) / 2.0
    }
}

impl Default for TeaBankGeometry {
    fn default() -> Self {
        Self {
            brand: BrandMark {
                baseline: 1505.0,
                size: 70.0,
            },
            tier: CenteredSlot::new(TextSlot::new(85, 18, 1, 1.0, false), 220.0, 210.0),
            tier_max_height: 120.0,
            tea_type: TextSlot::new(180, 34, 2, 1.05, false),
            tea_type_inset: 240.0,
            tea_type_ceiling: 1425.0,
            tea_type_clearance: 36.0,
            upper_rule: RuleSpan {
                y: 855.0,
                inset: 190.0,
            },
            name: TextSlot::new(124, 22, 2, 1.2, false),
            name_inset: 260.0,
            name_top: 840.0,
            name_bottom: 615.0,
            lower_rule: RuleSpan {
                y: 600.0,
                inset: 260.0,
            },
            price: CenteredSlot::new(TextSlot::new(110, 30, 1, 1.0, false), 340.0, 470.0),
            rule_width: 6.0,
        }
    }
}

/// Wide tea box label split into three columns by vertical rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeaBoxGeometry {
    /// X positions of the two column rules.
    pub column_rules: [f64; 2],
    /// Distance of the rule ends from the top and bottom edges.
    pub rule_margin: f64,
    /// Stroke width of the rules.
    pub rule_width: f64,
    /// Horizontal padding inside each column.
    pub padding: f64,
    /// Tea type, left-aligned in the left column.
    pub tea_type: TextSlot,
    /// Item name, centered in the middle column.
    pub name: TextSlot,
    /// Offset of the name's center from the page's vertical center.
    pub name_offset_y: f64,
    /// Price, right-aligned in the right column.
    pub price: TextSlot,
    /// Vertical center of the price.
    pub price_y: f64,
    /// Price tier, right-aligned under the price.
    pub tier: TextSlot,
    /// Vertical center of the tier.
    pub tier_y: f64,
}

impl TeaBoxGeometry {
    /// Left, middle and right text columns of a page `width` wide.
    pub fn columns(&self, width: f64) -> [(f64, f64); 3] {
        let [left, right] = self.column_rules;
        let pad = self.padding;
        [
            (pad, left - pad),
            (left + pad, right - pad),
            (right + pad, width - pad),
        ]
    }
}

impl Default for TeaBoxGeometry {
    fn default() -> Self {
        Self {
            column_rules: [457.0, 1524.0],
            rule_margin: 30.0,
            rule_width: 6.0,
            padding: 60.0,
            tea_type: TextSlot::new(72, 28, 2, 1.0, false),
            name: TextSlot::new(60, 24, 2, 1.2, true),
            name_offset_y: 3.0,
            price: TextSlot::new(60, 24, 1, 1.0, true),
            price_y: 150.0,
            tier: TextSlot::new(36, 18, 1, 1.0, true),
            tier_y: 80.0,
        }
    }
}

/// Square zone on the tips card holding the QR code.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrBox {
    /// Left edge of the zone.
    pub left: f64,
    /// Bottom edge of the zone.
    pub bottom: f64,
    /// Side of the zone.
    pub size: f64,
    /// Side of the QR raster, in pixels and points.
    pub qr_size: u32,
}

impl QrBox {
    /// Bottom-left corner of the QR raster, centered in the zone and snapped down to whole points.
    pub fn origin(&self) -> (f64, f64) {
        let margin = (self.size - f64::from(self.qr_size)) / 2.0;
        ((self.left + margin).trunc(), (self.bottom + margin).trunc())
    }
}

/// Two-sided tips card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TipsGeometry {
    /// Owner's name.
    pub name: TextSlot,
    /// Page width minus the name's maximum line width.
    pub name_inset: f64,
    /// Goal under the name.
    pub goal: TextSlot,
    /// Page width minus the goal's maximum line width.
    pub goal_inset: f64,
    /// Gap between the blocks when neither wraps.
    pub gap: f64,
    /// Gap when exactly one block wraps.
    pub gap_one_wrapped: f64,
    /// Gap when both blocks wrap.
    pub gap_both_wrapped: f64,
    /// Vertical center of the name and goal group.
    pub group_center_y: f64,
    /// Lowest coordinate the goal block may reach.
    pub goal_floor: f64,
    /// QR code placement.
    pub qr: QrBox,
}

impl TipsGeometry {
    /// Vertical centers of the name and goal blocks.
    ///
    /// The pair is centered on `group_center_y` with a gap that shrinks as the blocks wrap.  If
    /// the goal would reach below `goal_floor`, both blocks move up together.
    pub fn stack(&self, name_height: f64, name_lines: usize, goal_height: f64, goal_lines: usize) -> (f64, f64) {
        let gap = match (name_lines >= 2, goal_lines >= 2) {
            (true, true) => self.gap_both_wrapped,
            (true, false) | (false, true) => self.gap_one_wrapped,
            (false, false) => self.gap,
        };

        let mut name_center = self.group_center_y + (goal_height + gap) / 2.0;
        let mut goal_center = self.group_center_y - (name_height + gap) / 2.0;

        let goal_bottom = goal_center - goal_height / 2.0;
        if goal_bottom < self.goal_floor {
            let shift = self.goal_floor - goal_bottom;
            name_center += shift;
            goal_center += shift;
        }
        (name_center, goal_center)
    }
}

impl Default for TipsGeometry {
    fn default() -> Self {
        Self {
            name: TextSlot::new(86, 28, 2, 1.05, false),
            name_inset: 120.0,
            goal: TextSlot::new(48, 16, 3, 1.15, false),
            goal_inset: 140.0,
            gap: 20.0,
            gap_one_wrapped: 14.0,
            gap_both_wrapped: 10.0,
            group_center_y: 505.0,
            goal_floor: 330.0,
            qr: QrBox {
                left: 200.0,
                bottom: 62.0,
                size: 249.0,
                qr_size: 180,
            },
        }
    }
}

/// Geometry of every label family.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelGeometry {
    /// Product labels.
    pub products: ProductsGeometry,
    /// Tea bank labels.
    pub tea_bank: TeaBankGeometry,
    /// Tea box labels.
    pub tea_box: TeaBoxGeometry,
    /// Tips cards.
    pub tips: TipsGeometry,
}

impl LabelGeometry {
    /// Parses a JSON override.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a JSON override from `path`.
    pub fn from_json_file(path: &Path) -> Result<Self, AssetError> {
        let json = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| AssetError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}

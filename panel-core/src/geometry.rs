//! Alignment and anchor-point algebra shared by every export target.
//!
//! One alignment keyword (`TOP_LEFT`, `CENTER`, `BOTTOM_RIGHT`, ...) has four
//! textual renderings, one per consumer:
//!
//! | Consumer         | Rendering                         | Example (`TOP_RIGHT`)  |
//! |------------------|-----------------------------------|------------------------|
//! | Preview surface  | flex axis pair                    | `flex-end` / `flex-start` |
//! | Declarative JSON | two-character anchor code         | `tr`                   |
//! | Procedural code  | `TextAlign` constant              | `TextAlign::TOP_RIGHT` |
//! | Retained GUI     | horizontal text alignment only    | `RIGHT`                |
//!
//! Every rendering parses back into the same [`Alignment`], so all targets
//! agree on the anchor pixel for a given bounding box.

use serde::{Deserialize, Serialize};

/// Vertical gap in pixels between the two lines of a stacked text block.
pub const STACK_LINE_GAP: i32 = 2;

/// Round a device coordinate to the nearest whole pixel.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_px(value: f64) -> i32 {
    value.round() as i32
}

/// Integer bounding box in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Center point, rounded.
    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        Alignment::CENTER.anchor_point(*self)
    }

    /// Radius of the largest circle centered in the box.
    #[must_use]
    pub fn inner_radius(&self) -> i32 {
        round_px(f64::from(self.width.min(self.height)) / 2.0)
    }
}

/// Horizontal anchor component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HAlign {
    /// Anchor on the left edge.
    Left,
    /// Anchor on the horizontal center.
    #[default]
    Center,
    /// Anchor on the right edge.
    Right,
}

/// Vertical anchor component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VAlign {
    /// Anchor on the top edge.
    Top,
    /// Anchor on the vertical center.
    #[default]
    Center,
    /// Anchor on the bottom edge.
    Bottom,
}

/// Axis alignment as understood by a flexbox preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlexAlign {
    /// `flex-start`
    #[serde(rename = "flex-start")]
    Start,
    /// `center`
    #[serde(rename = "center")]
    Center,
    /// `flex-end`
    #[serde(rename = "flex-end")]
    End,
}

impl FlexAlign {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Start => "flex-start",
            Self::Center => "center",
            Self::End => "flex-end",
        }
    }
}

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    /// Children laid out left to right.
    Row,
    /// Children stacked top to bottom.
    Column,
}

/// Flex alignment pair for preview rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlexAnchor {
    /// Alignment along the horizontal axis.
    pub horizontal: FlexAlign,
    /// Alignment along the vertical axis.
    pub vertical: FlexAlign,
}

impl FlexAnchor {
    /// `(justify-content, align-items)` for a container with the given
    /// main axis.
    #[must_use]
    pub const fn css(&self, direction: FlexDirection) -> (&'static str, &'static str) {
        match direction {
            FlexDirection::Row => (self.horizontal.as_css(), self.vertical.as_css()),
            FlexDirection::Column => (self.vertical.as_css(), self.horizontal.as_css()),
        }
    }
}

/// A resolved anchor within a bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    /// Horizontal component.
    pub horizontal: HAlign,
    /// Vertical component.
    pub vertical: VAlign,
}

impl Alignment {
    /// Centered on both axes.
    pub const CENTER: Self = Self {
        horizontal: HAlign::Center,
        vertical: VAlign::Center,
    };

    /// Top-left corner.
    pub const TOP_LEFT: Self = Self {
        horizontal: HAlign::Left,
        vertical: VAlign::Top,
    };

    /// Create an alignment from its components.
    #[must_use]
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// All nine alignments.
    #[must_use]
    pub fn all() -> [Self; 9] {
        let h = [HAlign::Left, HAlign::Center, HAlign::Right];
        let v = [VAlign::Top, VAlign::Center, VAlign::Bottom];
        std::array::from_fn(|i| Self::new(h[i % 3], v[i / 3]))
    }

    /// Parse an alignment keyword such as `TOP_LEFT` or `center_right`.
    ///
    /// Missing components default to center, so an empty keyword is
    /// `CENTER`.
    #[must_use]
    pub fn parse(keyword: &str) -> Self {
        let upper = keyword.to_ascii_uppercase();
        let horizontal = if upper.contains("LEFT") {
            HAlign::Left
        } else if upper.contains("RIGHT") {
            HAlign::Right
        } else {
            HAlign::Center
        };
        let vertical = if upper.contains("TOP") {
            VAlign::Top
        } else if upper.contains("BOTTOM") {
            VAlign::Bottom
        } else {
            VAlign::Center
        };
        Self::new(horizontal, vertical)
    }

    /// Canonical keyword (`CENTER`, `TOP_LEFT`, `CENTER_RIGHT`, ...).
    #[must_use]
    pub fn keyword(&self) -> String {
        if *self == Self::CENTER {
            return "CENTER".to_string();
        }
        format!("{}_{}", self.vertical_word(), self.horizontal_word())
    }

    const fn horizontal_word(&self) -> &'static str {
        match self.horizontal {
            HAlign::Left => "LEFT",
            HAlign::Center => "CENTER",
            HAlign::Right => "RIGHT",
        }
    }

    const fn vertical_word(&self) -> &'static str {
        match self.vertical {
            VAlign::Top => "TOP",
            VAlign::Center => "CENTER",
            VAlign::Bottom => "BOTTOM",
        }
    }

    /// Replace the vertical component.
    #[must_use]
    pub const fn with_vertical(self, vertical: VAlign) -> Self {
        Self::new(self.horizontal, vertical)
    }

    /// Flex pair for preview rendering.
    #[must_use]
    pub const fn flex(&self) -> FlexAnchor {
        FlexAnchor {
            horizontal: match self.horizontal {
                HAlign::Left => FlexAlign::Start,
                HAlign::Center => FlexAlign::Center,
                HAlign::Right => FlexAlign::End,
            },
            vertical: match self.vertical {
                VAlign::Top => FlexAlign::Start,
                VAlign::Center => FlexAlign::Center,
                VAlign::Bottom => FlexAlign::End,
            },
        }
    }

    /// Inverse of [`Alignment::flex`].
    #[must_use]
    pub const fn from_flex(anchor: FlexAnchor) -> Self {
        Self::new(
            match anchor.horizontal {
                FlexAlign::Start => HAlign::Left,
                FlexAlign::Center => HAlign::Center,
                FlexAlign::End => HAlign::Right,
            },
            match anchor.vertical {
                FlexAlign::Start => VAlign::Top,
                FlexAlign::Center => VAlign::Center,
                FlexAlign::End => VAlign::Bottom,
            },
        )
    }

    /// Two-character anchor code for declarative renderers (`tl`, `mc`, `br`).
    #[must_use]
    pub fn anchor_code(&self) -> String {
        let v = match self.vertical {
            VAlign::Top => 't',
            VAlign::Center => 'm',
            VAlign::Bottom => 'b',
        };
        let h = match self.horizontal {
            HAlign::Left => 'l',
            HAlign::Center => 'c',
            HAlign::Right => 'r',
        };
        [v, h].iter().collect()
    }

    /// Inverse of [`Alignment::anchor_code`].
    #[must_use]
    pub fn from_anchor_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let vertical = match chars.next()? {
            't' => VAlign::Top,
            'm' => VAlign::Center,
            'b' => VAlign::Bottom,
            _ => return None,
        };
        let horizontal = match chars.next()? {
            'l' => HAlign::Left,
            'c' => HAlign::Center,
            'r' => HAlign::Right,
            _ => return None,
        };
        chars.next().is_none().then_some(Self::new(horizontal, vertical))
    }

    /// Procedural `TextAlign` constant.
    #[must_use]
    pub fn text_align_constant(&self) -> String {
        format!("TextAlign::{}", self.keyword())
    }

    /// Inverse of [`Alignment::text_align_constant`].
    #[must_use]
    pub fn from_text_align_constant(constant: &str) -> Option<Self> {
        let keyword = constant.strip_prefix("TextAlign::")?;
        let parsed = Self::parse(keyword);
        (parsed.keyword() == keyword).then_some(parsed)
    }

    /// Horizontal-only text alignment used by the retained GUI.
    #[must_use]
    pub const fn gui_text_align(&self) -> &'static str {
        self.horizontal_word()
    }

    /// Absolute anchor pixel within `rect`.
    #[must_use]
    pub fn anchor_point(&self, rect: Rect) -> (i32, i32) {
        let dx = match self.horizontal {
            HAlign::Left => 0.0,
            HAlign::Center => f64::from(rect.width) / 2.0,
            HAlign::Right => f64::from(rect.width),
        };
        let dy = match self.vertical {
            VAlign::Top => 0.0,
            VAlign::Center => f64::from(rect.height) / 2.0,
            VAlign::Bottom => f64::from(rect.height),
        };
        (
            round_px(f64::from(rect.x) + dx),
            round_px(f64::from(rect.y) + dy),
        )
    }
}

/// Vertical placement of a two-line text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackedLines {
    /// Top of the first line.
    pub first_y: i32,
    /// Top of the second line.
    pub second_y: i32,
    /// Height of the whole block.
    pub block_height: i32,
}

/// Position two stacked lines of the given font sizes inside `rect`.
///
/// The vertical anchor applies to the block as a whole, so a centered block
/// is centered as a unit rather than line by line.
#[must_use]
pub fn stack_lines(rect: Rect, vertical: VAlign, first_size: i32, second_size: i32) -> StackedLines {
    let block_height = first_size
        .saturating_add(second_size)
        .saturating_add(STACK_LINE_GAP);
    let first_y = match vertical {
        VAlign::Top => rect.y,
        VAlign::Center => round_px(
            f64::from(rect.y) + (f64::from(rect.height) - f64::from(block_height)) / 2.0,
        ),
        VAlign::Bottom => rect.bottom().saturating_sub(block_height),
    };
    StackedLines {
        first_y,
        second_y: first_y
            .saturating_add(first_size)
            .saturating_add(STACK_LINE_GAP),
        block_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_defaults_to_center() {
        assert_eq!(Alignment::parse(""), Alignment::CENTER);
        assert_eq!(Alignment::parse("center"), Alignment::CENTER);
    }

    #[test]
    fn test_parse_combinations() {
        assert_eq!(
            Alignment::parse("TOP_LEFT"),
            Alignment::new(HAlign::Left, VAlign::Top)
        );
        assert_eq!(
            Alignment::parse("bottom_center"),
            Alignment::new(HAlign::Center, VAlign::Bottom)
        );
        assert_eq!(
            Alignment::parse("CENTER_RIGHT"),
            Alignment::new(HAlign::Right, VAlign::Center)
        );
    }

    #[test]
    fn test_renderings_for_top_right() {
        let align = Alignment::parse("TOP_RIGHT");
        assert_eq!(align.anchor_code(), "tr");
        assert_eq!(align.text_align_constant(), "TextAlign::TOP_RIGHT");
        assert_eq!(align.gui_text_align(), "RIGHT");
        assert_eq!(align.flex().css(FlexDirection::Row), ("flex-end", "flex-start"));
        assert_eq!(align.flex().css(FlexDirection::Column), ("flex-start", "flex-end"));
    }

    #[test]
    fn test_center_constant_is_bare() {
        assert_eq!(Alignment::CENTER.text_align_constant(), "TextAlign::CENTER");
        assert_eq!(Alignment::CENTER.anchor_code(), "mc");
    }

    #[test]
    fn test_bad_codes_rejected() {
        assert_eq!(Alignment::from_anchor_code("xx"), None);
        assert_eq!(Alignment::from_anchor_code("tlx"), None);
        assert_eq!(Alignment::from_text_align_constant("TextAlign::CENTER_CENTER"), None);
        assert_eq!(Alignment::from_text_align_constant("TOP_LEFT"), None);
    }

    #[test]
    fn test_anchor_point_rounds() {
        let rect = Rect::new(10, 10, 101, 31);
        assert_eq!(Alignment::CENTER.anchor_point(rect), (61, 26));
        assert_eq!(Alignment::parse("BOTTOM_RIGHT").anchor_point(rect), (111, 41));
        assert_eq!(Alignment::TOP_LEFT.anchor_point(rect), (10, 10));
    }

    #[test]
    fn test_stack_lines_centers_block() {
        let rect = Rect::new(0, 0, 120, 50);
        let lines = stack_lines(rect, VAlign::Center, 28, 16);
        assert_eq!(lines.block_height, 46);
        assert_eq!(lines.first_y, 2);
        assert_eq!(lines.second_y, 32);

        let bottom = stack_lines(rect, VAlign::Bottom, 28, 16);
        assert_eq!(bottom.first_y, 4);
        assert_eq!(stack_lines(rect, VAlign::Top, 28, 16).first_y, 0);
    }

    #[test]
    fn test_stack_lines_saturates_huge_fonts() {
        let rect = Rect::new(0, 0, 120, 50);
        for vertical in [VAlign::Top, VAlign::Center, VAlign::Bottom] {
            let lines = stack_lines(rect, vertical, i32::MAX, i32::MAX);
            assert_eq!(lines.block_height, i32::MAX);
        }
        let far = Rect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(stack_lines(far, VAlign::Bottom, 10, 10).first_y, i32::MAX - 22);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500i32..2000, -500i32..2000, 0i32..1500, 0i32..1500)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_all_renderings_agree_on_anchor(rect in arb_rect(), idx in 0usize..9) {
            let align = Alignment::all()[idx];
            let expected = align.anchor_point(rect);

            let via_flex = Alignment::from_flex(align.flex()).anchor_point(rect);
            let via_code = Alignment::from_anchor_code(&align.anchor_code())
                .map(|a| a.anchor_point(rect));
            let via_constant = Alignment::from_text_align_constant(&align.text_align_constant())
                .map(|a| a.anchor_point(rect));
            let via_keyword = Alignment::parse(&align.keyword()).anchor_point(rect);

            prop_assert_eq!(via_flex, expected);
            prop_assert_eq!(via_code, Some(expected));
            prop_assert_eq!(via_constant, Some(expected));
            prop_assert_eq!(via_keyword, expected);
        }

        #[test]
        fn prop_anchor_point_stays_inside_box(rect in arb_rect(), idx in 0usize..9) {
            let (x, y) = Alignment::all()[idx].anchor_point(rect);
            prop_assert!(x >= rect.x && x <= rect.right());
            prop_assert!(y >= rect.y && y <= rect.bottom());
        }
    }
}

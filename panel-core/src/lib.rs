//! # Panel Core
//!
//! Widget model and the geometry/style algebra shared by every export target.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 panel-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Widget Model     │  Geometry Algebra       │
//! │  - Layout/Pages   │  - Alignment renderings │
//! │  - Widgets        │  - Anchor points        │
//! │  - Typed props    │  - Stacked lines        │
//! ├─────────────────────────────────────────────┤
//! │  Style Algebra                              │
//! │  - theme_auto / transparent colors          │
//! │  - Opacity, font requests, time formats     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod geometry;
pub mod layout;
pub mod style;
pub mod widget;

pub use error::{LayoutError, LayoutResult};
pub use geometry::{
    round_px, stack_lines, Alignment, FlexAlign, FlexAnchor, FlexDirection, HAlign, Rect,
    StackedLines, VAlign, STACK_LINE_GAP,
};
pub use layout::{Layout, LayoutSettings, Orientation, Page};
pub use style::{
    color_rgb, effective_color, format_opacity, resolve_color, theme_default, ColorRole,
    FontRequest, TimeFormat, THEME_AUTO, TRANSPARENT,
};
pub use widget::{PropMap, VisibilityCondition, Widget};

/// Panel core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

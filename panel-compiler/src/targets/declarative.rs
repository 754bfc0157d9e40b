//! Declarative targets: JSON draw lists for remotely rendered panels.
//!
//! Every instruction is fully resolved: absolute pixel coordinates, literal
//! colors and font files. Instructions keep the widget order of the page.

use panel_core::{Layout, Page, Widget};
use serde::{Deserialize, Serialize};

use super::{CompiledOutput, TargetEmitter};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::{DeclarativeFlavor, Target, WidgetPlugin};

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawInstruction {
    /// A line of text drawn at an anchor point.
    Text {
        /// Literal text or a template expression.
        value: String,
        /// Anchor X.
        x: i32,
        /// Anchor Y.
        y: i32,
        /// Font size in pixels.
        size: u32,
        /// Text color.
        color: String,
        /// Two-letter anchor code (`lt`, `mm`, ...).
        anchor: String,
        /// Font file.
        font: String,
        /// Horizontal alignment of wrapped lines.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<String>,
        /// Wrap width.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<i32>,
        /// Line spacing for wrapped text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spacing: Option<i32>,
    },
    /// A circle around a center point.
    Circle {
        /// Center X.
        x: i32,
        /// Center Y.
        y: i32,
        /// Radius.
        radius: i32,
        /// Fill color, `None` for an unfilled circle.
        fill: Option<String>,
        /// Outline color.
        outline: String,
        /// Outline width.
        width: u32,
    },
    /// An axis-aligned rectangle.
    Rectangle {
        /// Left edge.
        x_start: i32,
        /// Top edge.
        y_start: i32,
        /// Right edge.
        x_end: i32,
        /// Bottom edge.
        y_end: i32,
        /// Fill color, `None` for an unfilled rectangle.
        fill: Option<String>,
        /// Outline color.
        outline: String,
        /// Outline width.
        width: u32,
        /// Corner radius.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<u32>,
        /// Visibility flag required by some renderers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
    /// An ellipse inscribed in a box.
    Ellipse {
        /// Left edge.
        x_start: i32,
        /// Top edge.
        y_start: i32,
        /// Right edge.
        x_end: i32,
        /// Bottom edge.
        y_end: i32,
        /// Fill color, `None` for an unfilled ellipse.
        fill: Option<String>,
        /// Outline color.
        outline: String,
        /// Outline width.
        width: u32,
        /// Visibility flag required by some renderers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
    /// A straight line.
    Line {
        /// Start X.
        x_start: i32,
        /// Start Y.
        y_start: i32,
        /// End X.
        x_end: i32,
        /// End Y.
        y_end: i32,
        /// Stroke color.
        fill: String,
        /// Stroke width.
        width: u32,
    },
}

impl DrawInstruction {
    /// Instruction type name as serialized.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Circle { .. } => "circle",
            Self::Rectangle { .. } => "rectangle",
            Self::Ellipse { .. } => "ellipse",
            Self::Line { .. } => "line",
        }
    }
}

/// One page of draw instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativePage {
    /// Page index.
    pub id: usize,
    /// Page name.
    pub name: String,
    /// Instructions in paint order.
    pub instructions: Vec<DrawInstruction>,
}

/// Complete declarative output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeDocument {
    /// Dialect the instructions were built for.
    pub flavor: DeclarativeFlavor,
    /// Pages in display order.
    pub pages: Vec<DeclarativePage>,
}

impl DeclarativeDocument {
    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// All instructions across pages, in order.
    pub fn instructions(&self) -> impl Iterator<Item = &DrawInstruction> {
        self.pages.iter().flat_map(|p| p.instructions.iter())
    }
}

/// Collects draw instructions per page.
pub(crate) struct DeclarativeEmitter {
    flavor: DeclarativeFlavor,
    pages: Vec<DeclarativePage>,
}

impl DeclarativeEmitter {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            flavor: target.declarative_flavor().unwrap_or(DeclarativeFlavor::Oepl),
            pages: Vec::new(),
        }
    }
}

impl TargetEmitter for DeclarativeEmitter {
    fn begin_page(&mut self, index: usize, page: &Page) {
        self.pages.push(DeclarativePage {
            id: index,
            name: page.name.clone(),
            instructions: Vec::new(),
        });
    }

    fn emit_widget(
        &mut self,
        plugin: &dyn WidgetPlugin,
        widget: &Widget,
        ctx: &mut ExportContext,
    ) -> ExportResult<()> {
        let instructions = plugin.export_declarative(widget, self.flavor, ctx)?;
        if let Some(page) = self.pages.last_mut() {
            page.instructions.extend(instructions);
        }
        Ok(())
    }

    fn finish(self: Box<Self>, _layout: &Layout, _ctx: &ExportContext) -> CompiledOutput {
        CompiledOutput::Declarative(DeclarativeDocument {
            flavor: self.flavor,
            pages: self.pages,
        })
    }
}

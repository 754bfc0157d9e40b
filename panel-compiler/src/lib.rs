//! # Panel Compiler
//!
//! Compiles widget layouts into device configuration for four targets and
//! reads procedural output back into a layout.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐      ┌────────────────────────────────────────────────┐
//! │  Layout  │ ───► │ Compiler: plugin registry + per-compile context│
//! └──────────┘      └───────┬───────────────┬───────────────┬────────┘
//!                           ▼               ▼               ▼
//!                   ┌──────────────┬──────────────┬───────────────────┐
//!                   │ Procedural   │ Retained GUI │ Declarative       │
//!                   │ lambda text  │ node tree    │ OEPL / OpenDisplay│
//!                   └──────┬───────┴──────────────┴───────────────────┘
//!                          │ markers
//!                          ▼
//!                   ┌──────────────┐
//!                   │   Reparser   │ ───► Layout
//!                   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod dispatch;
pub mod error;
pub mod marker;
pub mod plugin;
pub mod plugins;
pub mod reparse;
pub mod target;
pub mod targets;

pub use context::{CompileOptions, ExportContext};
pub use dispatch::{CompileReport, Compiler, Diagnostic};
pub use error::{ExportError, ExportResult};
pub use marker::Marker;
pub use plugin::{Capability, PluginDescriptor, PluginRegistry, RenderHint, WidgetPlugin};
pub use reparse::{ReparseResult, Reparser};
pub use target::{DeclarativeFlavor, ParseTargetError, Target};
pub use targets::{
    CompiledOutput, DeclarativeDocument, DeclarativePage, DrawInstruction, RetainedDocument,
    RetainedNode, RetainedPage,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

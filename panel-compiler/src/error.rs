//! Export error types.

use panel_core::LayoutError;
use thiserror::Error;

/// Result type for plugin and emitter operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors a plugin can raise while exporting one widget.
///
/// None of these abort a compile. The dispatcher turns each one into a
/// [`Diagnostic`](crate::Diagnostic) and drops the widget from that target.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The property bag does not decode into the plugin's typed properties.
    #[error(transparent)]
    Props(#[from] LayoutError),

    /// A property decoded but holds a value the plugin cannot render.
    #[error("Invalid value for {field} on widget {widget}: {message}")]
    InvalidValue {
        /// Offending widget ID.
        widget: String,
        /// Property name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The widget needs an external data source that is not set.
    #[error("Widget {0} has no entity")]
    MissingEntity(String),

    /// Output serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

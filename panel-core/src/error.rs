//! Error types for layout model operations.

use thiserror::Error;

/// Result type for layout model operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that can occur while editing or decoding a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Widget not found on the page.
    #[error("Widget not found: {0}")]
    WidgetNotFound(String),

    /// A widget with the same ID already exists on the page.
    #[error("Duplicate widget id on page: {0}")]
    DuplicateWidget(String),

    /// Page index out of range.
    #[error("Page not found: {0}")]
    PageNotFound(usize),

    /// The widget's property bag does not fit the plugin's typed properties.
    #[error("Invalid properties for widget {widget}: {source}")]
    InvalidProps {
        /// Offending widget ID.
        widget: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

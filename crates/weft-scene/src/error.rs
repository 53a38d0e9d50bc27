//! Reasons an editor action is refused.

use thiserror::Error;
use weft_ir::{MarkupError, TreeError};

/// Result type for editor transitions.
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Tag name is empty or not an HTML-style name.
    #[error("invalid tag name: {0:?}")]
    InvalidTag(String),

    /// Text edits target a void or replaced element.
    #[error("<{tag}> cannot hold text content")]
    TextNotAllowed { tag: String },

    /// CSS property name is empty.
    #[error("invalid property name: {0:?}")]
    InvalidProperty(String),

    #[error("property {name} needs a value")]
    EmptyValue { name: String },

    /// Value would close its rule or spill into another declaration.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    /// Resize delta or viewport width is not a finite number.
    #[error("invalid pane size: {0}")]
    InvalidPaneSize(f64),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Markup(#[from] MarkupError),
}

//! Document model for Weft: element trees, selector-scoped CSS rules, and the
//! markup bridge between them.

pub mod css;
pub mod diagnostics;
pub mod error;
pub mod html;
pub mod logic;
pub mod seed;
pub mod tree;

pub use css::{
    CssRule, Declarations, RuleOrigin, RuleStore, ScopingMode, is_well_formed_declaration,
    parse_css_text, scoped_rules, to_css_text,
};
pub use error::{MarkupError, TreeError};
pub use html::{ParseOptions, parse, parse_with, reconcile, reconcile_with, serialize};
pub use logic::{TreeOp, apply_ops};
pub use tree::{ElementNode, InsertPosition, NodeId};

//! Markup bridge: tree → HTML text and HTML text → tree.

mod parse;
mod serialize;

pub use parse::{ParseOptions, parse, parse_with, reconcile, reconcile_with};
pub use serialize::{escape_attr, escape_text, serialize};

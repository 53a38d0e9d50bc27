//! Selector-scoped CSS rules.
//!
//! Rules are a flat list keyed by selector text. Nothing here evaluates
//! selectors against the tree; a rule is associated with a node only through
//! the literal id appearing in its selector (see [`ScopingMode`]).

use serde::{Deserialize, Serialize};

mod declarations;
mod scope;
mod store;
mod text;

pub use declarations::Declarations;
pub use scope::{ScopingMode, scoped_rules};
pub use store::RuleStore;
pub use text::{is_well_formed_declaration, parse_css_text, to_css_text};

/// Advisory label describing where a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    Inline,
    Class,
    Id,
    External,
    Inherited,
}

impl RuleOrigin {
    /// Guesses the origin from the leading character of a selector.
    pub fn infer(selector: &str) -> Self {
        match selector.trim_start().chars().next() {
            Some('#') => RuleOrigin::Id,
            Some('.') => RuleOrigin::Class,
            _ => RuleOrigin::External,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleOrigin::Inline => "inline",
            RuleOrigin::Class => "class",
            RuleOrigin::Id => "id",
            RuleOrigin::External => "external",
            RuleOrigin::Inherited => "inherited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRule {
    pub selector: String,
    #[serde(default)]
    pub properties: Declarations,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<RuleOrigin>,
}

impl CssRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            properties: Declarations::new(),
            origin: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(name, value);
        self
    }

    pub fn with_origin(mut self, origin: RuleOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_inferred_from_selector() {
        assert_eq!(RuleOrigin::infer("#main"), RuleOrigin::Id);
        assert_eq!(RuleOrigin::infer("  .card p"), RuleOrigin::Class);
        assert_eq!(RuleOrigin::infer("body"), RuleOrigin::External);
    }

    #[test]
    fn rule_json_shape() {
        let rule = CssRule::new("#3")
            .with_property("color", "blue")
            .with_origin(RuleOrigin::Inline);
        let json = serde_json::to_string(&rule).expect("serialize rule");
        assert_eq!(
            json,
            r##"{"selector":"#3","properties":{"color":"blue"},"origin":"inline"}"##
        );
        let bare: CssRule = serde_json::from_str(r#"{"selector":"p"}"#).expect("parse rule");
        assert!(bare.properties.is_empty());
        assert_eq!(bare.origin, None);
    }
}

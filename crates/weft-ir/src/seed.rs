//! Sample document and rules the editor starts with.

use tracing::warn;

use crate::css::CssRule;
use crate::tree::ElementNode;

const SAMPLE_TREE_JSON: &str = include_str!("../seed/sample_tree.json");
const INITIAL_RULES_JSON: &str = include_str!("../seed/initial_rules.json");

/// `html#1 > body#2 > div#3.container > [h1#4.title, p#5]`.
pub fn sample_tree() -> Vec<ElementNode> {
    serde_json::from_str(SAMPLE_TREE_JSON).unwrap_or_else(|err| {
        warn!(%err, "embedded sample tree is invalid");
        Vec::new()
    })
}

pub fn initial_rules() -> Vec<CssRule> {
    serde_json::from_str(INITIAL_RULES_JSON).unwrap_or_else(|err| {
        warn!(%err, "embedded rules are invalid");
        Vec::new()
    })
}

/// Starter document for "new": `div.container > p`, with fresh ids.
pub fn starter_template() -> Vec<ElementNode> {
    vec![
        ElementNode::with_generated_id("div")
            .with_classes(["container"])
            .with_children(vec![ElementNode::with_generated_id("p")]),
    ]
}

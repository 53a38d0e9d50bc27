//! Element tree model.
//!
//! Trees are plain `Vec<ElementNode>` forests. Mutation helpers in
//! [`mutation`] never edit in place; they return a rebuilt forest so callers
//! can keep the previous snapshot around.

use std::time::{SystemTime, UNIX_EPOCH};

use nanoid::nanoid;
use serde::{Deserialize, Serialize};

pub mod mutation;

pub use mutation::{
    InsertPosition, add_child, add_root, contains_id, find_node, insert_node, node_count,
    node_path, remove_node, set_text_content, try_add_child, try_insert_node, try_remove_node,
    try_set_text_content, walk,
};

pub type NodeId = String;

/// Tags whose elements never carry text content.
const TEXTLESS_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "iframe", "canvas", "audio", "video",
];

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// One markup element and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Internal identity used for selection, hover and id scoping.
    pub id: NodeId,
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// The HTML `id` attribute. Distinct from [`ElementNode::id`].
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_attr: Option<String>,
    /// Direct text only, never concatenated from descendants.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(id: impl Into<NodeId>, tag: impl Into<String>) -> Self {
        let tag: String = tag.into();
        Self {
            id: id.into(),
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            id_attr: None,
            text_content: None,
            children: Vec::new(),
        }
    }

    /// Creates a node with a freshly generated id.
    pub fn with_generated_id(tag: impl Into<String>) -> Self {
        Self::new(generate_node_id(), tag)
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_id_attr(mut self, id_attr: impl Into<String>) -> Self {
        let id_attr: String = id_attr.into();
        self.id_attr = (!id_attr.is_empty()).then_some(id_attr);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text: String = text.into();
        self.text_content = (!text.is_empty()).then_some(text);
        self
    }

    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// False for void and replaced elements such as `img` or `br`.
    pub fn accepts_text(&self) -> bool {
        !TEXTLESS_TAGS.contains(&self.tag.as_str())
    }

    /// Space-joined class list, or `None` when there are no classes.
    pub fn class_attr(&self) -> Option<String> {
        if self.classes.is_empty() {
            None
        } else {
            Some(self.classes.join(" "))
        }
    }

    /// Text content when it has at least one non-whitespace character.
    pub fn visible_text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Generates a node id: unix milliseconds followed by five random base36
/// characters.
pub fn generate_node_id() -> NodeId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("{millis}{}", nanoid!(5, &ID_ALPHABET))
}

/// Checks that `tag` looks like an HTML tag name: ASCII letter first, then
/// letters, digits or `-`.
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

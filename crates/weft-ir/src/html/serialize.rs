use std::borrow::Cow;

use crate::tree::ElementNode;

/// Elements whose text the HTML parser reads raw, without entity decoding.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Serializes a forest into markup.
///
/// Each node becomes `<tag id=".." class="..">text children</tag>`. Void
/// elements are not special-cased and still get a closing tag. Whitespace is
/// not preserved between elements.
pub fn serialize(nodes: &[ElementNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &ElementNode) {
    out.push('<');
    out.push_str(&node.tag);
    if let Some(id_attr) = &node.id_attr {
        out.push_str(" id=\"");
        out.push_str(&escape_attr(id_attr));
        out.push('"');
    }
    if let Some(class) = node.class_attr() {
        out.push_str(" class=\"");
        out.push_str(&escape_attr(&class));
        out.push('"');
    }
    out.push('>');
    if let Some(text) = &node.text_content {
        if RAW_TEXT_TAGS.contains(&node.tag.as_str()) {
            out.push_str(text);
        } else {
            out.push_str(&escape_text(text));
        }
    }
    for child in &node.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

/// Escapes `&`, `"` and `<` for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape(value, |ch| match ch {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '<' => Some("&lt;"),
        _ => None,
    })
}

/// Escapes `&`, `<` and `>` for use as element text.
pub fn escape_text(value: &str) -> Cow<'_, str> {
    escape(value, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

fn escape(value: &str, replacement: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    if !value.chars().any(|ch| replacement(ch).is_some()) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match replacement(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_attributes_text_and_children() {
        let tree = vec![
            ElementNode::new("1", "div")
                .with_id_attr("main")
                .with_classes(["a", "b"])
                .with_text("Hi")
                .with_children(vec![ElementNode::new("2", "p")]),
        ];
        assert_eq!(
            serialize(&tree),
            r#"<div id="main" class="a b">Hi<p></p></div>"#
        );
    }

    #[test]
    fn void_elements_still_close() {
        let tree = vec![ElementNode::new("1", "img"), ElementNode::new("2", "br")];
        assert_eq!(serialize(&tree), "<img></img><br></br>");
    }

    #[test]
    fn unsafe_characters_are_escaped() {
        let tree = vec![
            ElementNode::new("1", "p")
                .with_classes([r#"x"y"#])
                .with_text("a < b & c"),
        ];
        assert_eq!(
            serialize(&tree),
            r#"<p class="x&quot;y">a &lt; b &amp; c</p>"#
        );
    }

    #[test]
    fn style_text_is_written_raw() {
        let tree = vec![ElementNode::new("1", "style").with_text("a > b { color: red }")];
        assert_eq!(serialize(&tree), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn escape_borrows_clean_input() {
        assert!(matches!(escape_text("plain"), Cow::Borrowed("plain")));
    }
}

//! Live preview document.
//!
//! The preview is a pure function of the tree, the rules and the
//! selection/hover ids. It is rebuilt in full on every change and handed to a
//! sandboxed surface that runs no scripts and loads nothing external.

use tracing::debug;
use weft_ir::html::{escape_attr, escape_text};
use weft_ir::tree::is_valid_tag_name;
use weft_ir::{CssRule, ElementNode, to_css_text};

/// Elements that have no closing tag and no content.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Raw text elements; their text is written unescaped with `</` broken up.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Forbids scripts, network access, form submission and base rewriting.
/// Styles are limited to the inline `<style>` block and `style` attributes.
const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; style-src 'unsafe-inline'; \
     img-src data:; font-src data:; form-action 'none'; base-uri 'none'";

/// Colors and text used by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    pub accent_color: String,
    pub ring_color: String,
    pub surface_color: String,
    pub placeholder_text: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        (&weft_config::PreviewConfig::default()).into()
    }
}

impl From<&weft_config::PreviewConfig> for PreviewConfig {
    fn from(config: &weft_config::PreviewConfig) -> Self {
        Self {
            accent_color: config.accent_color.clone(),
            ring_color: config.ring_color.clone(),
            surface_color: config.surface_color.clone(),
            placeholder_text: config.placeholder_text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// The tree is empty; no surface is built.
    Placeholder(String),
    Surface(PreviewSurface),
}

impl Preview {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Preview::Placeholder(_))
    }

    pub fn surface(&self) -> Option<&PreviewSurface> {
        match self {
            Preview::Surface(surface) => Some(surface),
            Preview::Placeholder(_) => None,
        }
    }
}

/// A complete self-contained preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSurface {
    document: String,
}

impl PreviewSurface {
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_document(self) -> String {
        self.document
    }

    /// Embeds the document in an iframe with an empty sandbox token list:
    /// no scripts, forms, popups, same-origin access or top navigation.
    pub fn iframe_markup(&self) -> String {
        format!(
            "<iframe sandbox=\"\" title=\"Preview\" srcdoc=\"{}\"></iframe>",
            escape_attr(&self.document)
        )
    }
}

/// Builds the preview for the current state. Selection wins over hover when
/// both point at the same node.
pub fn render(
    tree: &[ElementNode],
    rules: &[CssRule],
    selected: Option<&str>,
    hovered: Option<&str>,
    config: &PreviewConfig,
) -> Preview {
    if tree.is_empty() {
        return Preview::Placeholder(config.placeholder_text.clone());
    }

    let highlight = Highlight {
        selected,
        hovered,
        config,
    };
    let mut body = String::new();
    for node in tree {
        write_node(&mut body, node, &highlight);
    }

    let mut style = format!(
        "body {{ margin: 0; padding: 16px; background: {}; }}\n",
        config.surface_color
    );
    style.push_str(&to_css_text(rules));

    let mut document = String::with_capacity(body.len() + style.len() + 256);
    document.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    document.push_str("<meta http-equiv=\"Content-Security-Policy\" content=\"");
    document.push_str(CONTENT_SECURITY_POLICY);
    document.push_str("\"><style>\n");
    document.push_str(&neutralize_close_tags(&style));
    document.push_str("\n</style></head><body>");
    document.push_str(&body);
    document.push_str("</body></html>");

    debug!(bytes = document.len(), rules = rules.len(), "preview rebuilt");
    Preview::Surface(PreviewSurface { document })
}

/// The inline style overlay for one node.
pub fn overlay_style(
    node_id: &str,
    selected: Option<&str>,
    hovered: Option<&str>,
    config: &PreviewConfig,
) -> Option<String> {
    if selected == Some(node_id) {
        Some(format!(
            "outline: 2px solid {}; box-shadow: 0 0 0 1px {}, 0 0 0 4px {}",
            config.accent_color, config.surface_color, config.ring_color
        ))
    } else if hovered == Some(node_id) {
        Some(format!("outline: 1px dashed {}", config.accent_color))
    } else {
        None
    }
}

struct Highlight<'a> {
    selected: Option<&'a str>,
    hovered: Option<&'a str>,
    config: &'a PreviewConfig,
}

fn write_node(out: &mut String, node: &ElementNode, highlight: &Highlight<'_>) {
    let tag = preview_tag(&node.tag);
    out.push('<');
    out.push_str(tag);
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
    if let Some(style) = overlay_style(
        &node.id,
        highlight.selected,
        highlight.hovered,
        highlight.config,
    ) {
        out.push_str(" style=\"");
        out.push_str(&escape_attr(&style));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&tag) {
        return;
    }
    if let Some(text) = node.visible_text() {
        if RAW_TEXT_TAGS.contains(&tag) {
            out.push_str(&neutralize_close_tags(text));
        } else {
            out.push_str(&escape_text(text));
        }
    }
    for child in &node.children {
        write_node(out, child, highlight);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// `html` and `body` would collide with the preview's own shell, and names
/// that are not valid tags cannot be emitted, so both render as `div`.
fn preview_tag(tag: &str) -> &str {
    match tag {
        "html" | "body" => "div",
        _ if is_valid_tag_name(tag) => tag,
        _ => "div",
    }
}

fn neutralize_close_tags(text: &str) -> String {
    text.replace("</", "<\\/")
}

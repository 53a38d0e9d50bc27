use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Deref;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, warn};

use crate::diagnostics::diagnostics_enabled;
use crate::error::MarkupError;
use crate::tree::{ElementNode, generate_node_id};

/// Limits applied before and during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_markup_bytes: usize,
    /// Elements nested deeper than this are dropped with their subtrees.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_markup_bytes: 2 * 1024 * 1024,
            max_depth: 256,
        }
    }
}

/// Parses markup into a fresh forest. Nodes without an `id` attribute get
/// newly generated ids, so two parses of the same text differ in identity.
///
/// An empty result means nothing usable was parsed.
pub fn parse(markup: &str) -> Vec<ElementNode> {
    reconcile(&[], markup)
}

pub fn parse_with(markup: &str, options: &ParseOptions) -> Result<Vec<ElementNode>, MarkupError> {
    reconcile_with(&[], markup, options)
}

/// Parses markup and carries ids over from `previous` by structural
/// position, so unchanged regions keep their identity across edits.
///
/// Errors are logged and reported as an empty forest.
pub fn reconcile(previous: &[ElementNode], markup: &str) -> Vec<ElementNode> {
    reconcile_with(previous, markup, &ParseOptions::default()).unwrap_or_else(|err| {
        warn!(%err, "markup rejected");
        Vec::new()
    })
}

pub fn reconcile_with(
    previous: &[ElementNode],
    markup: &str,
    options: &ParseOptions,
) -> Result<Vec<ElementNode>, MarkupError> {
    if markup.len() > options.max_markup_bytes {
        return Err(MarkupError::TooLarge {
            len: markup.len(),
            limit: options.max_markup_bytes,
        });
    }

    let mut converter = Converter::new(options);
    let mut nodes = match detect_shell(markup) {
        Shell::Document => {
            let document = Html::parse_document(markup);
            log_parse_errors(&document.errors);
            converter.drop_implicit_head = !has_tag(markup, "head");
            vec![converter.convert_element(document.root_element(), 0)]
        }
        Shell::Body => {
            let document = Html::parse_document(markup);
            log_parse_errors(&document.errors);
            match find_body(&document) {
                Some(body) => vec![converter.convert_element(body, 0)],
                None => Vec::new(),
            }
        }
        Shell::Fragment => {
            let fragment = Html::parse_fragment(markup);
            log_parse_errors(&fragment.errors);
            converter.convert_children(*fragment.root_element(), 0)
        }
    };

    if diagnostics_enabled("html") && converter.dropped > 0 {
        info!(
            dropped = converter.dropped,
            "diagnostics: non-element nodes dropped"
        );
    }

    let claimed: HashSet<String> = collect_id_attrs(&nodes);
    let mut reused = 0usize;
    assign_ids(&mut nodes, previous, &claimed, &mut reused);
    debug!(roots = nodes.len(), reused, "markup reconciled");
    Ok(nodes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shell {
    /// Plain fragment parsed in a `body` context.
    Fragment,
    /// Full document; the `html` element becomes the single root.
    Document,
    /// Document whose `body` element becomes the single root.
    Body,
}

fn detect_shell(markup: &str) -> Shell {
    match first_tag_name(markup).as_deref() {
        Some("html") | Some("!doctype") => Shell::Document,
        Some("body") => Shell::Body,
        _ => Shell::Fragment,
    }
}

/// Lowercased name of the first tag, skipping leading whitespace and
/// comments.
fn first_tag_name(markup: &str) -> Option<String> {
    let mut rest = markup.trim_start();
    while let Some(after) = rest.strip_prefix("<!--") {
        let end = after.find("-->")?;
        rest = after[end + 3..].trim_start();
    }
    let rest = rest.strip_prefix('<')?;
    let name: String = rest
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '!' || *ch == '-')
        .collect();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

/// True when the source contains an opening `<tag` followed by a delimiter,
/// so `<head` matches but `<header` does not.
fn has_tag(markup: &str, tag: &str) -> bool {
    let lower = markup.to_ascii_lowercase();
    let needle = format!("<{tag}");
    lower.match_indices(&needle).any(|(at, _)| {
        matches!(
            lower[at + needle.len()..].chars().next(),
            Some('>') | Some('/') | Some(' ') | Some('\t') | Some('\n') | Some('\r') | None
        )
    })
}

fn find_body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

fn log_parse_errors(errors: &[Cow<'static, str>]) {
    if errors.is_empty() {
        return;
    }
    debug!(count = errors.len(), "markup repaired by parser");
    if diagnostics_enabled("html") {
        for error in errors {
            info!(error = %error, "diagnostics: html parse error");
        }
    }
}

struct Converter<'o> {
    options: &'o ParseOptions,
    drop_implicit_head: bool,
    dropped: usize,
}

impl<'o> Converter<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            drop_implicit_head: false,
            dropped: 0,
        }
    }

    /// Converts one element. Ids are left empty for nodes without an `id`
    /// attribute; [`assign_ids`] fills them in afterwards.
    fn convert_element(&mut self, element: ElementRef<'_>, depth: usize) -> ElementNode {
        let value = element.value();
        let id_attr = value
            .attr("id")
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let classes = value
            .attr("class")
            .map(|class| class.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let text: String = element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(text.deref()),
                _ => None,
            })
            .collect();
        let text = text.trim();

        let children = if depth >= self.options.max_depth {
            warn!(
                depth,
                tag = value.name(),
                "element nesting too deep; children dropped"
            );
            Vec::new()
        } else {
            self.convert_children(*element, depth + 1)
        };

        ElementNode {
            id: id_attr.clone().unwrap_or_default(),
            tag: value.name().to_ascii_lowercase(),
            classes,
            id_attr,
            text_content: (!text.is_empty()).then(|| text.to_string()),
            children,
        }
    }

    fn convert_children(&mut self, parent: NodeRef<'_, Node>, depth: usize) -> Vec<ElementNode> {
        let mut out = Vec::new();
        for child in parent.children() {
            let Some(element) = ElementRef::wrap(child) else {
                if !matches!(child.value(), Node::Text(_)) {
                    self.dropped += 1;
                }
                continue;
            };
            if self.drop_implicit_head && is_implicit_head(element) {
                continue;
            }
            out.push(self.convert_element(element, depth));
        }
        out
    }
}

/// A `head` the parser synthesized: no attributes and no element children.
fn is_implicit_head(element: ElementRef<'_>) -> bool {
    element.value().name() == "head"
        && element.value().attrs().next().is_none()
        && !element
            .children()
            .any(|child| ElementRef::wrap(child).is_some())
}

fn collect_id_attrs(nodes: &[ElementNode]) -> HashSet<String> {
    let mut claimed = HashSet::new();
    crate::tree::walk(nodes, &mut |node, _| {
        if let Some(id_attr) = &node.id_attr {
            claimed.insert(id_attr.clone());
        }
    });
    claimed
}

/// Fills empty ids. A node takes the id of the node at the same child index
/// in `previous` when their tags agree and that id is not claimed by an
/// explicit `id` attribute; otherwise it gets a fresh id.
fn assign_ids(
    nodes: &mut [ElementNode],
    previous: &[ElementNode],
    claimed: &HashSet<String>,
    reused: &mut usize,
) {
    for (index, node) in nodes.iter_mut().enumerate() {
        let counterpart = previous.get(index).filter(|prev| prev.tag == node.tag);
        if node.id.is_empty() {
            node.id = match counterpart {
                Some(prev) if !claimed.contains(&prev.id) => {
                    *reused += 1;
                    prev.id.clone()
                }
                _ => generate_node_id(),
            };
        }
        let previous_children = counterpart
            .map(|prev| prev.children.as_slice())
            .unwrap_or(&[]);
        assign_ids(&mut node.children, previous_children, claimed, reused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_document_shells() {
        assert_eq!(detect_shell("<!DOCTYPE html><html></html>"), Shell::Document);
        assert_eq!(detect_shell("  <!-- c --> <HTML>"), Shell::Document);
        assert_eq!(detect_shell("<body class='x'></body>"), Shell::Body);
        assert_eq!(detect_shell("<div></div>"), Shell::Fragment);
        assert_eq!(detect_shell("just text"), Shell::Fragment);
    }

    #[test]
    fn has_tag_ignores_longer_names() {
        assert!(!has_tag("<header></header>", "head"));
        assert!(has_tag("<HEAD><title>x</title></head>", "head"));
        assert!(has_tag("<head>", "head"));
    }

    #[test]
    fn converts_elements_classes_and_direct_text() {
        let nodes = parse(r#"<div id="a" class="x  y x">Hello <b>bold</b> world</div>"#);
        assert_eq!(nodes.len(), 1);
        let div = &nodes[0];
        assert_eq!(div.id, "a");
        assert_eq!(div.id_attr.as_deref(), Some("a"));
        assert_eq!(div.classes, vec!["x", "y", "x"]);
        assert_eq!(div.text_content.as_deref(), Some("Hello  world"));
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.children[0].tag, "b");
        assert_eq!(div.children[0].text_content.as_deref(), Some("bold"));
    }

    #[test]
    fn comments_and_bare_text_produce_no_nodes() {
        assert!(parse("<!-- only a comment -->").is_empty());
        assert!(parse("plain text").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn empty_id_attribute_is_ignored() {
        let nodes = parse(r#"<p id="">x</p>"#);
        assert_eq!(nodes[0].id_attr, None);
        assert!(!nodes[0].id.is_empty());
    }

    #[test]
    fn malformed_markup_is_repaired() {
        let nodes = parse("<div><p>one<p>two</div>");
        assert_eq!(nodes.len(), 1);
        let tags: Vec<&str> = nodes[0].children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["p", "p"]);
    }

    #[test]
    fn document_shell_keeps_html_and_body_roots() {
        let nodes = parse("<html><body><div class=\"container\"></div></body></html>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag, "html");
        assert_eq!(nodes[0].children.len(), 1, "implicit head dropped");
        assert_eq!(nodes[0].children[0].tag, "body");
        assert_eq!(nodes[0].children[0].children[0].classes, vec!["container"]);
    }

    #[test]
    fn explicit_head_is_kept() {
        let nodes = parse("<html><head></head><body></body></html>");
        let tags: Vec<&str> = nodes[0].children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["head", "body"]);
    }

    #[test]
    fn body_shell_returns_body_root() {
        let nodes = parse("<body class=\"page\"><main></main></body>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag, "body");
        assert_eq!(nodes[0].classes, vec!["page"]);
        assert_eq!(nodes[0].children[0].tag, "main");
    }

    #[test]
    fn reparsing_without_previous_regenerates_ids() {
        let a = parse("<div><p></p></div>");
        let b = parse("<div><p></p></div>");
        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn reconcile_keeps_ids_by_position_and_tag() {
        let first = parse("<div><p></p><span></span></div>");
        let second = reconcile(&first, "<div><p>edited</p><em></em></div>");
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].children[0].id, first[0].children[0].id);
        assert_ne!(second[0].children[1].id, first[0].children[1].id);
    }

    #[test]
    fn reconcile_does_not_reuse_claimed_ids() {
        let previous = vec![ElementNode::new("taken", "p")];
        let nodes = reconcile(&previous, r#"<p></p><p id="taken"></p>"#);
        assert_ne!(nodes[0].id, "taken");
        assert_eq!(nodes[1].id, "taken");
    }

    #[test]
    fn oversize_markup_is_rejected() {
        let options = ParseOptions {
            max_markup_bytes: 4,
            ..ParseOptions::default()
        };
        assert_eq!(
            parse_with("<div></div>", &options),
            Err(MarkupError::TooLarge { len: 11, limit: 4 })
        );
    }

    #[test]
    fn deep_nesting_is_truncated() {
        let options = ParseOptions {
            max_depth: 1,
            ..ParseOptions::default()
        };
        let nodes = parse_with("<div><p><span></span></p></div>", &options).expect("parse");
        assert_eq!(nodes[0].children.len(), 1);
        assert!(nodes[0].children[0].children.is_empty());
    }
}

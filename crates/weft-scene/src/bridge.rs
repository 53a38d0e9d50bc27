//! Text views of the model.
//!
//! The HTML and CSS code views edit plain text. Edits flow back into the
//! store through the parser; parse failures stay here and never reach the
//! model. Text is regenerated from the model only when the model changed
//! underneath it, so a user's formatting survives their own edits.

use tracing::{debug, warn};
use weft_ir::{CssRule, ElementNode, ParseOptions, parse_css_text, reconcile_with, serialize};

use crate::store::{ActionOutcome, EditorAction, EditorState, EditorStore, HtmlPaneView};

#[derive(Debug, Clone, Default)]
pub struct CodeBridge {
    options: ParseOptions,
    html_text: String,
    css_text: String,
    synced_tree: Vec<ElementNode>,
    synced_rules: Vec<CssRule>,
}

impl CodeBridge {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn html_text(&self) -> &str {
        &self.html_text
    }

    pub fn css_text(&self) -> &str {
        &self.css_text
    }

    /// Regenerates text for parts of the model that changed since the last
    /// sync. HTML text is only maintained while the code view is showing.
    /// Returns true when either text was rewritten.
    pub fn refresh(&mut self, state: &EditorState) -> bool {
        let mut rewritten = false;
        if state.html_pane_view == HtmlPaneView::Code && state.tree != self.synced_tree {
            self.html_text = serialize(&state.tree);
            self.synced_tree = state.tree.clone();
            rewritten = true;
        }
        if state.rules.rules() != self.synced_rules.as_slice() {
            self.css_text = state.rules.to_css_text();
            self.synced_rules = state.rules.rules().to_vec();
            rewritten = true;
        }
        rewritten
    }

    /// Switches the HTML pane to the code view and fills it from the tree.
    pub fn open_code_view(&mut self, store: &mut EditorStore) -> ActionOutcome {
        let outcome = store.dispatch(EditorAction::SetHtmlPaneView {
            view: HtmlPaneView::Code,
        });
        self.html_text = serialize(&store.state().tree);
        self.synced_tree = store.state().tree.clone();
        outcome
    }

    /// Applies edited markup. An empty parse leaves the tree alone; oversize
    /// markup is refused. Ids are carried over from the current tree by
    /// position.
    pub fn apply_html_edit(&mut self, store: &mut EditorStore, markup: &str) -> ActionOutcome {
        self.html_text = markup.to_string();
        let nodes = match reconcile_with(&store.state().tree, markup, &self.options) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, "markup edit refused");
                return ActionOutcome::Rejected(err.into());
            }
        };
        if nodes.is_empty() {
            debug!("markup edit parsed to nothing; tree kept");
            return ActionOutcome::Unchanged;
        }
        let outcome = store.dispatch(EditorAction::ReplaceTree { tree: nodes });
        self.synced_tree = store.state().tree.clone();
        outcome
    }

    /// Applies edited CSS. Text that yields no rules is ignored unless it
    /// is blank, which clears the rules.
    pub fn apply_css_edit(&mut self, store: &mut EditorStore, css: &str) -> ActionOutcome {
        self.css_text = css.to_string();
        let rules = parse_css_text(css);
        if rules.is_empty() && !css.trim().is_empty() {
            debug!("css edit parsed to nothing; rules kept");
            return ActionOutcome::Unchanged;
        }
        let outcome = store.dispatch(EditorAction::SetRules { rules });
        self.synced_rules = store.state().rules.rules().to_vec();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use weft_ir::ScopingMode;

    fn store() -> EditorStore {
        EditorStore::new(EditorState::seeded(ScopingMode::Substring))
    }

    #[test]
    fn code_view_shows_serialized_tree() {
        let mut store = store();
        let mut bridge = CodeBridge::default();
        assert!(bridge.open_code_view(&mut store).is_applied());
        assert_eq!(
            bridge.html_text(),
            concat!(
                r#"<html><body><div class="container">"#,
                r#"<h1 class="title"></h1><p></p></div></body></html>"#,
            )
        );
    }

    #[test]
    fn html_edit_keeps_ids_and_user_text() {
        let mut store = store();
        let mut bridge = CodeBridge::default();
        bridge.open_code_view(&mut store);

        let edited = concat!(
            "<html>\n<body><div class=\"container\">",
            "<h1 class=\"title\">Hello</h1><p></p></div></body></html>",
        );
        assert!(bridge.apply_html_edit(&mut store, edited).is_applied());
        let h1 = weft_ir::tree::find_node(&store.state().tree, "4").expect("h1 keeps id");
        assert_eq!(h1.text_content.as_deref(), Some("Hello"));

        bridge.refresh(store.state());
        assert_eq!(bridge.html_text(), edited, "own edit is not reformatted");
    }

    #[test]
    fn empty_parse_keeps_previous_tree() {
        let mut store = store();
        let before = store.state().tree.clone();
        let mut bridge = CodeBridge::default();
        assert_eq!(
            bridge.apply_html_edit(&mut store, "<!-- nothing here -->"),
            ActionOutcome::Unchanged
        );
        assert_eq!(store.state().tree, before);
    }

    #[test]
    fn oversize_markup_is_contained() {
        let mut store = store();
        let before = store.state().clone();
        let mut bridge = CodeBridge::new(ParseOptions {
            max_markup_bytes: 8,
            ..ParseOptions::default()
        });
        let outcome = bridge.apply_html_edit(&mut store, "<div>far too long</div>");
        assert!(matches!(
            outcome,
            ActionOutcome::Rejected(EditorError::Markup(_))
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn css_edits_replace_rules_and_refresh_tracks_model() {
        let mut store = store();
        let mut bridge = CodeBridge::default();
        assert!(bridge.refresh(store.state()));
        assert!(bridge.css_text().starts_with("#3 {\n  color: blue;"));

        assert_eq!(
            bridge.apply_css_edit(&mut store, "not css at all"),
            ActionOutcome::Unchanged
        );
        assert!(
            bridge
                .apply_css_edit(&mut store, "#3 { color: green }")
                .is_applied()
        );
        assert_eq!(store.state().rules.rules().len(), 1);
        assert!(!bridge.refresh(store.state()));

        store.dispatch(EditorAction::SelectNode {
            node_id: Some("3".into()),
        });
        store.dispatch(EditorAction::ApplyProperty {
            name: "margin".into(),
            value: "0".into(),
        });
        assert!(bridge.refresh(store.state()));
        assert_eq!(bridge.css_text(), "#3 {\n  color: green;\n  margin: 0;\n}");
    }
}

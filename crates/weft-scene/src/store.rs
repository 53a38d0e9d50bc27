//! Editor state container.
//!
//! [`EditorState`] is an immutable snapshot; every transition builds a new
//! one. [`EditorStore`] owns the current snapshot, applies [`EditorAction`]s
//! and tells subscribed listeners which parts moved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use weft_ir::tree::{self, is_valid_tag_name};
use weft_ir::{CssRule, ElementNode, NodeId, RuleStore, ScopingMode, TreeOp, seed};

use crate::error::{EditorError, Result};
use crate::persistence::{DEFAULT_PANE_SIZES, LayoutPreferences, PaneSizes, Theme, resize_html_pane};

/// Which editor the HTML pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtmlPaneView {
    #[default]
    Tree,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Minimal,
    Full,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Minimal => ViewMode::Full,
            ViewMode::Full => ViewMode::Minimal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub tree: Vec<ElementNode>,
    pub rules: RuleStore,
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
    pub html_pane_view: HtmlPaneView,
    pub view_mode: ViewMode,
    pub theme: Theme,
    pub pane_sizes: PaneSizes,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            tree: Vec::new(),
            rules: RuleStore::default(),
            selected: None,
            hovered: None,
            html_pane_view: HtmlPaneView::default(),
            view_mode: ViewMode::default(),
            theme: Theme::default(),
            pane_sizes: DEFAULT_PANE_SIZES,
        }
    }
}

impl EditorState {
    /// The sample document and rules.
    pub fn seeded(mode: ScopingMode) -> Self {
        Self {
            tree: seed::sample_tree(),
            rules: RuleStore::new(seed::initial_rules()).with_mode(mode),
            ..Self::default()
        }
    }

    /// Replaces the tree. Selection and hover pointing at nodes that no
    /// longer exist are cleared.
    pub fn with_tree(&self, tree: Vec<ElementNode>) -> Self {
        let keep = |id: &Option<NodeId>| id.clone().filter(|id| tree::contains_id(&tree, id));
        Self {
            selected: keep(&self.selected),
            hovered: keep(&self.hovered),
            tree,
            ..self.clone()
        }
    }

    pub fn with_selection(&self, selected: Option<NodeId>) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }

    pub fn with_hover(&self, hovered: Option<NodeId>) -> Self {
        Self {
            hovered,
            ..self.clone()
        }
    }

    pub fn with_rules(&self, rules: RuleStore) -> Self {
        Self {
            rules,
            ..self.clone()
        }
    }

    pub fn with_html_pane_view(&self, html_pane_view: HtmlPaneView) -> Self {
        Self {
            html_pane_view,
            ..self.clone()
        }
    }

    pub fn with_view_mode(&self, view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..self.clone()
        }
    }

    pub fn with_theme(&self, theme: Theme) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }

    pub fn with_pane_sizes(&self, pane_sizes: PaneSizes) -> Self {
        Self {
            pane_sizes,
            ..self.clone()
        }
    }

    pub fn with_layout(&self, prefs: LayoutPreferences) -> Self {
        Self {
            pane_sizes: prefs.pane_sizes,
            theme: prefs.theme,
            ..self.clone()
        }
    }

    pub fn layout(&self) -> LayoutPreferences {
        LayoutPreferences {
            pane_sizes: self.pane_sizes,
            theme: self.theme,
        }
    }

    pub fn selected_node(&self) -> Option<&ElementNode> {
        self.selected
            .as_deref()
            .and_then(|id| tree::find_node(&self.tree, id))
    }

    /// Rules relevant to the current selection.
    pub fn scoped_rules(&self) -> Vec<&CssRule> {
        self.rules.scoped(self.selected.as_deref())
    }

    /// Computes the state after `action`. Pure: `self` is not modified.
    pub fn apply(&self, action: EditorAction) -> Result<EditorState> {
        match action {
            EditorAction::SelectNode { node_id } => {
                let node_id = self.existing(node_id)?;
                Ok(self.with_selection(node_id))
            }
            EditorAction::HoverNode { node_id } => {
                let node_id = self.existing(node_id)?;
                Ok(self.with_hover(node_id))
            }
            EditorAction::AddElement {
                tag,
                id_attr,
                classes,
            } => {
                let tag = tag.trim().to_ascii_lowercase();
                if !is_valid_tag_name(&tag) {
                    return Err(EditorError::InvalidTag(tag));
                }
                let node = ElementNode::with_generated_id(tag)
                    .with_id_attr(id_attr.unwrap_or_default())
                    .with_classes(classes.into_iter().filter(|class| !class.trim().is_empty()));
                let next = match self.selected_node() {
                    Some(parent) => tree::add_child(&self.tree, &parent.id, node),
                    None => tree::add_root(&self.tree, node),
                };
                Ok(self.with_tree(next))
            }
            EditorAction::SetTextContent { node_id, text } => {
                let node = tree::find_node(&self.tree, &node_id)
                    .ok_or_else(|| weft_ir::TreeError::NodeNotFound(node_id.clone()))?;
                if !node.accepts_text() {
                    return Err(EditorError::TextNotAllowed {
                        tag: node.tag.clone(),
                    });
                }
                let next = tree::try_set_text_content(&self.tree, &node_id, text)?;
                Ok(self.with_tree(next))
            }
            EditorAction::EditTree { ops } => {
                let (next, applied) = weft_ir::apply_ops(&self.tree, ops);
                debug!(applied, "tree ops applied");
                Ok(self.with_tree(next))
            }
            EditorAction::ApplyProperty { name, value } => {
                let name = property_name(&name)?;
                let value = value.trim();
                if value.is_empty() {
                    return Err(EditorError::EmptyValue { name });
                }
                if !weft_ir::is_well_formed_declaration(&name, value) {
                    return Err(EditorError::InvalidValue {
                        name,
                        value: value.to_string(),
                    });
                }
                let mut rules = self.rules.clone();
                rules.set_scoped_property(self.selected.as_deref(), &name, value);
                Ok(self.with_rules(rules))
            }
            EditorAction::RemoveProperty { name } => {
                let name = property_name(&name)?;
                let mut rules = self.rules.clone();
                rules.remove_scoped_property(self.selected.as_deref(), &name);
                Ok(self.with_rules(rules))
            }
            EditorAction::ReplaceTree { tree } => Ok(self.with_tree(tree)),
            EditorAction::SetRules { rules } => {
                let mut store = self.rules.clone();
                store.replace_all(rules);
                Ok(self.with_rules(store))
            }
            EditorAction::StartNew => Ok(self
                .with_tree(seed::starter_template())
                .with_selection(None)
                .with_hover(None)),
            EditorAction::SetHtmlPaneView { view } => Ok(self.with_html_pane_view(view)),
            EditorAction::ToggleViewMode => Ok(self.with_view_mode(self.view_mode.toggled())),
            EditorAction::SetTheme { theme } => Ok(self.with_theme(theme)),
            EditorAction::ResizePane {
                delta,
                viewport_width,
            } => {
                if !delta.is_finite() {
                    return Err(EditorError::InvalidPaneSize(delta));
                }
                if !viewport_width.is_finite() {
                    return Err(EditorError::InvalidPaneSize(viewport_width));
                }
                Ok(self.with_pane_sizes(resize_html_pane(self.pane_sizes, delta, viewport_width)))
            }
        }
    }

    fn existing(&self, node_id: Option<NodeId>) -> Result<Option<NodeId>> {
        match node_id {
            Some(id) if !tree::contains_id(&self.tree, &id) => {
                Err(weft_ir::TreeError::NodeNotFound(id).into())
            }
            other => Ok(other),
        }
    }
}

fn property_name(name: &str) -> Result<String> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || name.contains([':', ';', '{', '}']) {
        return Err(EditorError::InvalidProperty(name));
    }
    Ok(name)
}

/// Editor actions.
///
/// Serde uses an internal tag `type` in snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorAction {
    /// Select a node, or clear the selection with `None`.
    SelectNode {
        #[serde(default)]
        node_id: Option<NodeId>,
    },
    HoverNode {
        #[serde(default)]
        node_id: Option<NodeId>,
    },
    /// Append a new element under the selected node, or as a new root when
    /// nothing is selected.
    AddElement {
        tag: String,
        #[serde(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        id_attr: Option<String>,
        #[serde(default)]
        classes: Vec<String>,
    },
    SetTextContent { node_id: NodeId, text: String },
    /// Apply a batch of structural edits; ops with missing targets are skipped.
    EditTree { ops: Vec<TreeOp> },
    /// Set a declaration on the first rule scoped to the selection.
    ApplyProperty { name: String, value: String },
    RemoveProperty { name: String },
    ReplaceTree { tree: Vec<ElementNode> },
    SetRules { rules: Vec<CssRule> },
    /// Replace the tree with the starter template.
    StartNew,
    SetHtmlPaneView { view: HtmlPaneView },
    ToggleViewMode,
    SetTheme { theme: Theme },
    ResizePane { delta: f64, viewport_width: f64 },
}

/// Which parts of the state a transition changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateChange {
    pub tree: bool,
    pub rules: bool,
    pub selection: bool,
    pub hover: bool,
    pub view: bool,
    pub layout: bool,
}

impl StateChange {
    pub fn between(before: &EditorState, after: &EditorState) -> Self {
        Self {
            tree: before.tree != after.tree,
            rules: before.rules != after.rules,
            selection: before.selected != after.selected,
            hover: before.hovered != after.hovered,
            view: before.html_pane_view != after.html_pane_view
                || before.view_mode != after.view_mode,
            layout: before.pane_sizes != after.pane_sizes || before.theme != after.theme,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the preview document must be rebuilt.
    pub fn affects_preview(&self) -> bool {
        self.tree || self.rules || self.selection || self.hover
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied(StateChange),
    /// The action was valid but left the state as it was.
    Unchanged,
    /// The action was refused; the state is untouched.
    Rejected(EditorError),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

/// Receives every applied transition.
pub trait StoreListener {
    fn on_change(&mut self, state: &EditorState, change: StateChange);
}

impl<F> StoreListener for F
where
    F: FnMut(&EditorState, StateChange),
{
    fn on_change(&mut self, state: &EditorState, change: StateChange) {
        self(state, change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

#[derive(Default)]
pub struct EditorStore {
    state: EditorState,
    listeners: Vec<(ListenerId, Box<dyn StoreListener>)>,
    next_listener: usize,
}

impl EditorStore {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn dispatch(&mut self, action: EditorAction) -> ActionOutcome {
        let kind = action_name(&action);
        let next = match self.state.apply(action) {
            Ok(next) => next,
            Err(err) => {
                debug!(action = kind, %err, "action rejected");
                return ActionOutcome::Rejected(err);
            }
        };
        let change = StateChange::between(&self.state, &next);
        if change.is_empty() {
            return ActionOutcome::Unchanged;
        }
        self.state = next;
        info!(action = kind, ?change, "state updated");
        for (_, listener) in &mut self.listeners {
            listener.on_change(&self.state, change);
        }
        ActionOutcome::Applied(change)
    }
}

fn action_name(action: &EditorAction) -> &'static str {
    match action {
        EditorAction::SelectNode { .. } => "select_node",
        EditorAction::HoverNode { .. } => "hover_node",
        EditorAction::AddElement { .. } => "add_element",
        EditorAction::SetTextContent { .. } => "set_text_content",
        EditorAction::EditTree { .. } => "edit_tree",
        EditorAction::ApplyProperty { .. } => "apply_property",
        EditorAction::RemoveProperty { .. } => "remove_property",
        EditorAction::ReplaceTree { .. } => "replace_tree",
        EditorAction::SetRules { .. } => "set_rules",
        EditorAction::StartNew => "start_new",
        EditorAction::SetHtmlPaneView { .. } => "set_html_pane_view",
        EditorAction::ToggleViewMode => "toggle_view_mode",
        EditorAction::SetTheme { .. } => "set_theme",
        EditorAction::ResizePane { .. } => "resize_pane",
    }
}

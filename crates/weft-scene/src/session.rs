//! Wiring of store, code bridge, preview and preferences from configuration.

use tracing::{info, warn};
use weft_config::WeftConfig;
use weft_ir::{ParseOptions, ScopingMode};

use crate::bridge::CodeBridge;
use crate::persistence::{KeyValueStore, LayoutPreferences};
use crate::preview::{self, Preview, PreviewConfig};
use crate::store::{
    ActionOutcome, EditorAction, EditorState, EditorStore, StateChange, StoreListener,
};

pub fn parse_options(config: &weft_config::ParserConfig) -> ParseOptions {
    ParseOptions {
        max_markup_bytes: config.max_markup_bytes,
        max_depth: config.max_depth,
    }
}

/// Configured scoping mode; unknown names fall back to substring matching.
pub fn scoping_mode(config: &weft_config::ScopingConfig) -> ScopingMode {
    ScopingMode::parse(&config.mode).unwrap_or_else(|| {
        warn!(mode = %config.mode, "unknown scoping mode; using substring");
        ScopingMode::default()
    })
}

/// Saves layout preferences whenever pane sizes or the theme change.
pub struct PersistLayout {
    store: Box<dyn KeyValueStore>,
}

impl PersistLayout {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl StoreListener for PersistLayout {
    fn on_change(&mut self, state: &EditorState, change: StateChange) {
        if !change.layout {
            return;
        }
        if let Err(error) = state.layout().save(&mut *self.store) {
            warn!(?error, "failed to persist layout preferences");
        }
    }
}

/// One editing session over the seeded document.
pub struct EditorSession {
    store: EditorStore,
    bridge: CodeBridge,
    preview: PreviewConfig,
}

impl EditorSession {
    pub fn from_config(config: &WeftConfig) -> Self {
        let mode = scoping_mode(&config.scoping);
        info!(?mode, "editor session starting");
        Self {
            store: EditorStore::new(EditorState::seeded(mode)),
            bridge: CodeBridge::new(parse_options(&config.parser)),
            preview: PreviewConfig::from(&config.preview),
        }
    }

    /// Restores layout preferences from `prefs` and keeps them saved there.
    pub fn with_preferences(mut self, prefs: Box<dyn KeyValueStore>) -> Self {
        let layout = LayoutPreferences::load(&*prefs);
        let state = self.store.state().with_layout(layout);
        let mut store = EditorStore::new(state);
        store.subscribe(PersistLayout::new(prefs));
        self.store = store;
        self
    }

    pub fn state(&self) -> &EditorState {
        self.store.state()
    }

    pub fn store_mut(&mut self) -> &mut EditorStore {
        &mut self.store
    }

    pub fn bridge(&self) -> &CodeBridge {
        &self.bridge
    }

    /// Dispatches `action` and brings the code views up to date.
    pub fn dispatch(&mut self, action: EditorAction) -> ActionOutcome {
        let outcome = self.store.dispatch(action);
        self.bridge.refresh(self.store.state());
        outcome
    }

    pub fn open_code_view(&mut self) -> ActionOutcome {
        self.bridge.open_code_view(&mut self.store)
    }

    pub fn edit_html(&mut self, markup: &str) -> ActionOutcome {
        self.bridge.apply_html_edit(&mut self.store, markup)
    }

    pub fn edit_css(&mut self, css: &str) -> ActionOutcome {
        self.bridge.apply_css_edit(&mut self.store, css)
    }

    pub fn preview(&self) -> Preview {
        let state = self.store.state();
        preview::render(
            &state.tree,
            state.rules.rules(),
            state.selected.as_deref(),
            state.hovered.as_deref(),
            &self.preview,
        )
    }
}

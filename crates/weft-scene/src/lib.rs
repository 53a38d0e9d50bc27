//! Editor runtime for Weft: state store, code-view bridge, live preview and
//! layout preferences.

pub mod bridge;
pub mod error;
pub mod persistence;
pub mod preview;
pub mod session;
pub mod store;

pub use bridge::CodeBridge;
pub use error::EditorError;
pub use persistence::{
    FileKeyValueStore, KeyValueStore, LayoutPreferences, MemoryKeyValueStore, Theme,
    resize_html_pane,
};
pub use preview::{Preview, PreviewConfig, PreviewSurface, render};
pub use session::EditorSession;
pub use store::{
    ActionOutcome, EditorAction, EditorState, EditorStore, HtmlPaneView, StateChange,
    StoreListener, ViewMode,
};

use anyhow::Result;
use weft_config::WeftConfig;
use weft_ir::tree;
use weft_scene::{
    ActionOutcome, EditorAction, EditorSession, FileKeyValueStore, HtmlPaneView, KeyValueStore,
    Preview, Theme,
};

fn config_with_prefs(path: &std::path::Path) -> WeftConfig {
    let mut config = WeftConfig::default();
    config.storage.preferences_path = Some(path.to_path_buf());
    config.preview.accent_color = "red".to_string();
    config
}

#[test]
fn select_add_and_preview() {
    let mut session = EditorSession::from_config(&WeftConfig::default());
    session.dispatch(EditorAction::SelectNode {
        node_id: Some("3".into()),
    });
    session.dispatch(EditorAction::AddElement {
        tag: "span".into(),
        id_attr: None,
        classes: vec!["x".into()],
    });

    let container = tree::find_node(&session.state().tree, "3").expect("container");
    assert_eq!(container.children.len(), 3);

    let preview = session.preview();
    let doc = preview.surface().expect("surface").document();
    assert!(doc.contains("<span class=\"x\"></span>"));
    assert!(doc.contains("class=\"container\" style=\"outline: 2px solid"));
    assert!(doc.contains("#3 {\n  color: blue;\n  font-size: 24px;\n}"));
}

#[test]
fn start_new_then_clear_gives_placeholder() {
    let mut session = EditorSession::from_config(&WeftConfig::default());
    session.dispatch(EditorAction::StartNew);
    assert_eq!(
        weft_ir::serialize(&session.state().tree),
        r#"<div class="container"><p></p></div>"#
    );
    session.dispatch(EditorAction::ReplaceTree { tree: vec![] });
    assert_eq!(
        session.preview(),
        Preview::Placeholder("No HTML loaded".into())
    );
}

#[test]
fn code_view_round_trip_keeps_selection() {
    let mut session = EditorSession::from_config(&WeftConfig::default());
    session.dispatch(EditorAction::SelectNode {
        node_id: Some("5".into()),
    });
    assert!(session.open_code_view().is_applied());
    assert_eq!(session.state().html_pane_view, HtmlPaneView::Code);

    let markup = session.bridge().html_text().replace("<p></p>", "<p>Edited</p>");
    assert!(session.edit_html(&markup).is_applied());
    assert_eq!(session.state().selected.as_deref(), Some("5"));
    assert_eq!(
        session.state().selected_node().and_then(|n| n.text_content.clone()),
        Some("Edited".to_string())
    );
}

#[test]
fn css_view_round_trip_keeps_data_urls() {
    let mut session = EditorSession::from_config(&WeftConfig::default());
    session.dispatch(EditorAction::SelectNode {
        node_id: Some("3".into()),
    });
    let background = r#"url("data:image/png;base64,AAAA")"#;
    assert!(
        session
            .dispatch(EditorAction::ApplyProperty {
                name: "background".into(),
                value: background.into(),
            })
            .is_applied()
    );

    let declarations = |current: &EditorSession| {
        current
            .state()
            .rules
            .rules()
            .iter()
            .map(|rule| (rule.selector.clone(), rule.properties.clone()))
            .collect::<Vec<_>>()
    };
    let before = declarations(&session);
    let css = session.bridge().css_text().to_string();
    assert!(css.contains(background));
    assert!(!matches!(session.edit_css(&css), ActionOutcome::Rejected(_)));
    assert_eq!(declarations(&session), before);
    assert_eq!(
        session.state().scoped_rules()[0].properties.get("background"),
        Some(background)
    );
}

#[test]
fn layout_preferences_persist_across_sessions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("preferences.json");
    let config = config_with_prefs(&path);

    {
        let prefs = FileKeyValueStore::open(&config.storage)?;
        let mut session = EditorSession::from_config(&config).with_preferences(Box::new(prefs));
        assert_eq!(session.state().pane_sizes, [320.0, 640.0, 320.0]);
        let outcome = session.dispatch(EditorAction::ResizePane {
            delta: 80.0,
            viewport_width: 1400.0,
        });
        assert!(outcome.is_applied());
        session.dispatch(EditorAction::SetTheme { theme: Theme::Dark });
        assert_eq!(
            session.dispatch(EditorAction::SetTheme { theme: Theme::Dark }),
            ActionOutcome::Unchanged
        );
    }

    let reopened = FileKeyValueStore::open(&config.storage)?;
    assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    let session = EditorSession::from_config(&config).with_preferences(Box::new(reopened));
    assert_eq!(session.state().pane_sizes[0], 400.0);
    assert_eq!(session.state().theme, Theme::Dark);
    Ok(())
}

use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::path::PathBuf;

use weft_config::WeftConfig;
use weft_ir::diagnostics::init_diagnostics;
use weft_scene::{ActionOutcome, EditorAction, EditorSession, FileKeyValueStore, Preview};

const USAGE: &str = "Usage: weft <serialize|rules|css|preview|state> \
[--html <file>] [--css <file>] [--actions <file>] [--select <id>] [--hover <id>] \
[--iframe] [--json] [--out <file>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Tree as markup.
    Serialize,
    /// Rules scoped to the selection.
    Rules,
    /// Every rule as CSS text.
    Css,
    /// The sandboxed preview document.
    Preview,
    /// Tree, selection and layout as JSON.
    State,
}

#[derive(Debug, Default)]
struct Options {
    html: Option<PathBuf>,
    css: Option<PathBuf>,
    actions: Option<PathBuf>,
    select: Option<String>,
    hover: Option<String>,
    iframe: bool,
    json: bool,
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("{USAGE}");
        bail!("missing command");
    }
    let command = match args.remove(0).as_str() {
        "serialize" => Command::Serialize,
        "rules" => Command::Rules,
        "css" => Command::Css,
        "preview" => Command::Preview,
        "state" => Command::State,
        other => {
            eprintln!("{USAGE}");
            bail!("unknown command: {other}");
        }
    };
    let options = parse_options(&args)?;

    let config = WeftConfig::load();
    if let Some(categories) = &config.diagnostics {
        init_diagnostics(categories);
    }

    tracing::debug!(?command, ?options, "running");

    let mut session = open_session(&config)?;
    load_inputs(&mut session, &options)?;

    let output = match command {
        Command::Serialize => weft_ir::serialize(&session.state().tree),
        Command::Css => session.state().rules.to_css_text(),
        Command::Rules => {
            let scoped = session.state().scoped_rules();
            if options.json {
                serde_json::to_string_pretty(&scoped)?
            } else {
                weft_ir::to_css_text(&scoped.into_iter().cloned().collect::<Vec<_>>())
            }
        }
        Command::Preview => match session.preview() {
            Preview::Placeholder(text) => text,
            Preview::Surface(surface) if options.iframe => surface.iframe_markup(),
            Preview::Surface(surface) => surface.into_document(),
        },
        Command::State => {
            let state = session.state();
            serde_json::to_string_pretty(&serde_json::json!({
                "tree": state.tree,
                "selected": state.selected,
                "hovered": state.hovered,
                "paneSizes": state.pane_sizes,
                "theme": state.theme,
            }))?
        }
    };

    match &options.out {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?
        }
        None => println!("{output}"),
    }
    Ok(())
}

/// Builds a session whose layout is restored from, and saved back to, the
/// configured preferences file.
fn open_session(config: &WeftConfig) -> Result<EditorSession> {
    let prefs = FileKeyValueStore::open(&config.storage)
        .context("failed to open layout preferences")?;
    tracing::debug!(path = %prefs.path().display(), "layout preferences opened");
    Ok(EditorSession::from_config(config).with_preferences(Box::new(prefs)))
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--iframe" => options.iframe = true,
            "--json" => options.json = true,
            "--html" | "--css" | "--actions" | "--select" | "--hover" | "--out" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("{flag} expects a value");
                };
                match flag {
                    "--html" => options.html = Some(PathBuf::from(value)),
                    "--css" => options.css = Some(PathBuf::from(value)),
                    "--actions" => options.actions = Some(PathBuf::from(value)),
                    "--select" => options.select = Some(value.clone()),
                    "--hover" => options.hover = Some(value.clone()),
                    _ => options.out = Some(PathBuf::from(value)),
                }
                i += 1;
            }
            other => bail!("unexpected argument: {other}"),
        }
        i += 1;
    }
    Ok(options)
}

/// Replaces the seed with the given files, then applies scripted actions and
/// the selection flags in that order.
fn load_inputs(session: &mut EditorSession, options: &Options) -> Result<()> {
    if let Some(path) = &options.html {
        let markup = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if let ActionOutcome::Rejected(err) = session.edit_html(&markup) {
            bail!("{} rejected: {err}", path.display());
        }
    }
    if let Some(path) = &options.css {
        let css = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        session.edit_css(&css);
    }
    if let Some(path) = &options.actions {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let actions: Vec<EditorAction> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse actions in {}", path.display()))?;
        for action in actions {
            if let ActionOutcome::Rejected(err) = session.dispatch(action) {
                eprintln!("action rejected: {err}");
            }
        }
    }
    if let Some(id) = &options.select {
        expect_applied(session.dispatch(EditorAction::SelectNode {
            node_id: Some(id.clone()),
        }))?;
    }
    if let Some(id) = &options.hover {
        expect_applied(session.dispatch(EditorAction::HoverNode {
            node_id: Some(id.clone()),
        }))?;
    }
    Ok(())
}

fn expect_applied(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Rejected(err) => bail!(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_scene::Theme;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_values() {
        let options =
            parse_options(&args(&["--select", "3", "--iframe", "--out", "x.html"])).unwrap();
        assert_eq!(options.select.as_deref(), Some("3"));
        assert!(options.iframe);
        assert_eq!(options.out, Some(PathBuf::from("x.html")));
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_options(&args(&["--html"])).is_err());
        assert!(parse_options(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn sessions_restore_and_persist_layout() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = WeftConfig::default();
        config.storage.preferences_path = Some(dir.path().join("preferences.json"));
        fs::write(
            dir.path().join("preferences.json"),
            r#"{"paneSizes":"[300,600,300]","theme":"dark"}"#,
        )?;

        {
            let mut session = open_session(&config)?;
            assert_eq!(session.state().pane_sizes, [300.0, 600.0, 300.0]);
            assert_eq!(session.state().theme, Theme::Dark);
            assert!(
                session
                    .dispatch(EditorAction::SetTheme { theme: Theme::Light })
                    .is_applied()
            );
        }

        let session = open_session(&config)?;
        assert_eq!(session.state().theme, Theme::Light);
        assert_eq!(session.state().pane_sizes, [300.0, 600.0, 300.0]);
        Ok(())
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, io, path::Path, path::PathBuf};
use tracing::{debug, warn};

const APP_HOME_DIR: &str = ".weft";
const PREFERENCES_FILE: &str = "preferences.json";

pub const PANE_SIZES_KEY: &str = "paneSizes";
pub const THEME_KEY: &str = "theme";

/// Width of the fixed CSS inspector pane.
pub const INSPECTOR_PANE_WIDTH: f64 = 450.0;
/// Smallest width for the HTML pane and for the preview between the panes.
pub const MIN_PANE_WIDTH: f64 = 200.0;
pub const DEFAULT_PANE_SIZES: PaneSizes = [320.0, 640.0, 320.0];

pub type PaneSizes = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// String key/value storage for small preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Writes pending changes to the backing medium.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Preferences kept in a single JSON object on disk.
///
/// Writes are buffered until [`KeyValueStore::flush`] or drop.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FileKeyValueStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(data) => match serde_json::from_slice::<BTreeMap<String, String>>(&data) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(?error, ?path, "failed to parse preferences file; starting fresh");
                    BTreeMap::new()
                }
            },
            Err(error) => {
                if error.kind() != io::ErrorKind::NotFound {
                    warn!(?error, ?path, "failed to read preferences file");
                }
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries,
            dirty: false,
        }
    }

    /// Opens the configured path, or `~/.weft/preferences.json`.
    pub fn open(config: &weft_config::StorageConfig) -> Result<Self> {
        let path = match &config.preferences_path {
            Some(path) => path.clone(),
            None => storage_path()?,
        };
        Ok(Self::load(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.entries.get(key).map(String::as_str) != Some(value) {
            self.entries.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        write_entries(&self.path, &self.entries)?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for FileKeyValueStore {
    fn drop(&mut self) {
        if self.dirty
            && let Err(error) = write_entries(&self.path, &self.entries)
        {
            warn!(?error, ?self.path, "failed to persist preferences during drop");
        }
    }
}

fn storage_path() -> Result<PathBuf> {
    if let Some(mut home) = dirs::home_dir() {
        home.push(APP_HOME_DIR);
        home.push(PREFERENCES_FILE);
        Ok(home)
    } else {
        let mut cwd = std::env::current_dir().context("resolving working directory")?;
        cwd.push(PREFERENCES_FILE);
        Ok(cwd)
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Layout state restored at startup and saved whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPreferences {
    pub pane_sizes: PaneSizes,
    pub theme: Theme,
}

impl Default for LayoutPreferences {
    fn default() -> Self {
        Self {
            pane_sizes: DEFAULT_PANE_SIZES,
            theme: Theme::default(),
        }
    }
}

impl LayoutPreferences {
    /// Reads both keys; each unparsable value falls back to its default.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut prefs = Self::default();
        if let Some(raw) = store.get(PANE_SIZES_KEY) {
            match serde_json::from_str::<PaneSizes>(&raw) {
                Ok(sizes) if sizes.iter().all(|size| size.is_finite()) => {
                    prefs.pane_sizes = sizes
                }
                Ok(_) => warn!(raw = %raw, "non-finite pane sizes ignored"),
                Err(error) => warn!(?error, raw = %raw, "unparsable pane sizes ignored"),
            }
        }
        if let Some(raw) = store.get(THEME_KEY) {
            match Theme::parse(&raw) {
                Some(theme) => prefs.theme = theme,
                None => warn!(raw = %raw, "unknown theme ignored"),
            }
        }
        debug!(?prefs, "layout preferences loaded");
        prefs
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let sizes = serde_json::to_string(&self.pane_sizes)?;
        store.set(PANE_SIZES_KEY, &sizes)?;
        store.set(THEME_KEY, self.theme.as_str())?;
        store.flush()
    }
}

/// Moves the HTML pane edge by `delta`, keeping the pane at least
/// [`MIN_PANE_WIDTH`] wide and leaving room for the inspector plus a minimum
/// preview. The lower bound wins on narrow viewports. Other sizes are kept.
pub fn resize_html_pane(sizes: PaneSizes, delta: f64, viewport_width: f64) -> PaneSizes {
    let max = viewport_width - INSPECTOR_PANE_WIDTH - MIN_PANE_WIDTH;
    let width = (sizes[0] + delta).min(max).max(MIN_PANE_WIDTH);
    [width, sizes[1], sizes[2]]
}

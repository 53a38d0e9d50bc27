//! Weft configuration
//!
//! Settings are read from `weft.toml` in the working directory, then
//! overridden by `WEFT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "weft.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WeftConfig {
    /// Comma separated diagnostic categories (`html`, `css`, `all`)
    pub diagnostics: Option<String>,
    /// Preview document appearance
    pub preview: PreviewConfig,
    /// How CSS rules are related to the selected node
    pub scoping: ScopingConfig,
    /// Limits applied to markup coming back from the code view
    pub parser: ParserConfig,
    /// Where layout preferences are persisted
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Outline color for selected and hovered nodes
    pub accent_color: String,
    /// Soft ring drawn around the selected node
    pub ring_color: String,
    /// Page background inside the preview surface
    pub surface_color: String,
    /// Message shown when the tree is empty
    pub placeholder_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScopingConfig {
    /// `substring` (literal `#id` / `.id` containment) or `token`
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    pub max_markup_bytes: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Preferences file; `~/.weft/preferences.json` when unset
    pub preferences_path: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            accent_color: "#3b82f6".to_string(),
            ring_color: "rgba(59, 130, 246, 0.25)".to_string(),
            surface_color: "#ffffff".to_string(),
            placeholder_text: "No HTML loaded".to_string(),
        }
    }
}

impl Default for ScopingConfig {
    fn default() -> Self {
        Self {
            mode: "substring".to_string(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_markup_bytes: 2 * 1024 * 1024,
            max_depth: 256,
        }
    }
}

impl WeftConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(WeftConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `weft.toml` from the current directory, or defaults if missing
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Environment variables take precedence over file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Unparsable numbers are ignored.
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(color) = lookup("WEFT_ACCENT_COLOR") {
            self.preview.accent_color = color;
        }
        if let Some(mode) = lookup("WEFT_SCOPING_MODE") {
            self.scoping.mode = mode.trim().to_ascii_lowercase();
        }
        if let Some(val) = lookup("WEFT_MAX_MARKUP_BYTES")
            && let Ok(bytes) = val.trim().parse::<usize>()
        {
            self.parser.max_markup_bytes = bytes;
        }
        if let Some(path) = lookup("WEFT_PREFERENCES_PATH") {
            self.storage.preferences_path = Some(PathBuf::from(path));
        }
        if let Some(diagnostics) = lookup("WEFT_DIAGNOSTICS") {
            self.diagnostics = Some(diagnostics);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from weft.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = WeftConfig::default();
        assert_eq!(config.scoping.mode, "substring");
        assert_eq!(config.parser.max_depth, 256);
        assert!(config.storage.preferences_path.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let config = WeftConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = WeftConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = WeftConfig::from_toml_str(
            r##"
            [preview]
            accent_color = "#ff0000"

            [parser]
            max_depth = 32
            "##,
        )
        .unwrap();
        assert_eq!(config.preview.accent_color, "#ff0000");
        assert_eq!(config.parser.max_depth, 32);
        assert_eq!(config.parser.max_markup_bytes, 2 * 1024 * 1024);
        assert_eq!(config.scoping.mode, "substring");
    }

    #[test]
    fn test_bad_file_reports_error() {
        let err = WeftConfig::from_toml_str("[parser]\nmax_depth = \"deep\"").unwrap_err();
        assert!(err.starts_with("Failed to parse config file"));
        assert!(WeftConfig::load_from_file("/nonexistent/weft.toml").is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WEFT_ACCENT_COLOR", "hotpink"),
            ("WEFT_SCOPING_MODE", " Token "),
            ("WEFT_MAX_MARKUP_BYTES", "not-a-number"),
            ("WEFT_PREFERENCES_PATH", "/tmp/prefs.json"),
        ]
        .into_iter()
        .collect();

        let mut config = WeftConfig::default();
        config.merge_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.preview.accent_color, "hotpink");
        assert_eq!(config.scoping.mode, "token");
        assert_eq!(config.parser.max_markup_bytes, 2 * 1024 * 1024);
        assert_eq!(
            config.storage.preferences_path.as_deref(),
            Some(Path::new("/tmp/prefs.json"))
        );
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("WEFT_MAX_MARKUP_BYTES", "1024");
        }

        let mut config = WeftConfig::default();
        config.merge_with_env();
        assert_eq!(config.parser.max_markup_bytes, 1024);

        unsafe {
            std::env::remove_var("WEFT_MAX_MARKUP_BYTES");
        }
    }
}

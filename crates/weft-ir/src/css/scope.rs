use serde::{Deserialize, Serialize};

use super::CssRule;

/// How a rule's selector is matched against the selected node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopingMode {
    /// Selector contains `#<id>` or `.<id>` anywhere as literal text, so
    /// `.a123b` matches `123`.
    #[default]
    Substring,
    /// Selector has an `#<id>` or `.<id>` simple selector with exact name.
    Token,
}

impl ScopingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "substring" => Some(ScopingMode::Substring),
            "token" => Some(ScopingMode::Token),
            _ => None,
        }
    }

    pub fn matches(self, selector: &str, node_id: &str) -> bool {
        match self {
            ScopingMode::Substring => {
                selector.contains(&format!("#{node_id}"))
                    || selector.contains(&format!(".{node_id}"))
            }
            ScopingMode::Token => selector_tokens(selector)
                .any(|(sigil, name)| (sigil == '#' || sigil == '.') && name == node_id),
        }
    }
}

/// Rules relevant to `selected`: all rules when nothing is selected,
/// otherwise the rules whose selector references the id, in list order.
pub fn scoped_rules<'a>(
    rules: &'a [CssRule],
    selected: Option<&str>,
    mode: ScopingMode,
) -> Vec<&'a CssRule> {
    match selected {
        None => rules.iter().collect(),
        Some(node_id) => rules
            .iter()
            .filter(|rule| mode.matches(&rule.selector, node_id))
            .collect(),
    }
}

/// Yields `(sigil, name)` for each `#name` / `.name` simple selector.
fn selector_tokens(selector: &str) -> impl Iterator<Item = (char, &str)> {
    let bytes = selector.as_bytes();
    let mut i = 0usize;
    std::iter::from_fn(move || {
        while i < bytes.len() {
            let sigil = bytes[i];
            i += 1;
            if sigil != b'#' && sigil != b'.' {
                continue;
            }
            let start = i;
            while i < bytes.len() && is_name_byte(bytes[i]) {
                i += 1;
            }
            if i > start {
                return Some((sigil as char, &selector[start..i]));
            }
        }
        None
    })
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

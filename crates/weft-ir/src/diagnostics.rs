use std::collections::HashSet;
use std::sync::OnceLock;

/// Returns true when `WEFT_DIAGNOSTICS` lists `category` (or `all`).
///
/// The variable is read once per process; categories are comma separated and
/// case-insensitive, e.g. `WEFT_DIAGNOSTICS=html,css`.
pub fn diagnostics_enabled(category: &str) -> bool {
    let set = CATEGORIES.get_or_init(|| {
        let raw = std::env::var("WEFT_DIAGNOSTICS").unwrap_or_default();
        parse_categories(&raw)
    });
    set.contains("all") || set.contains(&category.to_ascii_lowercase())
}

/// Fixes the enabled categories from configuration. Only the first call
/// before any [`diagnostics_enabled`] lookup takes effect; returns whether it
/// did.
pub fn init_diagnostics(raw: &str) -> bool {
    CATEGORIES.set(parse_categories(raw)).is_ok()
}

static CATEGORIES: OnceLock<HashSet<String>> = OnceLock::new();

fn parse_categories(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_categories;

    #[test]
    fn categories_are_trimmed_and_lowercased() {
        let set = parse_categories(" HTML, css ,,");
        assert!(set.contains("html"));
        assert!(set.contains("css"));
        assert_eq!(set.len(), 2);
    }
}

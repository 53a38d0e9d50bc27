use tracing::debug;

use super::{CssRule, ScopingMode, scoped_rules, to_css_text};
use crate::diagnostics::diagnostics_enabled;

/// Ordered rule list plus the scoping mode used to relate rules to nodes.
///
/// Mutations replace individual rule objects; the list order never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<CssRule>,
    mode: ScopingMode,
}

impl RuleStore {
    pub fn new(rules: Vec<CssRule>) -> Self {
        Self {
            rules,
            mode: ScopingMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ScopingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ScopingMode {
        self.mode
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<CssRule> {
        self.rules
    }

    pub fn replace_all(&mut self, rules: Vec<CssRule>) {
        self.rules = rules;
    }

    pub fn scoped(&self, selected: Option<&str>) -> Vec<&CssRule> {
        scoped_rules(&self.rules, selected, self.mode)
    }

    /// Sets `name: value` on the first rule scoped to `selected`. Returns
    /// false when no rule is in scope, which is not an error.
    pub fn set_scoped_property(&mut self, selected: Option<&str>, name: &str, value: &str) -> bool {
        let Some(index) = self.first_scoped_index(selected) else {
            debug!(?selected, name, "no scoped rule; property not applied");
            return false;
        };
        let mut rule = self.rules[index].clone();
        rule.properties.set(name, value);
        if diagnostics_enabled("css") {
            tracing::info!(selector = %rule.selector, name, value, "diagnostics: property set");
        }
        self.rules[index] = rule;
        true
    }

    /// Removes `name` from the first scoped rule. Returns true only when a
    /// declaration was actually removed.
    pub fn remove_scoped_property(&mut self, selected: Option<&str>, name: &str) -> bool {
        let Some(index) = self.first_scoped_index(selected) else {
            return false;
        };
        if !self.rules[index].properties.contains(name) {
            return false;
        }
        let mut rule = self.rules[index].clone();
        rule.properties.remove(name);
        self.rules[index] = rule;
        true
    }

    pub fn to_css_text(&self) -> String {
        to_css_text(&self.rules)
    }

    fn first_scoped_index(&self, selected: Option<&str>) -> Option<usize> {
        match selected {
            None => (!self.rules.is_empty()).then_some(0),
            Some(node_id) => self
                .rules
                .iter()
                .position(|rule| self.mode.matches(&rule.selector, node_id)),
        }
    }
}

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Property name → value map that remembers insertion order.
///
/// Keys are unique; setting an existing key replaces its value in place.
/// Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Inserts or replaces `name`; returns the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name: String = name.into();
        let value: String = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Declarations
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Declarations::new();
        for (name, value) in iter {
            out.set(name, value);
        }
        out
    }
}

impl Serialize for Declarations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Declarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = Declarations;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of CSS property names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = Declarations::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    out.set(name, value);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(DeclarationsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut decls: Declarations = [("color", "blue"), ("padding", "4px")].into_iter().collect();
        assert_eq!(decls.set("color", "red"), Some("blue".into()));
        let names: Vec<&str> = decls.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["color", "padding"]);
        assert_eq!(decls.get("color"), Some("red"));
    }

    #[test]
    fn json_object_keeps_insertion_order() {
        let decls: Declarations = [("z-index", "1"), ("color", "blue")].into_iter().collect();
        let json = serde_json::to_string(&decls).expect("serialize");
        assert_eq!(json, r#"{"z-index":"1","color":"blue"}"#);
        let back: Declarations = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, decls);
    }

    #[test]
    fn remove_reports_previous_value() {
        let mut decls: Declarations = [("color", "blue")].into_iter().collect();
        assert_eq!(decls.remove("color"), Some("blue".into()));
        assert_eq!(decls.remove("color"), None);
        assert!(decls.is_empty());
    }
}

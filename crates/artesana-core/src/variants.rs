//! Variant label → candidate image mapping produced by the resolver.
//!
//! Labels are free text (color or material names, swatch titles), so the map
//! is keyed by `String` and keeps insertion order. Order matters: downloads
//! and report rows follow the order variants appeared on the page.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label used when no variant could be identified on a product page.
pub const DEFAULT_VARIANT: &str = "default";

/// Insertion-ordered mapping from variant label to candidate image URLs.
///
/// Inserting an existing label replaces its URL list but keeps the label at
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantMap {
    entries: Vec<(String, Vec<String>)>,
}

impl VariantMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fallback map: a single `"default"` entry with no candidates.
    #[must_use]
    pub fn default_only() -> Self {
        let mut map = Self::new();
        map.insert(DEFAULT_VARIANT, Vec::new());
        map
    }

    pub fn insert(&mut self, label: impl Into<String>, urls: Vec<String>) {
        let label = label.into();
        if let Some(slot) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = urls;
        } else {
            self.entries.push((label, urls));
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, urls)| urls.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(label, urls)| (label.as_str(), urls.as_slice()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Sum of candidate URLs across all variants.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.entries.iter().map(|(_, urls)| urls.len()).sum()
    }

    /// `true` when at least one variant carries a candidate image.
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.entries.iter().any(|(_, urls)| !urls.is_empty())
    }
}

impl Serialize for VariantMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, urls) in &self.entries {
            map.serialize_entry(label, urls)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariantMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VariantMapVisitor;

        impl<'de> Visitor<'de> for VariantMapVisitor {
            type Value = VariantMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of variant label to image URL list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<VariantMap, A::Error> {
                let mut map = VariantMap::new();
                while let Some((label, urls)) = access.next_entry::<String, Vec<String>>()? {
                    map.insert(label, urls);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(VariantMapVisitor)
    }
}

/// Everything the resolver learned about one product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantImageSet {
    pub main_image: Option<String>,
    /// Never empty once produced by the resolver; see [`VariantMap::default_only`].
    pub variants: VariantMap,
}

impl VariantImageSet {
    /// The result for a page that could not be fetched or yielded nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            main_image: None,
            variants: VariantMap::default_only(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_label_in_place() {
        let mut map = VariantMap::new();
        map.insert("Negro", vec!["a.jpg".to_string()]);
        map.insert("Beige", vec!["b.jpg".to_string()]);
        map.insert("Negro", vec!["c.jpg".to_string()]);

        let labels: Vec<&str> = map.labels().collect();
        assert_eq!(labels, ["Negro", "Beige"]);
        assert_eq!(map.get("Negro"), Some(&["c.jpg".to_string()][..]));
    }

    #[test]
    fn default_only_has_single_empty_entry() {
        let map = VariantMap::default_only();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(DEFAULT_VARIANT), Some(&[][..]));
        assert!(!map.has_candidates());
    }

    #[test]
    fn serializes_as_ordered_json_object() {
        let mut map = VariantMap::new();
        map.insert("Rojo", vec!["r.jpg".to_string()]);
        map.insert("Azul", Vec::new());

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Rojo":["r.jpg"],"Azul":[]}"#);

        let back: VariantMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}

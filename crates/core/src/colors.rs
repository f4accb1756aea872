use tijdlijn_protocol::HexColor;

use crate::store::{KeyValueStore, StoreError};

/// Store key for the recently-used color list. Shared by all documents.
pub const RECENT_COLORS_KEY: &str = "tt_recent_colors_v1";

pub const DEFAULT_RECENT_LIMIT: usize = 4;

/// Most-recent-first, de-duplicated list of colors the user picked.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentColors {
    colors: Vec<HexColor>,
    limit: usize,
}

impl RecentColors {
    pub fn new(limit: usize) -> Self {
        Self {
            colors: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Read the list from the store. Missing or malformed data yields an
    /// empty list; non-string entries are skipped.
    pub fn load(store: &dyn KeyValueStore, limit: usize) -> Self {
        let mut recent = Self::new(limit);
        let raw = match store.get(RECENT_COLORS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return recent,
            Err(err) => {
                tracing::warn!("could not read recent colors: {err}");
                return recent;
            }
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(values) => {
                recent.colors = values
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .filter(|s| HexColor::is_hex_literal(s))
                    .map(HexColor::normalize)
                    .collect();
                recent.dedup_and_truncate();
            }
            Err(err) => tracing::warn!("ignoring malformed recent colors: {err}"),
        }
        recent
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let list: Vec<&str> = self.colors.iter().map(HexColor::as_str).collect();
        store.set(RECENT_COLORS_KEY, &serde_json::to_string(&list)?)
    }

    /// Move `input` to the front. Input that is not a `#rgb`/`#rrggbb`
    /// literal is ignored and returns false.
    pub fn push(&mut self, input: &str) -> bool {
        if !HexColor::is_hex_literal(input) {
            return false;
        }
        let color = HexColor::normalize(input);
        self.colors.retain(|c| *c != color);
        self.colors.insert(0, color);
        self.dedup_and_truncate();
        true
    }

    pub fn colors(&self) -> &[HexColor] {
        &self.colors
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn dedup_and_truncate(&mut self) {
        let mut seen = Vec::with_capacity(self.colors.len());
        self.colors.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(c.clone());
                true
            }
        });
        self.colors.truncate(self.limit);
    }
}

impl Default for RecentColors {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn as_strs(recent: &RecentColors) -> Vec<&str> {
        recent.colors().iter().map(HexColor::as_str).collect()
    }

    #[test]
    fn most_recent_first_without_duplicates() {
        let mut recent = RecentColors::default();
        recent.push("#ff0000");
        recent.push("#00ff00");
        recent.push("#F00");
        assert_eq!(as_strs(&recent), vec!["#ff0000", "#00ff00"]);
    }

    #[test]
    fn capped_at_limit() {
        let mut recent = RecentColors::new(4);
        for c in ["#111", "#222", "#333", "#444", "#555"] {
            recent.push(c);
        }
        assert_eq!(
            as_strs(&recent),
            vec!["#555555", "#444444", "#333333", "#222222"]
        );
    }

    #[test]
    fn rejects_non_hex_input() {
        let mut recent = RecentColors::default();
        assert!(!recent.push("rgb(1,2,3)"));
        assert!(!recent.push("red"));
        assert!(recent.colors().is_empty());
    }

    #[test]
    fn persists_across_loads() {
        let mut store = MemoryStore::new();
        let mut recent = RecentColors::default();
        recent.push("#abcdef");
        recent.push("#123");
        assert!(recent.save(&mut store).is_ok());
        let loaded = RecentColors::load(&store, 4);
        assert_eq!(as_strs(&loaded), vec!["#112233", "#abcdef"]);
    }

    #[test]
    fn malformed_store_value_is_empty() {
        let mut store = MemoryStore::new();
        let _ = store.set(RECENT_COLORS_KEY, "{not json");
        assert!(RecentColors::load(&store, 4).colors().is_empty());
        let _ = store.set(RECENT_COLORS_KEY, "[1, \"#fff\", null]");
        assert_eq!(as_strs(&RecentColors::load(&store, 4)), vec!["#ffffff"]);
    }
}

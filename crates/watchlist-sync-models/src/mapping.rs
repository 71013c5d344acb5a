use crate::{ImdbId, RatingKey};
use std::collections::{HashMap, HashSet};

/// Per-run IMDb ID -> Plex rating key association.
///
/// Insertion order is preserved and each IMDb ID maps to at most one key:
/// the first pair inserted for an ID wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMapping {
    entries: Vec<(ImdbId, RatingKey)>,
    index: HashMap<ImdbId, usize>,
}

impl ResolutionMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless `imdb_id` is already mapped. Returns `false` when the
    /// pair was discarded because an earlier mapping exists.
    pub fn insert_first(&mut self, imdb_id: ImdbId, key: RatingKey) -> bool {
        if self.index.contains_key(&imdb_id) {
            return false;
        }
        self.index.insert(imdb_id.clone(), self.entries.len());
        self.entries.push((imdb_id, key));
        true
    }

    pub fn get(&self, imdb_id: &ImdbId) -> Option<&RatingKey> {
        self.index.get(imdb_id).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, imdb_id: &ImdbId) -> bool {
        self.index.contains_key(imdb_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImdbId, &RatingKey)> {
        self.entries.iter().map(|(id, key)| (id, key))
    }

    /// Distinct rating keys. Two IMDb IDs may resolve to the same Plex title.
    pub fn rating_keys(&self) -> HashSet<RatingKey> {
        self.entries.iter().map(|(_, key)| key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imdb(id: &str) -> ImdbId {
        ImdbId::parse(id).unwrap()
    }

    fn key(k: &str) -> RatingKey {
        RatingKey::hex(k).unwrap()
    }

    #[test]
    fn test_first_insert_wins() {
        let mut mapping = ResolutionMapping::new();
        assert!(mapping.insert_first(imdb("tt1"), key("aaaaaaaaaaaaaaaaaaaaaaaa")));
        assert!(!mapping.insert_first(imdb("tt1"), key("bbbbbbbbbbbbbbbbbbbbbbbb")));

        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get(&imdb("tt1")).map(RatingKey::as_str),
            Some("aaaaaaaaaaaaaaaaaaaaaaaa")
        );
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut mapping = ResolutionMapping::new();
        mapping.insert_first(imdb("tt3"), key("cccccccccccccccccccccccc"));
        mapping.insert_first(imdb("tt1"), key("aaaaaaaaaaaaaaaaaaaaaaaa"));

        let ids: Vec<&str> = mapping.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["tt3", "tt1"]);
    }

    #[test]
    fn test_rating_keys_are_distinct() {
        let mut mapping = ResolutionMapping::new();
        mapping.insert_first(imdb("tt1"), key("aaaaaaaaaaaaaaaaaaaaaaaa"));
        mapping.insert_first(imdb("tt2"), key("aaaaaaaaaaaaaaaaaaaaaaaa"));

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.rating_keys().len(), 1);
    }
}

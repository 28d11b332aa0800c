//! Per-unit-of-work cache state for one resource kind.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::resource::CachedResource;

#[derive(Debug, Clone)]
struct Entry<T> {
    // Merge sequence; breaks `order` ties in the store's return order.
    seq: u64,
    item: T,
}

/// Items by id plus the set of parents whose complete child set is held.
///
/// For every parent in `full_parent_ids`, `data` holds every non-deleted child
/// the store returned for it.
#[derive(Debug, Clone)]
pub struct CacheState<T> {
    data: HashMap<String, Entry<T>>,
    full_parent_ids: HashSet<String>,
    next_seq: u64,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
            full_parent_ids: HashSet::new(),
            next_seq: 0,
        }
    }
}

impl<T: CachedResource> CacheState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.data.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.data.get(id).map(|entry| entry.item.clone())
    }

    /// Whether `load(parent_id)` can be answered without touching the store.
    pub fn is_full(&self, parent_id: &str) -> bool {
        self.full_parent_ids.contains(parent_id)
    }

    pub fn full_parent_ids(&self) -> impl Iterator<Item = &str> {
        self.full_parent_ids.iter().map(String::as_str)
    }

    /// Insert items, replacing any cached item with the same id.
    pub(crate) fn merge<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.data.insert(item.id().to_string(), Entry { seq, item });
        }
    }

    pub(crate) fn mark_full(&mut self, parent_id: &str) {
        self.full_parent_ids.insert(parent_id.to_string());
    }

    /// Make `fresh` the complete child set of `parent_id` and mark the parent full.
    ///
    /// Children cached earlier (by id) that `fresh` no longer contains are dropped.
    pub(crate) fn replace_children(&mut self, parent_id: &str, fresh: Vec<T>) {
        let keep: HashSet<&str> = fresh.iter().map(CachedResource::id).collect();
        self.data.retain(|id, entry| {
            entry.item.parent_id() != parent_id || keep.contains(id.as_str())
        });
        self.merge(fresh);
        self.mark_full(parent_id);
    }

    /// Cached children of `parent_id`, sorted by `order` then merge sequence.
    pub(crate) fn children_of(&self, parent_id: &str) -> Vec<T> {
        let mut entries: Vec<&Entry<T>> = self
            .data
            .values()
            .filter(|entry| entry.item.parent_id() == parent_id)
            .collect();
        entries.sort_by(|a, b| compare_order(&a.item, &b.item).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(|entry| entry.item.clone()).collect()
    }

    /// Requested ids not yet cached, deduplicated in first-seen order.
    pub(crate) fn missing_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .map(AsRef::as_ref)
            .filter(|id| !self.data.contains_key(*id) && seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    /// Cached items for `ids` in input order; absent ids are skipped.
    pub(crate) fn collect_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<T> {
        ids.iter()
            .filter_map(|id| self.get(id.as_ref()))
            .collect()
    }

    /// Forget the parents and every cached child they own. Returns the number of items purged.
    pub(crate) fn invalidate_parents(&mut self, parent_ids: &[String]) -> usize {
        for parent_id in parent_ids {
            self.full_parent_ids.remove(parent_id);
        }
        let before = self.data.len();
        self.data
            .retain(|_, entry| !parent_ids.iter().any(|p| p == entry.item.parent_id()));
        before - self.data.len()
    }
}

pub(crate) fn compare_order<T: CachedResource>(a: &T, b: &T) -> Ordering {
    a.order().total_cmp(&b.order())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FieldRecord;
    use crate::domain::types::FieldType;

    fn field(id: &str, table_id: &str, order: f64) -> FieldRecord {
        FieldRecord::new(id, table_id, id, FieldType::SingleLineText, order)
    }

    #[test]
    fn merge_overwrites_on_id_collision() {
        let mut state = CacheState::new();
        state.merge([field("f1", "t1", 0.0)]);
        let mut renamed = field("f1", "t1", 0.0);
        renamed.name = "renamed".to_string();
        state.merge([renamed]);

        assert_eq!(state.len(), 1);
        assert_eq!(state.get("f1").unwrap().name, "renamed");
    }

    #[test]
    fn children_are_sorted_by_order_with_stable_ties() {
        let mut state = CacheState::new();
        state.merge([
            field("c", "t1", 3.0),
            field("a", "t1", 1.0),
            field("tie", "t1", 1.0),
            field("other", "t2", 0.0),
        ]);

        let ids: Vec<String> = state
            .children_of("t1")
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, ["a", "tie", "c"]);
    }

    #[test]
    fn missing_ids_are_deduplicated() {
        let mut state = CacheState::new();
        state.merge([field("a", "t1", 0.0)]);
        assert_eq!(state.missing_ids(&["a", "b", "b", "c"]), ["b", "c"]);
    }

    #[test]
    fn collect_ids_follows_input_order_and_skips_absent() {
        let mut state = CacheState::new();
        state.merge([field("a", "t1", 0.0), field("b", "t1", 1.0)]);
        let ids: Vec<String> = state
            .collect_ids(&["b", "missing", "a"])
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn replace_children_drops_rows_the_store_no_longer_returns() {
        let mut state = CacheState::new();
        state.merge([
            field("gone", "t1", 0.0),
            field("kept", "t1", 1.0),
            field("other", "t2", 0.0),
        ]);

        state.replace_children("t1", vec![field("kept", "t1", 1.0), field("new", "t1", 2.0)]);

        assert!(state.is_full("t1"));
        assert!(!state.contains("gone"));
        assert!(state.contains("other"));
        let ids: Vec<String> = state.children_of("t1").into_iter().map(|f| f.id).collect();
        assert_eq!(ids, ["kept", "new"]);
    }

    #[test]
    fn invalidate_parents_purges_children_and_fullness() {
        let mut state = CacheState::new();
        state.merge([field("f1", "t1", 0.0), field("f2", "t2", 0.0)]);
        state.mark_full("t1");
        state.mark_full("t2");

        let removed = state.invalidate_parents(&["t1".to_string()]);

        assert_eq!(removed, 1);
        assert!(!state.is_full("t1"));
        assert!(!state.contains("f1"));
        assert!(state.is_full("t2"));
        assert!(state.contains("f2"));
    }
}

//! Per-session draft repository for profile edits that are not yet persisted.
//!
//! Ids are stable for the lifetime of the repository and never reused, so removing
//! one draft does not shift the others. Iteration follows insertion order.

use std::collections::BTreeMap;

use serde::Serialize;

pub type DraftId = u64;

#[derive(Debug, Clone, Serialize)]
pub struct Draft<'a, T> {
    pub id: DraftId,
    #[serde(flatten)]
    pub entry: &'a T,
}

#[derive(Debug)]
pub struct DraftRepository<T> {
    entries: BTreeMap<DraftId, T>,
    next_id: DraftId,
}

impl<T> Default for DraftRepository<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> DraftRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: T) -> DraftId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn remove(&mut self, id: DraftId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: DraftId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Drafts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Draft<'_, T>> {
        self.entries.iter().map(|(id, entry)| Draft { id: *id, entry })
    }

    pub fn ids(&self) -> Vec<DraftId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut repo = DraftRepository::new();
        repo.add("first");
        repo.add("second");
        repo.add("third");
        let entries: Vec<_> = repo.iter().map(|d| *d.entry).collect();
        assert_eq!(entries, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_keeps_other_ids_stable() {
        let mut repo = DraftRepository::new();
        let a = repo.add("a");
        let b = repo.add("b");
        let c = repo.add("c");

        assert_eq!(repo.remove(b), Some("b"));
        assert_eq!(repo.get(a), Some(&"a"));
        assert_eq!(repo.get(c), Some(&"c"));
        assert_eq!(repo.ids(), vec![a, c]);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut repo = DraftRepository::new();
        let a = repo.add(1);
        repo.remove(a);
        let b = repo.add(2);
        assert_ne!(a, b);
        assert_eq!(repo.remove(a), None);
    }

    #[test]
    fn test_draft_serializes_flattened_with_id() {
        #[derive(Serialize)]
        struct Cert {
            certificate: String,
        }
        let mut repo = DraftRepository::new();
        repo.add(Cert {
            certificate: "AWS SAA".to_string(),
        });
        let value = serde_json::to_value(repo.iter().collect::<Vec<_>>()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "id": 1, "certificate": "AWS SAA" }])
        );
    }
}

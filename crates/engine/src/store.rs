//! Classification storage.
//!
//! One entry per (pair, property). The automatic path writes through
//! [`ClassificationStore::insert_if_absent`], which must be atomic;
//! human corrections go through [`ClassificationStore::upsert`].

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::EvalError;
use crate::model::{ClassificationRecord, Label, PairKey, Source, Stored};

pub trait ClassificationStore {
    fn get(&self, pair: &PairKey, property: &str) -> Result<Option<Stored>, EvalError>;

    fn exists(&self, pair: &PairKey, property: &str) -> Result<bool, EvalError> {
        Ok(self.get(pair, property)?.is_some())
    }

    /// Store an automatic label unless an entry already exists.
    /// Returns `true` when a new entry was written; an existing entry is a no-op.
    fn insert_if_absent(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<bool, EvalError>;

    /// Unconditionally store a human label. Returns the replaced entry, if any.
    fn upsert(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<Option<Stored>, EvalError>;

    /// Delete every entry of a pair. Returns the number removed.
    fn remove_pair(&mut self, pair: &PairKey) -> Result<usize, EvalError>;

    /// All entries, ordered by pair then property.
    fn records(&self) -> Result<Vec<ClassificationRecord>, EvalError>;

    fn records_for(&self, pair: &PairKey) -> Result<Vec<ClassificationRecord>, EvalError> {
        Ok(self.records()?.into_iter().filter(|r| &r.pair == pair).collect())
    }
}

/// In-process store backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<(PairKey, String), Stored>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassificationStore for MemoryStore {
    fn get(&self, pair: &PairKey, property: &str) -> Result<Option<Stored>, EvalError> {
        Ok(self.entries.get(&(pair.clone(), property.to_string())).copied())
    }

    fn insert_if_absent(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<bool, EvalError> {
        match self.entries.entry((pair.clone(), property.to_string())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Stored { label, source: Source::Automatic });
                Ok(true)
            }
        }
    }

    fn upsert(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<Option<Stored>, EvalError> {
        Ok(self.entries.insert(
            (pair.clone(), property.to_string()),
            Stored { label, source: Source::Override },
        ))
    }

    fn remove_pair(&mut self, pair: &PairKey) -> Result<usize, EvalError> {
        let before = self.entries.len();
        self.entries.retain(|(key, _), _| key != pair);
        Ok(before - self.entries.len())
    }

    fn records(&self) -> Result<Vec<ClassificationRecord>, EvalError> {
        Ok(self
            .entries
            .iter()
            .map(|((pair, property), stored)| ClassificationRecord {
                pair: pair.clone(),
                property: property.clone(),
                label: stored.label,
                source: stored.source,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> PairKey {
        PairKey::new(format!("gt{n}"), format!("pred{n}"))
    }

    #[test]
    fn insert_if_absent_keeps_first() {
        let mut store = MemoryStore::new();
        assert!(store.insert_if_absent(&key(1), "density", Label::TruePositive).unwrap());
        assert!(!store.insert_if_absent(&key(1), "density", Label::FalseNegative).unwrap());

        let stored = store.get(&key(1), "density").unwrap().unwrap();
        assert_eq!(stored.label, Label::TruePositive);
        assert_eq!(stored.source, Source::Automatic);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_replaces_and_reports_previous() {
        let mut store = MemoryStore::new();
        store.insert_if_absent(&key(1), "density", Label::FalseNegative).unwrap();

        let prev = store.upsert(&key(1), "density", Label::TruePositive).unwrap();
        assert_eq!(prev, Some(Stored { label: Label::FalseNegative, source: Source::Automatic }));

        let again = store.upsert(&key(1), "density", Label::TruePositive).unwrap();
        assert_eq!(again, Some(Stored { label: Label::TruePositive, source: Source::Override }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_pair_only_touches_that_pair() {
        let mut store = MemoryStore::new();
        store.insert_if_absent(&key(1), "density", Label::TruePositive).unwrap();
        store.insert_if_absent(&key(1), "radius", Label::TrueNegative).unwrap();
        store.insert_if_absent(&key(2), "density", Label::FalsePositive).unwrap();

        assert_eq!(store.remove_pair(&key(1)).unwrap(), 2);
        assert!(!store.exists(&key(1), "density").unwrap());
        assert!(store.exists(&key(2), "density").unwrap());
    }

    #[test]
    fn records_are_ordered() {
        let mut store = MemoryStore::new();
        store.insert_if_absent(&key(2), "b", Label::TruePositive).unwrap();
        store.insert_if_absent(&key(1), "z", Label::TruePositive).unwrap();
        store.insert_if_absent(&key(1), "a", Label::TruePositive).unwrap();

        let order: Vec<_> = store
            .records()
            .unwrap()
            .into_iter()
            .map(|r| (r.pair.ground_truth, r.property))
            .collect();
        assert_eq!(
            order,
            vec![
                ("gt1".to_string(), "a".to_string()),
                ("gt1".to_string(), "z".to_string()),
                ("gt2".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(store.records_for(&key(1)).unwrap().len(), 2);
    }
}

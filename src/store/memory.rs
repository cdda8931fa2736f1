//! In-memory composition store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use log::debug;

use super::{ensure_normalized, new_id, CompositionStore, StoredComposition, StoredSummary};
use crate::error::{Error, Result};
use crate::model::Composition;

/// Store backed by a map guarded by an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, StoredComposition>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored compositions. Still answers after a writer panicked.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Store("memory store lock poisoned".to_string())
}

impl CompositionStore for MemoryStore {
    fn load_record(&self, id: &str) -> Result<StoredComposition> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::CompositionNotFound(id.to_string()))
    }

    fn save_named(
        &self,
        composition: &Composition,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<String> {
        ensure_normalized(composition)?;
        let name = name.map(str::to_string);
        let mut records = self.records.write().map_err(poisoned)?;

        let id = match id {
            Some(id) => id.to_string(),
            None => new_id(),
        };
        match records.get_mut(&id) {
            Some(record) => record.update(composition.clone(), name),
            None => {
                records.insert(
                    id.clone(),
                    StoredComposition::new(id.clone(), composition.clone(), name),
                );
            }
        }

        debug!("saved composition {} ({} blocks)", id, composition.len());
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::CompositionNotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<StoredSummary>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().map(StoredComposition::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;

    #[test]
    fn test_save_load_round_trip() {
        let store = MemoryStore::new();
        let mut c = Composition::create_default();
        c.move_block(0, Direction::Down);
        c.set_style("backgroundColor", "#eeeeee").unwrap();

        let id = store.save(&c, None).unwrap();
        assert_eq!(store.load(&id).unwrap(), c);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_with_id_overwrites() {
        let store = MemoryStore::new();
        let id = store
            .save_named(&Composition::create_default(), None, Some("Launch"))
            .unwrap();
        let first = store.load_record(&id).unwrap();

        let mut c = Composition::create_default();
        c.set_block_content(1, Some("Updated".into())).unwrap();
        let same = store.save(&c, Some(id.as_str())).unwrap();

        assert_eq!(same, id);
        let record = store.load_record(&id).unwrap();
        assert_eq!(record.composition.block(1).unwrap().text(), "Updated");
        assert_eq!(record.name.as_deref(), Some("Launch"));
        assert_eq!(record.created_at, first.created_at);
        assert!(record.updated_at >= first.updated_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing() {
        let store = MemoryStore::new();
        let err = store.load("nope").unwrap_err();
        assert!(matches!(err, Error::CompositionNotFound(id) if id == "nope"));
        assert!(!store.exists("nope").unwrap());
    }

    #[test]
    fn test_delete_and_list() {
        let store = MemoryStore::new();
        store.save(&Composition::new(), Some("b")).unwrap();
        store.save(&Composition::create_default(), Some("a")).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        store.delete("a").unwrap();
        assert!(store.delete("a").unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.save(&Composition::new(), Some("a")).unwrap();

        let writer = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.records.write().unwrap();
            panic!("writer failed");
        })
        .join();

        assert_eq!(store.len(), 1);
        assert!(matches!(store.load("a"), Err(Error::Store(_))));
    }

    #[test]
    fn test_rejects_unnormalized() {
        let store = MemoryStore::new();
        let mut c = Composition::create_default();
        c.block_mut(1).unwrap().order = 9;
        assert!(matches!(
            store.save(&c, None),
            Err(Error::InvalidComposition(_))
        ));
        assert!(store.is_empty());
    }
}

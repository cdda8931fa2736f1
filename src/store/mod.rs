//! Persistence adapters for compositions.
//!
//! The engine only sees [`CompositionStore`]. Two adapters ship with the
//! crate: [`MemoryStore`] for tests and embedding, and [`FileStore`], which
//! keeps one JSON document per composition in a directory.
//!
//! Adapters do not repair compositions. A composition whose block order is
//! not normalized is rejected on save; callers normalize first.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Composition;

/// A composition as held by a store, with bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredComposition {
    /// Store-assigned identifier
    pub id: String,

    /// Optional human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The composition itself
    pub composition: Composition,

    /// First save
    pub created_at: DateTime<Utc>,

    /// Latest save
    pub updated_at: DateTime<Utc>,
}

impl StoredComposition {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, composition: Composition, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name,
            composition,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the composition and bump `updated_at`. A `None` name keeps the current one.
    pub fn update(&mut self, composition: Composition, name: Option<String>) {
        self.composition = composition;
        if name.is_some() {
            self.name = name;
        }
        self.updated_at = Utc::now();
    }

    /// Summary row for listings.
    pub fn summary(&self) -> StoredSummary {
        StoredSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            block_count: self.composition.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a stored composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSummary {
    pub id: String,
    pub name: Option<String>,
    pub block_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence boundary for compositions.
///
/// Concurrent saves to the same id are not coordinated: the last save wins.
pub trait CompositionStore: Send + Sync {
    /// Load the full record for `id`.
    fn load_record(&self, id: &str) -> Result<StoredComposition>;

    /// Save under `id` (overwrite) or under a fresh id, returning the id used.
    fn save_named(
        &self,
        composition: &Composition,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<String>;

    /// Delete the record for `id`.
    fn delete(&self, id: &str) -> Result<()>;

    /// Summaries of all records, ordered by id.
    fn list(&self) -> Result<Vec<StoredSummary>>;

    /// Load the composition stored under `id`.
    fn load(&self, id: &str) -> Result<Composition> {
        Ok(self.load_record(id)?.composition)
    }

    /// Save a composition without changing its name.
    fn save(&self, composition: &Composition, id: Option<&str>) -> Result<String> {
        self.save_named(composition, id, None)
    }

    /// Check whether a record exists.
    fn exists(&self, id: &str) -> Result<bool> {
        match self.load_record(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Generate a new store identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn ensure_normalized(composition: &Composition) -> Result<()> {
    if composition.is_normalized() {
        Ok(())
    } else {
        Err(Error::InvalidComposition(
            "block order must be 0..n-1 before saving".to_string(),
        ))
    }
}

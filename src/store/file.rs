//! Directory-backed composition store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{ensure_normalized, new_id, CompositionStore, StoredComposition, StoredSummary};
use crate::error::{Error, Result};
use crate::model::Composition;

const EXTENSION: &str = "json";

/// Store that keeps each composition in `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        if is_valid_id(id) {
            Some(self.dir.join(format!("{}.{}", id, EXTENSION)))
        } else {
            None
        }
    }

    fn read_record(&self, path: &Path, id: &str) -> Result<StoredComposition> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::CompositionNotFound(id.to_string()))
            }
            Err(e) => return Err(Error::Store(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_slice(&data)
            .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))
    }

    fn write_record(&self, path: &Path, record: &StoredComposition) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Store(format!("{}: {}", self.dir.display(), e)))?;

        let json = serde_json::to_string_pretty(record)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Error::Store(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path).map_err(|e| {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("could not remove {}: {}", tmp.display(), cleanup);
            }
            Error::Store(format!("{}: {}", path.display(), e))
        })
    }
}

/// Ids become file names, so only a conservative character set is accepted.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl CompositionStore for FileStore {
    fn load_record(&self, id: &str) -> Result<StoredComposition> {
        let path = self
            .path_for(id)
            .ok_or_else(|| Error::CompositionNotFound(id.to_string()))?;
        self.read_record(&path, id)
    }

    fn save_named(
        &self,
        composition: &Composition,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<String> {
        ensure_normalized(composition)?;
        let id = match id {
            Some(id) => id.to_string(),
            None => new_id(),
        };
        let path = self
            .path_for(&id)
            .ok_or_else(|| Error::Store(format!("invalid composition id: {:?}", id)))?;
        let name = name.map(str::to_string);

        let record = match self.read_record(&path, &id) {
            Ok(mut existing) => {
                existing.update(composition.clone(), name);
                existing
            }
            Err(e) if e.is_not_found() => {
                StoredComposition::new(id.clone(), composition.clone(), name)
            }
            Err(e) => return Err(e),
        };

        self.write_record(&path, &record)?;
        debug!("saved composition {} to {}", id, path.display());
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self
            .path_for(id)
            .ok_or_else(|| Error::CompositionNotFound(id.to_string()))?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::CompositionNotFound(id.to_string()))
            }
            Err(e) => Err(Error::Store(format!("{}: {}", path.display(), e))),
        }
    }

    fn list(&self) -> Result<Vec<StoredSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Store(format!("{}: {}", self.dir.display(), e))),
        };

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_id(id) {
                continue;
            }
            match self.read_record(&path, id) {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Direction};

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store"));

        let mut c = Composition::create_default();
        c.push_block(BlockKind::Content, Some("<p>P.S.</p>".into()));
        c.move_block(3, Direction::Up);
        c.set_style("backgroundImage", "/uploads/bg.jpg").unwrap();

        let id = store.save(&c, None).unwrap();
        assert!(store.dir().join(format!("{}.json", id)).exists());
        assert_eq!(store.load(&id).unwrap(), c);
    }

    #[test]
    fn test_overwrite_updates_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .save_named(&Composition::create_default(), Some("welcome"), Some("Welcome"))
            .unwrap();
        let first = store.load_record("welcome").unwrap();

        let mut c = Composition::create_default();
        c.set_style("theme", "dark").unwrap();
        store.save(&c, Some("welcome")).unwrap();

        let record = store.load_record("welcome").unwrap();
        assert_eq!(record.composition.style.theme, "dark");
        assert_eq!(record.name.as_deref(), Some("Welcome"));
        assert_eq!(record.created_at, first.created_at);
        assert!(record.updated_at >= first.updated_at);
    }

    #[test]
    fn test_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.load("absent"),
            Err(Error::CompositionNotFound(_))
        ));
        assert!(matches!(
            store.load("../etc/passwd"),
            Err(Error::CompositionNotFound(_))
        ));
        assert!(matches!(
            store.save(&Composition::new(), Some("a/b")),
            Err(Error::Store(_))
        ));
        assert!(store.delete("absent").unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        store.save(&Composition::create_default(), Some("b")).unwrap();
        store.save(&Composition::new(), Some("a")).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let list = store.list().unwrap();
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(list[1].block_count, 3);
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::create_dir(dir.path().join("blocked.json")).unwrap();
        fs::write(dir.path().join("blocked.json").join("keep"), "x").unwrap();

        let record = StoredComposition::new("blocked", Composition::new(), None);
        let err = store
            .write_record(&dir.path().join("blocked.json"), &record)
            .unwrap_err();

        assert!(matches!(err, Error::Store(_)));
        assert!(!dir.path().join("blocked.json.tmp").exists());
    }

    #[test]
    fn test_load_normalizes_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let record = r#"{
            "id": "gappy",
            "composition": {"blocks": [
                {"id": 1, "type": "title", "content": "a", "order": 4},
                {"id": 2, "type": "title", "content": "b", "order": 1}
            ]},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        fs::write(dir.path().join("gappy.json"), record).unwrap();

        let c = FileStore::new(dir.path()).load("gappy").unwrap();
        assert!(c.is_normalized());
        assert_eq!(c.blocks()[0].id, 2);
    }

    #[test]
    fn test_list_missing_dir() {
        let store = FileStore::new("/nonexistent/blockmail-store");
        assert!(store.list().unwrap().is_empty());
    }
}

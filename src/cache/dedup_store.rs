// dedup_store.rs - embedded key/value store with content deduplication
//
// Mirrors the original's two-table SQL scheme (key -> content_hash,
// content_hash -> blob) on top of `sled`'s tree model instead of a SQL
// engine: no example repo in the pack pulls in a SQL crate, and `sled`'s
// two-tree shape is a direct structural match for "two tables".

use sha2::{Digest, Sha256};
use sled::Db;

use super::traits::KeyValueStore;

const KEYS_TREE: &str = "keys";
const BLOBS_TREE: &str = "blobs";

pub struct DedupStore {
    db: Db,
}

impl DedupStore {
    pub fn open(path: &std::path::Path) -> Result<Self, String> {
        let db = sled::open(path).map_err(|e| format!("opening cache at {}: {}", path.display(), e))?;
        Ok(Self { db })
    }

    fn keys_tree(&self) -> Result<sled::Tree, String> {
        self.db.open_tree(KEYS_TREE).map_err(|e| e.to_string())
    }

    fn blobs_tree(&self) -> Result<sled::Tree, String> {
        self.db.open_tree(BLOBS_TREE).map_err(|e| e.to_string())
    }

    fn content_hash(value: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(value);
        hasher.finalize().into()
    }
}

impl KeyValueStore for DedupStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, String> {
        let keys = self.keys_tree()?;
        let Some(hash) = keys.get(key).map_err(|e| e.to_string())? else {
            return Ok(None);
        };
        let blobs = self.blobs_tree()?;
        let value = blobs.get(hash).map_err(|e| e.to_string())?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), String> {
        let hash = Self::content_hash(value);
        let blobs = self.blobs_tree()?;
        if !blobs.contains_key(hash).map_err(|e| e.to_string())? {
            blobs.insert(&hash, value).map_err(|e| e.to_string())?;
        }
        let keys = self.keys_tree()?;
        keys.insert(key, &hash).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), String> {
        let keys = self.keys_tree()?;
        keys.remove(key).map_err(|e| e.to_string())?;
        // The referenced blob is left in place: another key may share the
        // same content hash and deduplication has no reference counting,
        // matching the original's append-only dedup store.
        Ok(())
    }

    fn close(&self) -> Result<(), String> {
        self.db.flush().map_err(|e| e.to_string())?;
        Ok(())
    }

    fn drop_all(&self) -> Result<(), String> {
        self.keys_tree()?.clear().map_err(|e| e.to_string())?;
        self.blobs_tree()?.clear().map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::open(&dir.path().join("cache.sled")).unwrap();
        store.put(b"k1", b"value-one").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"value-one".to_vec()));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn identical_values_share_one_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::open(&dir.path().join("cache.sled")).unwrap();
        store.put(b"a", b"same-bytes").unwrap();
        store.put(b"b", b"same-bytes").unwrap();
        let blobs = store.blobs_tree().unwrap();
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn drop_all_empties_both_trees() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::open(&dir.path().join("cache.sled")).unwrap();
        store.put(b"k", b"v").unwrap();
        store.drop_all().unwrap();
        assert_eq!(store.get(b"k").unwrap(), None);
    }
}

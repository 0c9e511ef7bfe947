// flat_store.rs - flat directory store, hex digest split into nested path segments

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::traits::KeyValueStore;

/// Marker file written into every cache root this store creates. `drop_all`
/// refuses to `remove_dir_all` a directory that lacks it, so a misconfigured
/// or stale `--cache-path` pointing at an unrelated directory can never be
/// wiped out from under the caller.
const SENTINEL_FILE: &str = ".styleprobe-cache";

pub struct FlatStore {
    root: PathBuf,
}

impl FlatStore {
    pub fn open(root: &Path) -> Result<Self, String> {
        fs::create_dir_all(root).map_err(|e| format!("creating cache dir {}: {}", root.display(), e))?;
        fs::write(root.join(SENTINEL_FILE), b"").map_err(|e| format!("writing cache sentinel in {}: {}", root.display(), e))?;
        Ok(Self { root: root.to_path_buf() })
    }

    /// `key` is already a digest by the time it reaches the cache (see
    /// `cache::mod::mixtohash`); re-hash defensively so arbitrary byte
    /// strings still produce a safe path.
    fn path_for(&self, key: &[u8]) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key);
        let digest = hasher.finalize();
        let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();
        self.root.join(&hex[0..2]).join(&hex[2..4]).join(&hex[4..6]).join(&hex[6..])
    }
}

impl KeyValueStore for FlatStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, String> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(format!("reading {}: {}", path.display(), e)),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), String> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        // Write via a temp file in the same directory then rename, so a
        // concurrent reader never observes a partially written blob.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).map_err(|e| e.to_string())?;
        fs::rename(&tmp, &path).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), String> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn drop_all(&self) -> Result<(), String> {
        if self.root.exists() {
            if !self.root.join(SENTINEL_FILE).is_file() {
                return Err(format!(
                    "refusing to clear {}: missing {} marker, does not look like a styleprobe cache directory",
                    self.root.display(),
                    SENTINEL_FILE
                ));
            }
            fs::remove_dir_all(&self.root).map_err(|e| e.to_string())?;
        }
        fs::create_dir_all(&self.root).map_err(|e| e.to_string())?;
        fs::write(self.root.join(SENTINEL_FILE), b"").map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatStore::open(dir.path()).unwrap();
        store.put(b"key", b"payload").unwrap();
        assert_eq!(store.get(b"key").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn missing_key_returns_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"absent").unwrap(), None);
    }

    #[test]
    fn drop_all_refuses_a_directory_without_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("not-ours.txt"), b"keep me").unwrap();
        let store = FlatStore { root: dir.path().to_path_buf() };
        assert!(store.drop_all().is_err());
        assert!(dir.path().join("not-ours.txt").exists());
    }

    #[test]
    fn drop_all_clears_a_genuine_cache_and_recreates_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatStore::open(dir.path()).unwrap();
        store.put(b"key", b"payload").unwrap();
        store.drop_all().unwrap();
        assert_eq!(store.get(b"key").unwrap(), None);
        assert!(dir.path().join(SENTINEL_FILE).is_file());
    }
}

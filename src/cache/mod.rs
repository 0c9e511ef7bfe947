// mod.rs - content-addressed cache: key derivation, value framing, compression

pub mod dedup_store;
pub mod flat_store;
pub mod traits;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

pub use dedup_store::DedupStore;
pub use flat_store::FlatStore;
pub use traits::KeyValueStore;

use crate::runner::{ExeCall, ExeResult};

/// Resolved identity of an executable: what changes if the binary is
/// upgraded or swapped out from under the cache. Memoized per process,
/// keyed by the raw argument string the caller used to name the
/// executable (not its resolved path) — a formatter invoked once as
/// `clang-format` and once as `/usr/bin/clang-format` is hashed twice,
/// matching the original's behavior rather than "fixing" it.
#[derive(Debug, Clone)]
struct ExeIdentity {
    digest: [u8; 32],
}

fn compute_exe_identity(exe: &str) -> ExeIdentity {
    let mut hasher = Sha256::new();
    hasher.update(exe.as_bytes());
    if let Ok(meta) = fs::metadata(exe) {
        hasher.update(meta.len().to_le_bytes());
        if let Ok(modified) = meta.modified() {
            if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
                hasher.update(since_epoch.as_secs().to_le_bytes());
            }
        }
    }
    if let Ok(content) = fs::read(exe) {
        let mut content_hasher = Sha256::new();
        content_hasher.update(&content);
        hasher.update(content_hasher.finalize());
    }
    if let Ok(output) = std::process::Command::new(exe).arg("--version").output() {
        hasher.update(output.stdout);
    }
    ExeIdentity { digest: hasher.finalize().into() }
}

/// Content-addressed cache of subprocess results. Wraps a [`KeyValueStore`]
/// backend with the key-derivation and value-framing rules from §4.2.
pub struct Cache {
    store: Box<dyn KeyValueStore>,
    exe_identity_memo: Mutex<HashMap<String, ExeIdentity>>,
}

impl Cache {
    pub fn dedup_backend(path: &Path) -> Result<Self, String> {
        Ok(Self { store: Box::new(DedupStore::open(path)?), exe_identity_memo: Mutex::new(HashMap::new()) })
    }

    pub fn flat_backend(path: &Path) -> Result<Self, String> {
        Ok(Self { store: Box::new(FlatStore::open(path)?), exe_identity_memo: Mutex::new(HashMap::new()) })
    }

    fn exe_identity(&self, exe: &str) -> ExeIdentity {
        let mut memo = self.exe_identity_memo.lock().unwrap();
        memo.entry(exe.to_string()).or_insert_with(|| compute_exe_identity(exe)).clone()
    }

    /// Single cryptographic hash over, in order: each dependency file's
    /// path bytes then its content digest; each argv string, NUL-terminated;
    /// stdin bytes; the executable identity digest.
    pub fn cache_key(&self, call: &ExeCall, dep_files: &[&Path]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        for path in dep_files {
            hasher.update(path.to_string_lossy().as_bytes());
            let digest = match fs::read(path) {
                Ok(content) => {
                    let mut h = Sha256::new();
                    h.update(&content);
                    h.finalize()
                }
                Err(_) => Sha256::new().finalize(),
            };
            hasher.update(digest);
        }
        for arg in &call.argv {
            hasher.update(arg.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(&call.stdin);
        hasher.update(self.exe_identity(&call.exe).digest);
        hasher.finalize().to_vec()
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<ExeResult>, String> {
        match self.store.get(key)? {
            Some(compressed) => {
                let raw = lz4_flex::block::decompress_size_prepended(&compressed)
                    .map_err(|e| format!("decompressing cache entry: {}", e))?;
                Ok(Some(unpack_exeresult(&raw)?))
            }
            None => Ok(None),
        }
    }

    pub fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<ExeResult>>, String> {
        let raw = self.store.mget(keys)?;
        raw.into_iter()
            .map(|entry| match entry {
                Some(compressed) => {
                    let raw = lz4_flex::block::decompress_size_prepended(&compressed)
                        .map_err(|e| format!("decompressing cache entry: {}", e))?;
                    Ok(Some(unpack_exeresult(&raw)?))
                }
                None => Ok(None),
            })
            .collect()
    }

    pub fn put(&self, key: &[u8], result: &ExeResult) -> Result<(), String> {
        let packed = pack_exeresult(result);
        let compressed = lz4_flex::block::compress_prepend_size(&packed);
        self.store.put(key, &compressed)
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), String> {
        self.store.delete(key)
    }

    pub fn close(&self) -> Result<(), String> {
        self.store.close()
    }

    pub fn drop_all(&self) -> Result<(), String> {
        self.store.drop_all()
    }
}

/// `"{rc} {stdout_len} {stderr_len}|" + stdout_bytes + stderr_bytes`. Only
/// the exit-code/timeout/os-error fields that are deterministic function
/// outputs of the cache key's inputs are cached; a timed-out or
/// unlaunchable result is never written.
fn pack_exeresult(result: &ExeResult) -> Vec<u8> {
    let rc = result.exit_code.unwrap_or(-1);
    let header = format!("{} {} {}|", rc, result.stdout.len(), result.stderr.len());
    let mut out = header.into_bytes();
    out.extend_from_slice(&result.stdout);
    out.extend_from_slice(&result.stderr);
    out
}

fn unpack_exeresult(raw: &[u8]) -> Result<ExeResult, String> {
    let sep = raw.iter().position(|&b| b == b'|').ok_or("cache entry missing header separator")?;
    let header = std::str::from_utf8(&raw[..sep]).map_err(|e| e.to_string())?;
    let mut parts = header.split(' ');
    let rc: i32 = parts.next().ok_or("missing rc")?.parse().map_err(|_| "bad rc")?;
    let stdout_len: usize = parts.next().ok_or("missing stdout_len")?.parse().map_err(|_| "bad stdout_len")?;
    let stderr_len: usize = parts.next().ok_or("missing stderr_len")?.parse().map_err(|_| "bad stderr_len")?;

    let tail = &raw[sep + 1..];
    if tail.len() != stdout_len + stderr_len {
        return Err(format!("cache entry length mismatch: expected {}, got {}", stdout_len + stderr_len, tail.len()));
    }
    let (stdout, stderr) = tail.split_at(stdout_len);
    Ok(ExeResult {
        exit_code: Some(rc),
        stdout: stdout.to_vec(),
        stderr: stderr.to_vec(),
        wall_time_seconds: 0.0,
        timed_out: false,
        os_error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ExeResult {
        ExeResult { exit_code: Some(0), stdout: b"formatted".to_vec(), stderr: Vec::new(), wall_time_seconds: 0.1, timed_out: false, os_error: None }
    }

    #[test]
    fn pack_unpack_round_trips() {
        let result = sample_result();
        let packed = pack_exeresult(&result);
        let unpacked = unpack_exeresult(&packed).unwrap();
        assert_eq!(unpacked.exit_code, result.exit_code);
        assert_eq!(unpacked.stdout, result.stdout);
        assert_eq!(unpacked.stderr, result.stderr);
    }

    #[test]
    fn unpack_rejects_length_mismatch() {
        let bad = b"0 5 0|abc".to_vec();
        assert!(unpack_exeresult(&bad).is_err());
    }

    #[test]
    fn cache_fidelity_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::flat_backend(dir.path()).unwrap();
        let call = ExeCall::new("cat", vec![], b"x".to_vec());
        let key = cache.cache_key(&call, &[]);
        cache.put(&key, &sample_result()).unwrap();
        let fetched = cache.get(&key).unwrap().unwrap();
        assert_eq!(fetched.stdout, b"formatted");
    }

    #[test]
    fn mget_preserves_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::flat_backend(dir.path()).unwrap();
        let key_a = vec![1u8; 4];
        let key_b = vec![2u8; 4];
        cache.put(&key_a, &sample_result()).unwrap();
        let results = cache.mget(&[key_a, key_b]).unwrap();
        assert!(results[0].is_some());
        assert!(results[1].is_none());
    }
}

// tempfiles.rs - scoped temp files for formatter config sidecars and diff inputs
//
// Config sidecars and variant snapshots are tracked in two scopes, per the
// data model's temp-file lifecycle: per-round (cleared between rounds) and
// per-run (cleared at process exit unless `--keep-temp-files` is set).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);
static KEEP_TEMP_FILES: AtomicBool = AtomicBool::new(false);

/// Set once at startup from `--keep-temp-files`; read by every `TempScope`
/// created afterward via `TempScope::scoped()`.
pub fn set_keep_temp_files(keep: bool) {
    KEEP_TEMP_FILES.store(keep, Ordering::Relaxed);
}

pub fn keep_temp_files() -> bool {
    KEEP_TEMP_FILES.load(Ordering::Relaxed)
}

/// A directory under the OS temp dir, unique per process, holding every
/// temp file this run creates. Filenames embed a content digest so
/// concurrent producers within the same run never collide.
#[derive(Debug)]
pub struct TempScope {
    dir: PathBuf,
    keep: bool,
}

impl TempScope {
    pub fn new(keep: bool) -> Result<Self, String> {
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("styleprobe-{}", pid));
        std::fs::create_dir_all(&dir).map_err(|e| format!("creating temp dir {}: {}", dir.display(), e))?;
        Ok(Self { dir, keep })
    }

    /// Convenience constructor honoring the process-wide `--keep-temp-files`
    /// setting instead of a caller-supplied override.
    pub fn scoped() -> Result<Self, String> {
        Self::new(keep_temp_files())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a path under this scope named after a content digest plus a
    /// per-process monotonic counter, guaranteeing uniqueness even when
    /// two distinct contents hash the same prefix used for display.
    pub fn path_for_digest(&self, digest_hex: &str, suffix: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{}-{}.{}", digest_hex, n, suffix))
    }

    pub fn write(&self, digest_hex: &str, suffix: &str, content: &[u8]) -> Result<PathBuf, String> {
        let path = self.path_for_digest(digest_hex, suffix);
        std::fs::write(&path, content).map_err(|e| format!("writing temp file {}: {}", path.display(), e))?;
        Ok(path)
    }
}

impl Drop for TempScope {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}

pub fn content_digest_hex(content: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}

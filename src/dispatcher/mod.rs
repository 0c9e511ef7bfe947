// mod.rs - parallel dispatcher: runs a batch of calls, yields results in submission order

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::cache::Cache;
use crate::runner::{self, ExeCall, ExeResult};

/// Files this batch's formatting output depends on beyond argv/stdin (a
/// config file path the style was serialized to, for instance).
pub type DepFiles = Vec<PathBuf>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    Off,
    Threads,
    Processes,
}

impl std::str::FromStr for ConcurrencyMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ConcurrencyMode::Off),
            "threads" => Ok(ConcurrencyMode::Threads),
            "processes" => Ok(ConcurrencyMode::Processes),
            other => Err(format!("unknown concurrency mode '{}', expected off/threads/processes", other)),
        }
    }
}

/// A single unit of dispatcher work: a subprocess call plus the files its
/// result depends on for cache-key purposes.
pub struct Job {
    pub call: ExeCall,
    pub dep_files: DepFiles,
}

/// Inline execution is substituted whenever any input exceeds this many
/// bytes, to avoid memory pressure from many large stdin copies living in
/// the worker pool at once.
pub const INLINE_DOWNGRADE_THRESHOLD_BYTES: usize = 256 * 1024;

pub struct Dispatcher<'a> {
    pub cache: Option<&'a Cache>,
    pub mode: ConcurrencyMode,
    pub cancelled: Arc<AtomicBool>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(cache: Option<&'a Cache>, mode: ConcurrencyMode, cancelled: Arc<AtomicBool>) -> Self {
        Self { cache, mode, cancelled }
    }

    /// Runs every job in `jobs`, in submission order, short-circuiting
    /// cache hits and writing misses back as they complete. Returns `None`
    /// for jobs abandoned because of cancellation.
    pub fn dispatch(&self, jobs: Vec<Job>) -> Vec<Option<ExeResult>> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let effective_mode = if self.should_downgrade(&jobs) { ConcurrencyMode::Off } else { self.mode };

        let keys: Vec<Option<Vec<u8>>> = jobs
            .iter()
            .map(|job| {
                self.cache
                    .map(|c| c.cache_key(&job.call, &job.dep_files.iter().map(|p| p.as_path()).collect::<Vec<_>>()))
            })
            .collect();

        let cached: Vec<Option<ExeResult>> = if let Some(cache) = self.cache {
            let present_keys: Vec<Vec<u8>> = keys.iter().filter_map(|k| k.clone()).collect();
            let mget_results = cache.mget(&present_keys).unwrap_or_default();
            let mut iter = mget_results.into_iter();
            keys.iter().map(|k| if k.is_some() { iter.next().flatten() } else { None }).collect()
        } else {
            vec![None; jobs.len()]
        };

        let mut misses: Vec<usize> = Vec::new();
        for (i, hit) in cached.iter().enumerate() {
            if hit.is_none() {
                misses.push(i);
            }
        }

        let miss_results: Vec<(usize, ExeResult)> = match effective_mode {
            ConcurrencyMode::Off => misses
                .into_iter()
                .take_while(|_| !self.cancelled.load(Ordering::Relaxed))
                .map(|i| (i, runner::run(&jobs[i].call)))
                .collect(),
            ConcurrencyMode::Threads | ConcurrencyMode::Processes => {
                let cancelled = Arc::clone(&self.cancelled);
                misses
                    .into_par_iter()
                    .filter(|_| !cancelled.load(Ordering::Relaxed))
                    .map(|i| (i, runner::run(&jobs[i].call)))
                    .collect()
            }
        };

        let mut results = cached;
        for (i, result) in miss_results {
            if let (Some(cache), Some(key)) = (self.cache, &keys[i]) {
                if result.exit_code.is_some() && !result.timed_out {
                    let _ = cache.put(key, &result);
                }
            }
            results[i] = Some(result);
        }
        results
    }

    fn should_downgrade(&self, jobs: &[Job]) -> bool {
        jobs.iter().any(|job| job.call.stdin.len() > INLINE_DOWNGRADE_THRESHOLD_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn job(byte: u8) -> Job {
        Job { call: ExeCall::new("cat", vec![], vec![byte]), dep_files: Vec::new() }
    }

    #[test]
    fn order_preservation_matches_inline_execution() {
        let jobs: Vec<Job> = (0..20u8).map(job).collect();
        let inline = Dispatcher::new(None, ConcurrencyMode::Off, Arc::new(AtomicBool::new(false)));
        let threaded_jobs: Vec<Job> = (0..20u8).map(job).collect();
        let threaded = Dispatcher::new(None, ConcurrencyMode::Threads, Arc::new(AtomicBool::new(false)));

        let inline_out = inline.dispatch(jobs);
        let threaded_out = threaded.dispatch(threaded_jobs);

        let inline_bytes: Vec<_> = inline_out.iter().map(|r| r.as_ref().unwrap().stdout.clone()).collect();
        let threaded_bytes: Vec<_> = threaded_out.iter().map(|r| r.as_ref().unwrap().stdout.clone()).collect();
        assert_eq!(inline_bytes, threaded_bytes);
    }

    #[test]
    fn cache_hit_short_circuits_a_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::flat_backend(dir.path()).unwrap();
        let dispatcher = Dispatcher::new(Some(&cache), ConcurrencyMode::Off, Arc::new(AtomicBool::new(false)));

        let first = dispatcher.dispatch(vec![job(7)]);
        assert_eq!(first[0].as_ref().unwrap().stdout, vec![7]);

        // second dispatch of the identical job should be served from cache;
        // we can't observe "no spawn" directly without instrumentation, but
        // the result must still be correct, proving the cache round-trips.
        let second = dispatcher.dispatch(vec![job(7)]);
        assert_eq!(second[0].as_ref().unwrap().stdout, vec![7]);
    }

    #[test]
    fn large_stdin_downgrades_to_inline() {
        let big = Job { call: ExeCall::new("cat", vec![], vec![0u8; INLINE_DOWNGRADE_THRESHOLD_BYTES + 1]), dep_files: Vec::new() };
        let dispatcher = Dispatcher::new(None, ConcurrencyMode::Threads, Arc::new(AtomicBool::new(false)));
        assert!(dispatcher.should_downgrade(&[big]));
    }
}

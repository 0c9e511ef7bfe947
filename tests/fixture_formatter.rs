// fixture_formatter.rs - exercises the runner, cache, and dispatcher against
// the trivial-formatter stand-in binary, so these stay covered without a
// real clang-format/rustfmt install.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use styleprobe::cache::Cache;
use styleprobe::dispatcher::{ConcurrencyMode, Dispatcher, Job};
use styleprobe::runner::{self, ExeCall};

fn fixture_exe() -> String {
    env!("CARGO_BIN_EXE_trivial-formatter").to_string()
}

#[test]
fn runner_reindents_stdin() {
    let call = ExeCall::new(fixture_exe(), vec!["--width".to_string(), "2".to_string()], b"  a\n    b\n".to_vec());
    let result = runner::run(&call);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout, b"  a\n  b\n");
}

#[test]
fn runner_reports_nonzero_exit_on_fail_flag() {
    let call = ExeCall::new(fixture_exe(), vec!["--fail".to_string()], Vec::new());
    let result = runner::run(&call);
    assert_eq!(result.exit_code, Some(2));
    assert!(result.os_error.is_none());
}

#[test]
fn runner_honors_timeout() {
    let call = ExeCall::new(fixture_exe(), vec!["--sleep-ms".to_string(), "500".to_string()], Vec::new()).with_timeout(0);
    let result = runner::run(&call);
    assert!(result.timed_out);
}

#[test]
fn cache_round_trips_a_fixture_result() {
    let dir = std::env::temp_dir().join(format!("styleprobe-test-cache-{}", std::process::id()));
    let cache = Cache::dedup_backend(&dir).expect("opening dedup cache");

    let call = ExeCall::new(fixture_exe(), vec!["--width".to_string(), "4".to_string()], b"x\n".to_vec());
    let key = cache.cache_key(&call, &[]);
    assert!(cache.get(&key).unwrap().is_none());

    let result = runner::run(&call);
    cache.put(&key, &result).unwrap();

    let reloaded = cache.get(&key).unwrap().expect("cache hit after put");
    assert_eq!(reloaded.stdout, result.stdout);
    assert_eq!(reloaded.exit_code, result.exit_code);

    cache.drop_all().unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dispatcher_preserves_submission_order_across_threads() {
    let exe = fixture_exe();
    let jobs: Vec<Job> = (0..8)
        .map(|i| Job {
            call: ExeCall::new(exe.clone(), vec!["--width".to_string(), i.to_string()], format!("line{}\n", i).into_bytes()),
            dep_files: Vec::<PathBuf>::new(),
        })
        .collect();

    let dispatcher = Dispatcher::new(None, ConcurrencyMode::Threads, Arc::new(AtomicBool::new(false)));
    let results = dispatcher.dispatch(jobs);

    assert_eq!(results.len(), 8);
    for (i, result) in results.iter().enumerate() {
        let result = result.as_ref().expect("every fixture call succeeds");
        let expected_indent = " ".repeat(i);
        assert_eq!(result.stdout, format!("{}line{}\n", expected_indent, i).into_bytes());
    }
}

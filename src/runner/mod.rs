// mod.rs - subprocess runner: executes one program with argv + stdin under a timeout

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Everything needed to launch one subprocess call. Cheap to clone so the
/// dispatcher can hand the same call to a cache lookup and, on a miss, to a
/// worker.
#[derive(Debug, Clone)]
pub struct ExeCall {
    pub exe: String,
    pub argv: Vec<String>,
    pub stdin: Vec<u8>,
    pub timeout_seconds: u64,
}

impl ExeCall {
    pub fn new(exe: impl Into<String>, argv: Vec<String>, stdin: Vec<u8>) -> Self {
        Self { exe: exe.into(), argv, stdin, timeout_seconds: 30 }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Raw result of one subprocess call. `os_error` is set instead of the
/// caller panicking when the executable cannot even be launched; streams
/// are always byte-for-byte, never text-decoded.
#[derive(Debug, Clone, Default)]
pub struct ExeResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub wall_time_seconds: f64,
    pub timed_out: bool,
    pub os_error: Option<String>,
}

impl ExeResult {
    fn launch_failure(msg: String) -> Self {
        Self { exit_code: None, stdout: Vec::new(), stderr: Vec::new(), wall_time_seconds: 0.0, timed_out: false, os_error: Some(msg) }
    }
}

/// Run `call`, never panicking regardless of what the child does. Spawns a
/// watchdog thread that kills the child once `timeout_seconds` elapses;
/// `std::process` plus `std::thread` only, no extra dependency.
pub fn run(call: &ExeCall) -> ExeResult {
    let start = Instant::now();
    let mut child = match Command::new(&call.exe)
        .args(&call.argv)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return ExeResult::launch_failure(format!("{}: {}", call.exe, e)),
    };

    if let Some(mut stdin) = child.stdin.take() {
        let data = call.stdin.clone();
        // Write on a side thread: a child that doesn't drain stdin before
        // producing output would otherwise deadlock against our own
        // blocking write.
        std::thread::spawn(move || {
            let _ = stdin.write_all(&data);
        });
    }

    // Shared handle so the watchdog can kill the child out from under the
    // thread that is blocked in `wait_with_output`.
    let killable: Arc<Mutex<Option<Child>>> = Arc::new(Mutex::new(Some(child)));
    let watchdog_handle = Arc::clone(&killable);
    let timeout = Duration::from_secs(call.timeout_seconds);
    let (timer_tx, timer_rx) = mpsc::channel::<()>();
    let watchdog = std::thread::spawn(move || {
        if timer_rx.recv_timeout(timeout).is_err() {
            if let Some(child) = watchdog_handle.lock().unwrap().as_mut() {
                let _ = child.kill();
            }
        }
    });

    let output = {
        let mut guard = killable.lock().unwrap();
        guard.take().unwrap().wait_with_output()
    };
    let _ = timer_tx.send(());
    let _ = watchdog.join();

    match output {
        Ok(output) => {
            if output.status.code().is_none() && start.elapsed() >= timeout {
                ExeResult {
                    exit_code: None,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    wall_time_seconds: start.elapsed().as_secs_f64(),
                    timed_out: true,
                    os_error: None,
                }
            } else {
                ExeResult {
                    exit_code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                    wall_time_seconds: start.elapsed().as_secs_f64(),
                    timed_out: false,
                    os_error: None,
                }
            }
        }
        Err(e) => ExeResult::launch_failure(format!("{}: {}", call.exe, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_reports_os_error_not_panic() {
        let call = ExeCall::new("definitely-not-a-real-binary-xyz", vec![], vec![]);
        let result = run(&call);
        assert!(result.os_error.is_some());
        assert_eq!(result.exit_code, None);
    }

    #[test]
    fn stdin_round_trips_through_cat() {
        let call = ExeCall::new("cat", vec![], b"hello world".to_vec());
        let result = run(&call);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, b"hello world");
    }

    #[test]
    fn nonzero_exit_is_reported_not_raised() {
        let call = ExeCall::new("false", vec![], vec![]);
        let result = run(&call);
        assert_eq!(result.exit_code, Some(1));
        assert!(!result.timed_out);
    }
}

// trivial_formatter.rs - stand-in formatter for integration tests
//
// Reads stdin, reindents it by a `--width N` number of spaces (default 4,
// stripping existing leading whitespace first) and writes the result to
// stdout. `--fail` exits 2 immediately without touching stdin, simulating
// an "unknown option" style formatter crash. `--sleep-ms N` blocks before
// responding, for exercising the runner's timeout path. `--version` prints
// a fixed version string and exits, independent of every other flag.
// `--log PATH` appends this invocation's argv to PATH before anything else
// runs, so a test can count how many times a particular flag combination
// was actually invoked.

use std::io::{Read, Write};

fn find_flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
}

fn log_invocation(path: &str, args: &[String]) {
    if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(f, "{}", args.join(" "));
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Some(log_path) = find_flag_value(&args, "--log") {
        log_invocation(&log_path, &args);
    }

    if args.iter().any(|a| a == "--version") {
        println!("trivial-formatter 1.0.0");
        return;
    }
    if args.iter().any(|a| a == "--fail") {
        eprintln!("error: unknown option");
        std::process::exit(2);
    }

    let mut width = 4usize;
    let mut sleep_ms = 0u64;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--width" => {
                if let Some(value) = iter.next() {
                    width = value.parse().unwrap_or(4);
                }
            }
            "--sleep-ms" => {
                if let Some(value) = iter.next() {
                    sleep_ms = value.parse().unwrap_or(0);
                }
            }
            _ => {}
        }
    }

    if sleep_ms > 0 {
        std::thread::sleep(std::time::Duration::from_millis(sleep_ms));
    }

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        std::process::exit(1);
    }

    let indent = " ".repeat(width);
    let reindented: String = input
        .lines()
        .map(|line| format!("{}{}\n", indent, line.trim_start()))
        .collect();

    let _ = std::io::stdout().write_all(reindented.as_bytes());
}

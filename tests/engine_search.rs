// engine_search.rs - drives a real SearchEngine through several rounds
// against the trivial-formatter fixture, exercising the round loop itself
// rather than DistanceVector in isolation.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use styleprobe::engine::types::Mode;
use styleprobe::engine::{InputFile, SearchConfig, SearchEngine};
use styleprobe::formatters::{FormatterAdapter, Variant};
use styleprobe::runner::{ExeCall, ExeResult};
use styleprobe::style::{OptionDef, OptionType, OptionValue, Style, StyleSchema};

fn fixture_exe() -> String {
    env!("CARGO_BIN_EXE_trivial-formatter").to_string()
}

/// Drives `trivial-formatter`'s two test-only knobs: `width` (an unsigned
/// indent width) and `broken` (a bool that, when true, passes `--fail` and
/// always triggers the fixture's "unknown option" style crash). `log_path`,
/// when set, is appended to every invocation's argv so a test can count how
/// many times a particular group actually ran.
#[derive(Debug)]
struct TestAdapter {
    schema: StyleSchema,
    log_path: Option<String>,
}

impl TestAdapter {
    fn new(log_path: Option<String>) -> Self {
        let mut schema = StyleSchema::new();
        schema.register(OptionDef::new("width", OptionType::Unsigned));
        schema.register(OptionDef::new("broken", OptionType::Bool));
        Self { schema, log_path }
    }
}

impl FormatterAdapter for TestAdapter {
    fn name(&self) -> &str {
        "test-adapter"
    }

    fn register_schema(&mut self, _exe: &str) -> Result<(), String> {
        Ok(())
    }

    fn schema(&self) -> &StyleSchema {
        &self.schema
    }

    fn variants_for(&self, option_name: &str) -> Vec<Variant> {
        match option_name {
            "width" => (1..=3)
                .map(|n| Variant::new(Style::single("width", OptionValue::Int(n))))
                .collect(),
            "broken" => vec![true, false]
                .into_iter()
                .map(|b| Variant::new(Style::single("broken", OptionValue::Bool(b))))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn argv_for_style(&self, _exe: &str, style: &Style) -> Result<Vec<String>, String> {
        let mut argv = Vec::new();
        if let Some(log_path) = &self.log_path {
            argv.push("--log".to_string());
            argv.push(log_path.clone());
        }
        if let Some(OptionValue::Int(width)) = style.get("width") {
            argv.push("--width".to_string());
            argv.push(width.to_string());
        }
        if let Some(OptionValue::Bool(true)) = style.get("broken") {
            argv.push("--fail".to_string());
        }
        Ok(argv)
    }

    fn serialize(&self, _style: &Style) -> Vec<u8> {
        Vec::new()
    }

    fn detects_invalid_cmdline(&self, result: &ExeResult) -> bool {
        String::from_utf8_lossy(&result.stderr).contains("unknown option")
    }
}

fn make_inputs() -> Vec<InputFile> {
    vec![InputFile {
        source: "fixture.txt".into(),
        reference: "fixture.txt".into(),
        stdin: b"  one\n    two\nthree\n".to_vec(),
        reference_bytes: b"one\ntwo\nthree\n".to_vec(),
    }]
}

fn config(max_rounds: u32) -> SearchConfig {
    SearchConfig {
        mode: Mode::Normal,
        max_rounds,
        ignore_options: Default::default(),
        acceptance_strict_from_round: 3,
        bestofround: 0,
        concurrency: styleprobe::dispatcher::ConcurrencyMode::Threads,
        diff_tool: styleprobe::diff::DiffTool::Builtin,
        additive: true,
    }
}

#[test]
fn distance_is_non_increasing_as_more_rounds_are_allowed() {
    let mut previous_diff_sum = None;
    for max_rounds in [0u32, 1, 2, 4] {
        let mut adapter = TestAdapter::new(None);
        let outcome = SearchEngine::new(
            &mut adapter,
            fixture_exe(),
            make_inputs(),
            None,
            config(max_rounds),
            Arc::new(AtomicBool::new(false)),
        )
        .run(Style::new())
        .expect("search succeeds against the fixture");

        let diff_sum = outcome.best.distance.diff_sum;
        if let Some(prev) = previous_diff_sum {
            assert!(diff_sum <= prev, "distance regressed from {} to {} rounds: {} > {}", max_rounds - 1, max_rounds, diff_sum, prev);
        }
        previous_diff_sum = Some(diff_sum);
    }
}

#[test]
fn unknown_option_group_is_blacklisted_after_its_first_failure() {
    let log_path = std::env::temp_dir().join(format!("styleprobe-engine-test-log-{}.txt", std::process::id()));
    let log_path_str = log_path.to_string_lossy().into_owned();
    let _ = std::fs::remove_file(&log_path);

    let mut adapter = TestAdapter::new(Some(log_path_str));
    let outcome = SearchEngine::new(
        &mut adapter,
        fixture_exe(),
        make_inputs(),
        None,
        config(6),
        Arc::new(AtomicBool::new(false)),
    )
    .run(Style::new())
    .expect("search succeeds against the fixture");

    assert!(outcome.rounds_run >= 1);

    let log = std::fs::read_to_string(&log_path).unwrap_or_default();
    let fail_invocations = log.lines().filter(|line| line.contains("--fail")).count();
    assert_eq!(fail_invocations, 1, "the broken variant should only ever be tried once across the whole run:\n{}", log);

    let _ = std::fs::remove_file(&log_path);
}

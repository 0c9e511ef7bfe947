// output.rs - writes the inferred style and its optional metric sidecar

use std::path::Path;

use crate::engine::SearchOutcome;
use crate::formatters::FormatterAdapter;
use crate::runner::{self, ExeCall};
use crate::style::algebra;

/// Writes the winning style's serialized config to `path`, or stdout when
/// `path` is `None`.
pub fn write_style(adapter: &dyn FormatterAdapter, style: &crate::style::Style, path: Option<&Path>) -> Result<(), String> {
    let bytes = adapter.serialize(style);
    match path {
        Some(path) => std::fs::write(path, &bytes).map_err(|e| format!("writing style file {}: {}", path.display(), e)),
        None => {
            print!("{}", String::from_utf8_lossy(&bytes));
            Ok(())
        }
    }
}

/// Writes the metric sidecar line: the winning distance vector's
/// components, comma-joined, followed by the formatter's own version
/// string as a trailing comment. Regression suites diff this line across
/// runs rather than the (possibly much larger) style file itself.
pub fn write_metric_sidecar(exe: &str, outcome: &SearchOutcome, path: &Path) -> Result<(), String> {
    let version = formatter_version(exe);
    let d = outcome.best.distance;
    let components = [d.diff_sum, d.linelength_sum, d.complexity, d.extra_penalty];
    let line = format!(
        "{}  # {}\n",
        components.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "),
        version
    );
    std::fs::write(path, line).map_err(|e| format!("writing metric sidecar {}: {}", path.display(), e))
}

fn formatter_version(exe: &str) -> String {
    let result = runner::run(&ExeCall::new(exe, vec!["--version".to_string()], Vec::new()));
    if result.os_error.is_some() {
        return "unknown".to_string();
    }
    String::from_utf8_lossy(&result.stdout).trim().to_string()
}

/// Renders the `--bestofround` runner-up diffs as a human-readable report:
/// for each runner-up, the options only the winner sets and the options
/// only the runner-up sets, against their shared parent signature already
/// folded into the search engine's `algebra::diff`.
pub fn render_runner_up_report(outcome: &SearchOutcome) -> String {
    let mut report = String::new();
    for (index, (winner_only, runner_up_only)) in outcome.runner_up_diffs.iter().enumerate() {
        report.push_str(&format!("--- runner-up #{} ---\n", index + 1));
        if !winner_only.is_empty() {
            report.push_str(&format!("winner only:    {}\n", algebra::signature(winner_only)));
        }
        if !runner_up_only.is_empty() {
            report.push_str(&format!("runner-up only: {}\n", algebra::signature(runner_up_only)));
        }
    }
    report
}
